use std::{future::Future, time::Duration};

use tracing::debug;

use crate::{
    error::{LookupError, ProviderError},
    model::{Coordinate, ForecastPayload, ReverseGeocodePayload},
    provider::{ForecastProvider, Geocoder, Upstream},
};

/// Both upstream documents for one coordinate.
#[derive(Debug, Clone)]
pub struct UpstreamData {
    pub forecast: ForecastPayload,
    pub reverse: ReverseGeocodePayload,
}

/// Fetch the forecast and the reverse geocode for `coordinate` concurrently.
///
/// Both calls must succeed; the first failure is returned and the other call
/// is dropped.
pub async fn fetch_upstream(
    forecast: &dyn ForecastProvider,
    geocoder: &dyn Geocoder,
    coordinate: &Coordinate,
    days: u8,
    timeout: Duration,
) -> Result<UpstreamData, LookupError> {
    let (forecast, reverse) = tokio::try_join!(
        bounded(Upstream::Forecast, timeout, forecast.forecast(coordinate, days)),
        bounded(Upstream::ReverseGeocode, timeout, geocoder.reverse(coordinate)),
    )?;

    debug!(%coordinate, "upstream data received");
    Ok(UpstreamData { forecast, reverse })
}

/// Run one upstream call under `timeout`, tagging failures with their origin.
pub(crate) async fn bounded<T>(
    upstream: Upstream,
    timeout: Duration,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, LookupError> {
    let source = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) => e,
        Err(_) => ProviderError::Timeout(timeout),
    };

    Err(LookupError::UpstreamFailure { upstream, source })
}
