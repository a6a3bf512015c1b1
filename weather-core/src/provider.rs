use async_trait::async_trait;
use reqwest::{Client, Response};
use std::{fmt::Debug, time::Duration};

use crate::{
    error::ProviderError,
    model::{Coordinate, ForecastPayload, GeocodeMatch, ReverseGeocodePayload},
};

pub mod mapsco;
pub mod openmeteo;

pub use mapsco::MapsCoGeocoder;
pub use openmeteo::OpenMeteoProvider;

/// Identifies which upstream call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Forecast,
    ForwardGeocode,
    ReverseGeocode,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Forecast => "forecast",
            Upstream::ForwardGeocode => "forward-geocode",
            Upstream::ReverseGeocode => "reverse-geocode",
        }
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Current conditions plus `days` of daily forecast for a coordinate.
    async fn forecast(&self, coordinate: &Coordinate, days: u8)
    -> Result<ForecastPayload, ProviderError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Free-text place search; candidates in provider order.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, ProviderError>;

    async fn reverse(&self, coordinate: &Coordinate)
    -> Result<ReverseGeocodePayload, ProviderError>;
}

const USER_AGENT: &str = concat!("weather-core/", env!("CARGO_PKG_VERSION"));

/// Extra time the HTTP client allows past the per-call bound, so an elapsed
/// bound surfaces as [`ProviderError::Timeout`] rather than a transport error.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(1);

pub(crate) fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout + CLIENT_TIMEOUT_SLACK)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

/// Read the body of a response, turning non-2xx statuses into errors.
pub(crate) async fn read_body(res: Response, upstream: Upstream) -> Result<String, ProviderError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    if !status.is_success() {
        tracing::warn!(%upstream, %status, body = %truncate_body(&body), "upstream returned an error");
        return Err(ProviderError::Status { status: status.as_u16(), body: truncate_body(&body) });
    }

    Ok(body)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
