use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing::{info, instrument, warn};

use crate::{
    assemble::assemble,
    config::Config,
    error::LookupError,
    fetch::fetch_upstream,
    model::{LocationQuery, WeatherResponse},
    place::derive_place_name,
    provider::{ForecastProvider, Geocoder, MapsCoGeocoder, OpenMeteoProvider},
    resolve::resolve_location,
    search_log::SearchLogger,
};

/// Per-lookup knobs taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    pub forecast_days: u8,
    pub daily_window: Option<usize>,
    pub upstream_timeout: Duration,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl LookupSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            forecast_days: config.forecast.forecast_days,
            daily_window: config.forecast.window(),
            upstream_timeout: config.upstream.timeout(),
        }
    }
}

/// Answers weather lookups: resolve, fetch, name, assemble, log.
#[derive(Debug, Clone)]
pub struct WeatherService {
    forecast: Arc<dyn ForecastProvider>,
    geocoder: Arc<dyn Geocoder>,
    logger: SearchLogger,
    settings: LookupSettings,
}

impl WeatherService {
    pub fn new(
        forecast: Arc<dyn ForecastProvider>,
        geocoder: Arc<dyn Geocoder>,
        logger: SearchLogger,
        settings: LookupSettings,
    ) -> Self {
        Self { forecast, geocoder, logger, settings }
    }

    /// Build the service with the HTTP providers described by `config`.
    pub fn from_config(config: &Config, logger: SearchLogger) -> anyhow::Result<Self> {
        let timeout = config.upstream.timeout();

        if config.geocode_api_key().is_none() {
            warn!("no geocoding API key configured (GEOCODE_MAPS_CO_API_KEY); geocoding will likely fail");
        }

        let forecast = OpenMeteoProvider::new(config.forecast.base_url.as_str(), timeout)
            .context("Failed to create forecast provider")?;
        let geocoder = MapsCoGeocoder::new(
            config.geocode.base_url.as_str(),
            config.geocode_api_key().map(str::to_owned),
            timeout,
        )
        .context("Failed to create geocoder")?;

        Ok(Self::new(
            Arc::new(forecast),
            Arc::new(geocoder),
            logger,
            LookupSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &LookupSettings {
        &self.settings
    }

    #[instrument(skip(self))]
    pub async fn lookup(&self, query: &LocationQuery) -> Result<WeatherResponse, LookupError> {
        let timeout = self.settings.upstream_timeout;

        let coordinate = resolve_location(query, self.geocoder.as_ref(), timeout).await?;

        let upstream = fetch_upstream(
            self.forecast.as_ref(),
            self.geocoder.as_ref(),
            &coordinate,
            self.settings.forecast_days,
            timeout,
        )
        .await?;

        let place_name = derive_place_name(&upstream.reverse);
        info!(%coordinate, place = %place_name, "weather lookup complete");

        let response =
            assemble(upstream.forecast, place_name, &coordinate, self.settings.daily_window);

        // Not awaited: the response never waits on persistence.
        self.logger.record(&coordinate, &response.location.name);

        Ok(response)
    }
}
