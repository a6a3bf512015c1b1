use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::ProviderError,
    model::{Coordinate, ForecastPayload},
};

use super::{ForecastProvider, Upstream, http_client, read_body};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset";

/// Forecast provider backed by the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    #[instrument(skip(self, coordinate), fields(coordinate = %coordinate))]
    async fn forecast(
        &self,
        coordinate: &Coordinate,
        days: u8,
    ) -> Result<ForecastPayload, ProviderError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let days = days.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coordinate.latitude.as_str()),
                ("longitude", coordinate.longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("daily", DAILY_FIELDS),
                ("forecast_days", days.as_str()),
                ("timezone", "GMT"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body = read_body(res, Upstream::Forecast).await?;
        debug!(bytes = body.len(), "forecast received");

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}
