use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::ProviderError,
    model::{Coordinate, GeocodeMatch, ReverseGeocodePayload},
};

use super::{Geocoder, Upstream, http_client, read_body};

pub const DEFAULT_BASE_URL: &str = "https://geocode.maps.co";

/// Forward and reverse geocoding through geocode.maps.co (Nominatim schema).
#[derive(Debug, Clone)]
pub struct MapsCoGeocoder {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl MapsCoGeocoder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http: http_client(timeout)?,
        })
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        upstream: Upstream,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut request = self.http.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let res = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        read_body(res, upstream).await
    }
}

#[async_trait]
impl Geocoder for MapsCoGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, ProviderError> {
        let body = self.get("search", &[("q", query)], Upstream::ForwardGeocode).await?;

        let matches: Vec<GeocodeMatch> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;
        debug!(candidates = matches.len(), "forward geocode answered");

        Ok(matches)
    }

    #[instrument(skip(self, coordinate), fields(coordinate = %coordinate))]
    async fn reverse(
        &self,
        coordinate: &Coordinate,
    ) -> Result<ReverseGeocodePayload, ProviderError> {
        let body = self
            .get(
                "reverse",
                &[("lat", coordinate.latitude.as_str()), ("lon", coordinate.longitude.as_str())],
                Upstream::ReverseGeocode,
            )
            .await?;

        // A body that is not JSON decodes as an empty payload.
        let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok(ReverseGeocodePayload::from_value(value))
    }
}
