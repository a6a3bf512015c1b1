use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::LookupError;

/// A coordinate pair exactly as it was received, either from the request or
/// from a forward-geocode match. Values are not validated as numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinate {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self { latitude: latitude.into(), longitude: longitude.into() }
    }

    /// Numeric view of the pair; components that do not parse become NaN.
    pub fn parsed(&self) -> (f64, f64) {
        (
            parse_degrees(&self.latitude).unwrap_or(f64::NAN),
            parse_degrees(&self.longitude).unwrap_or(f64::NAN),
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Parse a textual degree value. NaN counts as a failed parse.
pub(crate) fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Numeric value of a JSON number or numeric string.
pub(crate) fn json_degrees(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_degrees(s),
        _ => None,
    }
}

/// What the caller asked for: a city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinate),
}

impl LocationQuery {
    /// Build a query from raw request parameters.
    ///
    /// Empty values count as absent. A coordinate form needs both `lat` and
    /// `lon`; exactly one of the two forms must be present.
    pub fn from_params(
        city: Option<&str>,
        lat: Option<&str>,
        lon: Option<&str>,
    ) -> Result<Self, LookupError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        let city = present(city);
        let pair = match (present(lat), present(lon)) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        };

        match (city, pair) {
            (Some(city), None) => Ok(LocationQuery::City(city.to_string())),
            (None, Some(coordinate)) => Ok(LocationQuery::Coordinates(coordinate)),
            (Some(_), Some(_)) => Err(LookupError::InvalidQuery(
                "Provide either a city or latitude and longitude, not both.".to_string(),
            )),
            (None, None) => Err(LookupError::InvalidQuery(
                "Please provide a city, or latitude and longitude as query parameters.".to_string(),
            )),
        }
    }
}

/// Forecast document as returned by the forecast provider.
///
/// Only the fields the response needs are modelled; their contents stay
/// opaque JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastPayload {
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub current: Option<Value>,
    pub current_units: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub daily: Option<DailySeries>,
    pub daily_units: Option<Value>,
}

/// Parallel per-day arrays, indexed by day offset. A series that is not an
/// array decodes as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather_code: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_2m_max: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature_2m_min: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunrise: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunset: Option<Vec<Value>>,
}

/// Reverse-geocode document. Nothing in it is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReverseGeocodePayload {
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub display_name: Option<String>,
}

impl ReverseGeocodePayload {
    /// Decode any JSON document; shapes that do not fit decode as empty.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "non_empty_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub town: Option<String>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub village: Option<String>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub hamlet: Option<String>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub county: Option<String>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub country: Option<String>,
}

fn non_empty_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Any value that does not fit `T` decodes as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// One forward-geocode candidate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeocodeMatch {
    #[serde(deserialize_with = "coordinate_text")]
    pub lat: String,
    #[serde(deserialize_with = "coordinate_text")]
    pub lon: String,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub display_name: Option<String>,
}

impl GeocodeMatch {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat.clone(), self.lon.clone())
    }
}

/// Geocoders disagree on whether coordinates are strings or numbers.
fn coordinate_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected a coordinate, got {other}"))),
    }
}

/// The normalized document returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub location: LocationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weather: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weather_units: Option<Value>,
    pub daily_forecast: DailyForecast,
    pub daily_forecast_units: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Per-day arrays; always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyForecast {
    pub time: Vec<Value>,
    pub weather_code: Vec<Value>,
    pub temperature_2m_max: Vec<Value>,
    pub temperature_2m_min: Vec<Value>,
    pub sunrise: Vec<Value>,
    pub sunset: Vec<Value>,
}

pub(crate) fn empty_object() -> Value {
    Value::Object(Map::new())
}
