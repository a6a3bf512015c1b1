use serde_json::Value;

use crate::model::{
    Coordinate, DailyForecast, ForecastPayload, LocationSummary, WeatherResponse, empty_object,
    json_degrees, parse_degrees,
};

/// Merge forecast data and a place name into the response document.
///
/// `daily_window` keeps only the first `n` entries of every daily array.
pub fn assemble(
    forecast: ForecastPayload,
    place_name: String,
    resolved: &Coordinate,
    daily_window: Option<usize>,
) -> WeatherResponse {
    let latitude = echoed_or_resolved(forecast.latitude.as_ref(), &resolved.latitude);
    let longitude = echoed_or_resolved(forecast.longitude.as_ref(), &resolved.longitude);

    let daily = forecast.daily.unwrap_or_default();
    let window = |series: Option<Vec<Value>>| {
        let mut values = series.unwrap_or_default();
        if let Some(n) = daily_window {
            values.truncate(n);
        }
        values
    };

    WeatherResponse {
        location: LocationSummary { name: place_name, latitude, longitude },
        current_weather: forecast.current,
        current_weather_units: forecast.current_units,
        daily_forecast: DailyForecast {
            time: window(daily.time),
            weather_code: window(daily.weather_code),
            temperature_2m_max: window(daily.temperature_2m_max),
            temperature_2m_min: window(daily.temperature_2m_min),
            sunrise: window(daily.sunrise),
            sunset: window(daily.sunset),
        },
        daily_forecast_units: forecast.daily_units.unwrap_or_else(empty_object),
    }
}

fn echoed_or_resolved(echoed: Option<&Value>, resolved: &str) -> f64 {
    echoed
        .and_then(json_degrees)
        .or_else(|| parse_degrees(resolved))
        .unwrap_or(f64::NAN)
}
