use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use serde_json::Value;
use weather_core::{LocationQuery, LookupError};

use super::{error::ApiError, state::AppState};

/// Query string of `GET /weather`.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub city: Option<String>,
}

/// GET /
pub async fn root(State(state): State<AppState>) -> String {
    format!(
        "WeatherApp server running on port {}. Access frontend at /index.html if in public folder.",
        state.port
    )
}

/// GET /weather?lat=&lon= or GET /weather?city=
pub async fn get_weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params.map_err(|e| LookupError::InvalidQuery(e.body_text()))?;

    let query = LocationQuery::from_params(
        params.city.as_deref(),
        params.lat.as_deref(),
        params.lon.as_deref(),
    )?;

    let response = state.service.lookup(&query).await?;

    let body = serde_json::to_value(&response)
        .map_err(|e| LookupError::Internal(format!("failed to serialize response: {e}")))?;

    Ok(Json(body))
}
