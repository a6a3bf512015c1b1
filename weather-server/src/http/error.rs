use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};
use weather_core::LookupError;

/// Message shown for every server-side failure; specifics go to `details`.
const GENERIC_FAILURE: &str = "Failed to process your request.";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler error, rendered as a JSON body.
#[derive(Debug)]
pub struct ApiError(pub LookupError);

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        let (status, body) = match &err {
            LookupError::InvalidQuery(msg) => {
                (StatusCode::BAD_REQUEST, ErrorBody { error: msg.clone(), details: None })
            }
            LookupError::LocationNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorBody { error: err.to_string(), details: None })
            }
            LookupError::UpstreamFailure { .. } | LookupError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { error: GENERIC_FAILURE.to_string(), details: Some(err.to_string()) },
            ),
        };

        if err.is_client_error() {
            warn!(error = %err, status = status.as_u16(), "weather request rejected");
        } else {
            error!(error = %err, upstream = ?err.upstream(), "weather request failed");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{ProviderError, Upstream};

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (LookupError::InvalidQuery("no location".into()), StatusCode::BAD_REQUEST),
            (LookupError::LocationNotFound("Atlantis".into()), StatusCode::NOT_FOUND),
            (
                LookupError::UpstreamFailure {
                    upstream: Upstream::Forecast,
                    source: ProviderError::Transport("reset".into()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (LookupError::Internal("bug".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }
}
