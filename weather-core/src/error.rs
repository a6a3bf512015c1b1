use std::time::Duration;

use thiserror::Error;

use crate::provider::Upstream;

/// Failure of a single upstream HTTP call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Everything that can go wrong while answering a weather lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Missing or ambiguous location input.
    #[error("{0}")]
    InvalidQuery(String),

    /// The forward-geocode search returned no candidates.
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("{upstream} request failed: {source}")]
    UpstreamFailure {
        upstream: Upstream,
        #[source]
        source: ProviderError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl LookupError {
    /// True for failures caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, LookupError::InvalidQuery(_) | LookupError::LocationNotFound(_))
    }

    /// The upstream call responsible for this failure, if any.
    pub fn upstream(&self) -> Option<Upstream> {
        match self {
            LookupError::UpstreamFailure { upstream, .. } => Some(*upstream),
            _ => None,
        }
    }
}
