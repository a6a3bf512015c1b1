use std::sync::Arc;

use weather_core::WeatherService;

/// Shared application state passed to all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
    /// Port the server listens on, shown by the root banner.
    pub port: u16,
}

impl AppState {
    pub fn new(service: Arc<WeatherService>, port: u16) -> Self {
        Self { service, port }
    }
}
