//! Core library for the weather service.
//!
//! This crate defines:
//! - Configuration handling
//! - Abstraction over forecast and geocoding providers
//! - Location resolution, concurrent upstream fetching and response assembly
//! - Best-effort search logging
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod assemble;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod place;
pub mod provider;
pub mod resolve;
pub mod search_log;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{LookupError, ProviderError};
pub use model::{Coordinate, LocationQuery, WeatherResponse};
pub use provider::{ForecastProvider, Geocoder, Upstream};
pub use search_log::{SearchLogStore, SearchLogger};
pub use service::{LookupSettings, WeatherService};
