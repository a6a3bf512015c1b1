//! HTTP surface: router, handlers and error mapping.

mod error;
mod handlers;
mod router;
mod state;

pub use router::create_router;
pub use state::AppState;
