//! Router configuration: routes, static files and middleware.

use axum::{Router, routing::get};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers;
use super::state::AppState;

/// Create the application router.
///
/// Paths no route matches are served from `static_dir` when it exists.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/weather", get(handlers::get_weather));

    match static_dir {
        Some(dir) if dir.is_dir() => router = router.fallback_service(ServeDir::new(dir)),
        Some(dir) => warn!(dir = %dir.display(), "static directory not found; not serving files"),
        None => {}
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
