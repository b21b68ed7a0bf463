//! Router configuration for the web server.

use axum::{http::HeaderValue, http::Method, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::handlers;
use super::AppState;
use crate::config::ServerSettings;

/// Create the main router with all routes.
pub fn create_router(state: AppState, server: &ServerSettings) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/search", get(handlers::search))
        .layer(cors_layer(server))
        .with_state(state)
}

fn cors_layer(server: &ServerSettings) -> CorsLayer {
    if server.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}
