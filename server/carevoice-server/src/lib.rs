//! CareVoice Relay Server - voice assistant backend API
//!
//! This library provides the HTTP surface of the CareVoice relay: the
//! speech-to-text and text-to-speech endpoints consumed by the
//! patient-facing client, wired to the orchestration pipeline in
//! `voice-relay-service`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;

// Re-export commonly used types
pub use error::*;
pub use server::{RelayServer, ServerConfig};

use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: RelayServer) -> Router {
    let max_upload_bytes = server.config.max_upload_bytes;

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(from_fn(middleware::request_timing_middleware))
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(server)
}
