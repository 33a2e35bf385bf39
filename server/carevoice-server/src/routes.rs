pub mod paths;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{health, speech},
    openapi,
    server::RelayServer,
};

/// Create health check routes
pub fn health_routes() -> Router<RelayServer> {
    Router::new()
        .route(paths::health::ROOT, get(health::root))
        .route(paths::health::HEALTH, get(health::health_check))
}

/// Create the speech relay routes
pub fn speech_routes() -> Router<RelayServer> {
    Router::new()
        .route(paths::speech::STT, post(speech::speech_to_text))
        .route(paths::speech::TTS, post(speech::text_to_speech))
}

/// Create API documentation routes
pub fn docs_routes() -> Router<RelayServer> {
    Router::new().route(paths::docs::OPENAPI, get(openapi::serve_openapi))
}

/// Create all application routes
pub fn create_routes() -> Router<RelayServer> {
    Router::new()
        .merge(health_routes())
        .merge(speech_routes())
        .merge(docs_routes())
}
