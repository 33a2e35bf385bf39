//! OpenAPI documentation for the relay API.

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{health, speech};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CareVoice Relay API",
        description = "Backend relay for the CareVoice voice-driven clinical assistant"
    ),
    paths(
        health::health_check,
        speech::speech_to_text,
        speech::text_to_speech,
    ),
    components(schemas(
        health::HealthResponse,
        speech::SttResponse,
        speech::TtsRequest,
    )),
    tags(
        (name = "health", description = "Liveness endpoints"),
        (name = "speech", description = "Speech relay endpoints"),
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
