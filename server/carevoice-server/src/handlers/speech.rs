use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::server::RelayServer;

/// Speech-to-text response
#[derive(Debug, Serialize, ToSchema)]
pub struct SttResponse {
    /// Transcript of the uploaded utterance
    #[schema(example = "What are my allergies?")]
    pub text: String,
    /// Answer generated for the transcript
    #[serde(rename = "llmResponse")]
    #[schema(example = "You have no recorded allergies.")]
    pub llm_response: String,
}

/// Text-to-speech request
#[derive(Debug, Deserialize, ToSchema)]
pub struct TtsRequest {
    /// Text to synthesize
    #[schema(example = "You have no recorded allergies.")]
    pub text: String,
}

/// Speech-to-text handler.
///
/// Accepts a multipart form with the binary `audio` field plus the
/// patient's FHIR `accessToken` and `patientId`, and runs the full
/// transcribe → enrich → infer chain.
#[utoipa::path(
    post,
    path = "/stt",
    tag = "speech",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Form fields: `audio` (binary, required), `accessToken`, `patientId`"
    ),
    responses(
        (status = 200, description = "Transcript and generated answer", body = SttResponse),
        (status = 400, description = "Missing or invalid form fields"),
        (status = 500, description = "Speech-to-text failed.")
    )
)]
pub async fn speech_to_text(
    State(server): State<RelayServer>,
    mut multipart: Multipart,
) -> Result<Json<SttResponse>, ApiError> {
    let mut audio: Option<Vec<u8>> = None;
    let mut access_token = String::new();
    let mut patient_id = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable audio field: {e}")))?;
                audio = Some(bytes.to_vec());
            }
            "accessToken" => {
                access_token = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable accessToken field: {e}")))?;
            }
            "patientId" => {
                patient_id = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable patientId field: {e}")))?;
            }
            _ => {}
        }
    }

    let audio = audio.ok_or_else(|| ApiError::validation("audio upload is required"))?;
    info!(
        audio_bytes = audio.len(),
        patient_id = %patient_id,
        "speech-to-text request received"
    );

    let reply = server
        .pipeline
        .answer_utterance(&audio, &access_token, &patient_id)
        .await
        .map_err(|e| {
            error!(error = %e, "speech-to-text pipeline failed");
            ApiError::internal("Speech-to-text failed.")
        })?;

    Ok(Json(SttResponse {
        text: reply.transcript,
        llm_response: reply.answer,
    }))
}

/// Text-to-speech handler.
///
/// Synthesizes the posted text and streams the MP3 bytes straight back;
/// concurrent callers each receive their own audio.
#[utoipa::path(
    post,
    path = "/tts",
    tag = "speech",
    request_body = TtsRequest,
    responses(
        (status = 200, description = "MP3 audio stream", body = Vec<u8>, content_type = "audio/mpeg"),
        (status = 400, description = "Missing text"),
        (status = 500, description = "Text-to-speech failed.")
    )
)]
pub async fn text_to_speech(
    State(server): State<RelayServer>,
    Json(request): Json<TtsRequest>,
) -> Result<Response, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::validation("text is required"));
    }

    let audio = server.pipeline.speak(&request.text).await.map_err(|e| {
        error!(error = %e, "text-to-speech pipeline failed");
        ApiError::internal("Text-to-speech failed.")
    })?;

    info!(
        audio_id = %audio.id,
        audio_bytes = audio.audio.len(),
        "text-to-speech audio generated"
    );

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio.audio).into_response())
}
