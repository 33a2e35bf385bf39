//! Transcription adapter for the speech-recognition backend.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::RecognitionConfig;
use crate::credentials::CredentialExchanger;
use crate::error::{RelayError, RelayResult};

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    config: &'a RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Converts raw audio bytes into a transcript.
pub struct SpeechClient {
    client: reqwest::Client,
    endpoint: String,
    config: RecognitionConfig,
    credentials: Arc<CredentialExchanger>,
}

impl SpeechClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        config: RecognitionConfig,
        credentials: Arc<CredentialExchanger>,
    ) -> Self {
        Self {
            client,
            endpoint,
            config,
            credentials,
        }
    }

    /// Transcribe one utterance. The transcript is the top alternative of
    /// every recognition result, in result order, joined with newlines.
    /// An empty result list yields an empty transcript, not an error.
    pub async fn transcribe(&self, audio: &[u8]) -> RelayResult<String> {
        let token = self.credentials.bearer_token().await?;

        let request = RecognizeRequest {
            config: &self.config,
            audio: RecognitionAudio {
                content: BASE64.encode(audio),
            },
        };

        let url = format!("{}/v1/speech:recognize", self.endpoint.trim_end_matches('/'));
        debug!(audio_bytes = audio.len(), "submitting recognition request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayError::Transcription(format!("recognition call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Transcription(format!(
                "recognition backend returned {status}: {body}"
            )));
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Transcription(format!("malformed recognition response: {e}")))?;

        let transcript = collect_transcript(&body);
        let top_confidence = body
            .results
            .first()
            .and_then(|result| result.alternatives.first())
            .and_then(|alternative| alternative.confidence);
        debug!(
            results = body.results.len(),
            transcript_chars = transcript.len(),
            top_confidence = ?top_confidence,
            "transcription complete"
        );

        Ok(transcript)
    }
}

fn collect_transcript(response: &RecognizeResponse) -> String {
    response
        .results
        .iter()
        .filter_map(|result| result.alternatives.first())
        .map(|alternative| alternative.transcript.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from(raw: &str) -> RecognizeResponse {
        serde_json::from_str(raw).unwrap_or_default()
    }

    #[test]
    fn test_collect_transcript_joins_top_alternatives_in_order() {
        let response = response_from(
            r#"{
                "results": [
                    {"alternatives": [
                        {"transcript": "what are my", "confidence": 0.92},
                        {"transcript": "watt are my", "confidence": 0.41}
                    ]},
                    {"alternatives": [{"transcript": "current allergies"}]}
                ]
            }"#,
        );
        assert_eq!(
            collect_transcript(&response),
            "what are my\ncurrent allergies"
        );
    }

    #[test]
    fn test_collect_transcript_empty_results_yields_empty_string() {
        let response = response_from(r#"{"results": []}"#);
        assert_eq!(collect_transcript(&response), "");
    }

    #[test]
    fn test_collect_transcript_tolerates_missing_fields() {
        // Results without alternatives are skipped, missing results default
        // to an empty list.
        let response = response_from(r#"{"results": [{}, {"alternatives": [{"transcript": "hi"}]}]}"#);
        assert_eq!(collect_transcript(&response), "hi");

        let response = response_from(r#"{}"#);
        assert_eq!(collect_transcript(&response), "");
    }

    #[test]
    fn test_alternative_confidence_is_optional() {
        let response = response_from(
            r#"{"results": [{"alternatives": [{"transcript": "hello there"}]}]}"#,
        );
        let first = response
            .results
            .first()
            .and_then(|r| r.alternatives.first());
        assert!(first.is_some_and(|alt| alt.confidence.is_none()));
    }
}
