//! Speech synthesizer for the text-to-speech backend.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config::VoiceConfig;
use crate::credentials::CredentialExchanger;
use crate::error::{RelayError, RelayResult};

const MP3_ENCODING: &str = "MP3";

/// Synthesized speech held in memory under a per-request id.
///
/// The bytes are returned to the caller directly; no shared output
/// artifact exists, so concurrent requests cannot observe each other.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub id: Uuid,
    pub text: String,
    pub audio: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: &'a VoiceConfig,
    audio_config: AudioConfigBody,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfigBody {
    audio_encoding: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Converts answer text into an MP3 byte stream.
pub struct SynthesisClient {
    client: reqwest::Client,
    endpoint: String,
    voice: VoiceConfig,
    credentials: Arc<CredentialExchanger>,
}

impl SynthesisClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        voice: VoiceConfig,
        credentials: Arc<CredentialExchanger>,
    ) -> Self {
        Self {
            client,
            endpoint,
            voice,
            credentials,
        }
    }

    /// Synthesize `text` with the configured voice.
    pub async fn synthesize(&self, text: &str) -> RelayResult<SynthesizedAudio> {
        let token = self.credentials.bearer_token().await?;

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: &self.voice,
            audio_config: AudioConfigBody {
                audio_encoding: MP3_ENCODING,
            },
        };

        let url = format!("{}/v1/text:synthesize", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayError::Synthesis(format!("synthesis call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Synthesis(format!(
                "synthesis backend returned {status}: {body}"
            )));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Synthesis(format!("malformed synthesis response: {e}")))?;

        let audio = BASE64
            .decode(body.audio_content.as_bytes())
            .map_err(|e| RelayError::Synthesis(format!("undecodable audio content: {e}")))?;

        let synthesized = SynthesizedAudio {
            id: Uuid::new_v4(),
            text: text.to_string(),
            audio,
        };

        debug!(
            audio_id = %synthesized.id,
            audio_bytes = synthesized.audio.len(),
            "synthesis complete"
        );

        Ok(synthesized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SsmlGender;

    #[test]
    fn test_synthesize_request_wire_shape() {
        let voice = VoiceConfig {
            language_code: "en-US".to_string(),
            ssml_gender: SsmlGender::Neutral,
        };
        let request = SynthesizeRequest {
            input: SynthesisInput { text: "hello" },
            voice: &voice,
            audio_config: AudioConfigBody {
                audio_encoding: MP3_ENCODING,
            },
        };
        let value = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(value["input"]["text"], "hello");
        assert_eq!(value["voice"]["languageCode"], "en-US");
        assert_eq!(value["voice"]["ssmlGender"], "NEUTRAL");
        assert_eq!(value["audioConfig"]["audioEncoding"], "MP3");
    }

    #[test]
    fn test_synthesize_response_decodes_audio_content() {
        let raw = r#"{"audioContent": "aGVsbG8gbXAz"}"#;
        let response: SynthesizeResponse = serde_json::from_str(raw).unwrap_or_default();
        let decoded = BASE64.decode(response.audio_content.as_bytes()).ok();
        assert_eq!(decoded.as_deref(), Some(b"hello mp3".as_slice()));
    }

    #[test]
    fn test_each_synthesized_audio_gets_its_own_id() {
        let first = SynthesizedAudio {
            id: Uuid::new_v4(),
            text: "one".to_string(),
            audio: vec![1],
        };
        let second = SynthesizedAudio {
            id: Uuid::new_v4(),
            text: "two".to_string(),
            audio: vec![2],
        };
        assert_ne!(first.id, second.id);
    }
}
