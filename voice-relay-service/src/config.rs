use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{RelayError, RelayResult};

/// Audio encodings accepted by the transcription backend.
///
/// The set is closed on purpose: an encoding the backend does not recognize
/// must be rejected at configuration time, not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Linear16,
    Flac,
    Mulaw,
    OggOpus,
    WebmOpus,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Flac => "FLAC",
            AudioEncoding::Mulaw => "MULAW",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::WebmOpus => "WEBM_OPUS",
        }
    }
}

impl FromStr for AudioEncoding {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LINEAR16" => Ok(AudioEncoding::Linear16),
            "FLAC" => Ok(AudioEncoding::Flac),
            "MULAW" => Ok(AudioEncoding::Mulaw),
            "OGG_OPUS" => Ok(AudioEncoding::OggOpus),
            "WEBM_OPUS" => Ok(AudioEncoding::WebmOpus),
            other => Err(RelayError::TranscriptionConfig(format!(
                "unknown audio encoding: {other}"
            ))),
        }
    }
}

/// Voice gender marker for the synthesis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    Neutral,
    Female,
    Male,
}

impl FromStr for SsmlGender {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NEUTRAL" => Ok(SsmlGender::Neutral),
            "FEMALE" => Ok(SsmlGender::Female),
            "MALE" => Ok(SsmlGender::Male),
            other => Err(RelayError::Config(format!("unknown voice gender: {other}"))),
        }
    }
}

/// Recognition settings sent with every transcription request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub language_code: String,
}

/// Voice selection sent with every synthesis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub language_code: String,
    pub ssml_gender: SsmlGender,
}

/// Relay pipeline configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Path to the service-account key file used for the Google-backed calls.
    pub credentials_path: String,
    /// Base URL of the speech-recognition backend.
    pub speech_endpoint: String,
    /// Base URL of the speech-synthesis backend.
    pub tts_endpoint: String,
    /// Base URL of the FHIR R4 API the patient context is read from.
    pub fhir_base_url: String,
    /// Cloud project hosting the prediction model.
    pub project_id: String,
    /// Model serving region.
    pub location: String,
    /// Published model identifier.
    pub model: String,
    /// Full prediction URL override; when set it wins over the composed URL.
    pub predict_endpoint: Option<String>,
    pub recognition: RecognitionConfig,
    pub voice: VoiceConfig,
    /// Bound on every external call made by the pipeline.
    pub request_timeout_secs: u64,
}

impl RelayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> RelayResult<Self> {
        let credentials_path = std::env::var("RELAY_CREDENTIALS_PATH")
            .or_else(|_| std::env::var("GOOGLE_APPLICATION_CREDENTIALS"))
            .map_err(|_| {
                RelayError::Config(
                    "RELAY_CREDENTIALS_PATH or GOOGLE_APPLICATION_CREDENTIALS must be set"
                        .to_string(),
                )
            })?;

        let speech_endpoint = std::env::var("RELAY_SPEECH_ENDPOINT")
            .unwrap_or_else(|_| "https://speech.googleapis.com".to_string());

        let tts_endpoint = std::env::var("RELAY_TTS_ENDPOINT")
            .unwrap_or_else(|_| "https://texttospeech.googleapis.com".to_string());

        let fhir_base_url = std::env::var("RELAY_FHIR_BASE_URL").unwrap_or_else(|_| {
            "https://fhir.epic.com/interconnect-fhir-oauth/api/FHIR/R4".to_string()
        });

        let predict_endpoint = std::env::var("RELAY_PREDICT_ENDPOINT").ok();

        let project_id = std::env::var("RELAY_PROJECT_ID").unwrap_or_default();
        if project_id.is_empty() && predict_endpoint.is_none() {
            return Err(RelayError::Config(
                "RELAY_PROJECT_ID must be set when RELAY_PREDICT_ENDPOINT is not".to_string(),
            ));
        }

        let location =
            std::env::var("RELAY_LOCATION").unwrap_or_else(|_| "us-central1".to_string());

        let model = std::env::var("RELAY_MODEL").unwrap_or_else(|_| "chat-bison@001".to_string());

        let encoding = std::env::var("RELAY_AUDIO_ENCODING")
            .unwrap_or_else(|_| "LINEAR16".to_string())
            .parse::<AudioEncoding>()?;

        let sample_rate_hertz = std::env::var("RELAY_SAMPLE_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(16000);

        let language_code =
            std::env::var("RELAY_LANGUAGE_CODE").unwrap_or_else(|_| "en-US".to_string());

        let voice_language =
            std::env::var("RELAY_VOICE_LANGUAGE").unwrap_or_else(|_| "en-US".to_string());

        let ssml_gender = std::env::var("RELAY_VOICE_GENDER")
            .unwrap_or_else(|_| "NEUTRAL".to_string())
            .parse::<SsmlGender>()?;

        let request_timeout_secs = std::env::var("RELAY_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            credentials_path,
            speech_endpoint,
            tts_endpoint,
            fhir_base_url,
            project_id,
            location,
            model,
            predict_endpoint,
            recognition: RecognitionConfig {
                encoding,
                sample_rate_hertz,
                language_code,
            },
            voice: VoiceConfig {
                language_code: voice_language,
                ssml_gender,
            },
            request_timeout_secs,
        })
    }

    /// Prediction endpoint the composed query is submitted to.
    pub fn predict_url(&self) -> String {
        match &self.predict_endpoint {
            Some(url) => url.clone(),
            None => format!(
                "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:predict",
                location = self.location,
                project = self.project_id,
                model = self.model,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_encoding_parses_known_values() {
        assert_eq!(
            "LINEAR16".parse::<AudioEncoding>().ok(),
            Some(AudioEncoding::Linear16)
        );
        assert_eq!(
            "webm_opus".parse::<AudioEncoding>().ok(),
            Some(AudioEncoding::WebmOpus)
        );
    }

    #[test]
    fn test_audio_encoding_rejects_unknown_values() {
        let parsed = "PCM_FLOAT".parse::<AudioEncoding>();
        assert!(matches!(parsed, Err(RelayError::TranscriptionConfig(_))));
    }

    #[test]
    fn test_voice_gender_rejects_unknown_values() {
        assert!("robot".parse::<SsmlGender>().is_err());
    }

    #[test]
    fn test_recognition_config_serializes_wire_field_names() {
        let config = RecognitionConfig {
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: 16000,
            language_code: "en-US".to_string(),
        };
        let value = serde_json::to_value(&config).ok();
        assert_eq!(
            value,
            Some(serde_json::json!({
                "encoding": "LINEAR16",
                "sampleRateHertz": 16000,
                "languageCode": "en-US",
            }))
        );
    }

    #[test]
    fn test_predict_url_composes_from_parts() {
        let config = RelayConfig {
            credentials_path: "key.json".to_string(),
            speech_endpoint: String::new(),
            tts_endpoint: String::new(),
            fhir_base_url: String::new(),
            project_id: "demo-project".to_string(),
            location: "us-central1".to_string(),
            model: "chat-bison@001".to_string(),
            predict_endpoint: None,
            recognition: RecognitionConfig {
                encoding: AudioEncoding::Linear16,
                sample_rate_hertz: 16000,
                language_code: "en-US".to_string(),
            },
            voice: VoiceConfig {
                language_code: "en-US".to_string(),
                ssml_gender: SsmlGender::Neutral,
            },
            request_timeout_secs: 30,
        };
        assert_eq!(
            config.predict_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/demo-project/locations/us-central1/publishers/google/models/chat-bison@001:predict"
        );
    }

    #[test]
    fn test_predict_url_override_wins() {
        let config = RelayConfig {
            predict_endpoint: Some("http://localhost:9090/predict".to_string()),
            credentials_path: "key.json".to_string(),
            speech_endpoint: String::new(),
            tts_endpoint: String::new(),
            fhir_base_url: String::new(),
            project_id: String::new(),
            location: "us-central1".to_string(),
            model: "chat-bison@001".to_string(),
            recognition: RecognitionConfig {
                encoding: AudioEncoding::Linear16,
                sample_rate_hertz: 16000,
                language_code: "en-US".to_string(),
            },
            voice: VoiceConfig {
                language_code: "en-US".to_string(),
                ssml_gender: SsmlGender::Neutral,
            },
            request_timeout_secs: 30,
        };
        assert_eq!(config.predict_url(), "http://localhost:9090/predict");
    }
}
