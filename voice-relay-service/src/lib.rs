//! Voice relay pipeline for the CareVoice clinical assistant.
//!
//! Accepts a patient's spoken utterance, transcribes it, enriches it with
//! the patient's FHIR record, forwards the composed query to a generative
//! model, and converts answer text back into speech.
//!
//! The pipeline is a linear asynchronous chain per request — transcription,
//! context fetch, prompt composition, credential exchange, inference — with
//! requests fully concurrent across tasks. Context-fetch and inference
//! failures degrade to placeholder content; transcription and synthesis
//! failures surface to the caller.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use voice_relay_service::{RelayConfig, RelayPipeline};
//!
//! # async fn example(audio: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let config = RelayConfig::from_env()?;
//! let pipeline = RelayPipeline::new(config)?;
//!
//! let reply = pipeline
//!     .answer_utterance(audio, "fhir-access-token", "patient-id")
//!     .await?;
//!
//! println!("Transcript: {}", reply.transcript);
//! println!("Answer: {}", reply.answer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod fhir;
pub mod inference;
pub mod pipeline;
pub mod prompt;
pub mod speech;
pub mod synthesis;

pub use config::*;
pub use credentials::{AccessToken, CredentialExchanger, ServiceAccountKey};
pub use error::*;
pub use fhir::{FhirClient, HumanName, PatientRecord};
pub use inference::{
    InferenceClient, InferenceError, PredictionOutcome, INFERENCE_ERROR_FALLBACK,
    NO_ANSWER_FALLBACK,
};
pub use pipeline::{RelayPipeline, UtteranceReply};
pub use prompt::{compose_query, UNKNOWN_PATIENT};
pub use speech::SpeechClient;
pub use synthesis::{SynthesisClient, SynthesizedAudio};
