//! The per-request orchestration pipeline.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::credentials::CredentialExchanger;
use crate::error::RelayResult;
use crate::fhir::FhirClient;
use crate::inference::{InferenceClient, INFERENCE_ERROR_FALLBACK};
use crate::prompt::compose_query;
use crate::speech::SpeechClient;
use crate::synthesis::{SynthesisClient, SynthesizedAudio};

/// Result of one speech-to-text request.
#[derive(Debug, Clone)]
pub struct UtteranceReply {
    /// What the patient said.
    pub transcript: String,
    /// What the assistant answered; always displayable, possibly a sentinel.
    pub answer: String,
}

/// Sequences the external calls backing one assistant interaction.
///
/// Holds no mutable state: the credential key material is immutable and the
/// clients share one HTTP connection pool, so one pipeline instance serves
/// all concurrent requests.
pub struct RelayPipeline {
    credentials: Arc<CredentialExchanger>,
    speech: SpeechClient,
    fhir: FhirClient,
    inference: InferenceClient,
    synthesis: SynthesisClient,
}

impl RelayPipeline {
    /// Build the pipeline. Fails if the HTTP client cannot be constructed
    /// or the service-account key is unreadable.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let credentials = Arc::new(CredentialExchanger::from_file(
            &config.credentials_path,
            client.clone(),
        )?);

        let speech = SpeechClient::new(
            client.clone(),
            config.speech_endpoint.clone(),
            config.recognition.clone(),
            Arc::clone(&credentials),
        );
        let fhir = FhirClient::new(client.clone(), config.fhir_base_url.clone());
        let inference = InferenceClient::new(client.clone(), config.predict_url());
        let synthesis = SynthesisClient::new(
            client,
            config.tts_endpoint.clone(),
            config.voice.clone(),
            Arc::clone(&credentials),
        );

        Ok(Self {
            credentials,
            speech,
            fhir,
            inference,
            synthesis,
        })
    }

    /// Run the speech-to-text flow: transcribe, fetch clinical context,
    /// compose, authorize, infer.
    ///
    /// The steps are strictly sequential and dependent. Transcription
    /// failure is fatal to the request; a failed context fetch degrades to
    /// the unknown-patient placeholder; credential and inference failures
    /// degrade to the inference error sentinel, so a reply is produced
    /// whenever a transcript exists.
    pub async fn answer_utterance(
        &self,
        audio: &[u8],
        fhir_access_token: &str,
        patient_id: &str,
    ) -> RelayResult<UtteranceReply> {
        let transcript = self.speech.transcribe(audio).await?;
        info!(transcript_chars = transcript.len(), "utterance transcribed");

        let patient = self.fhir.fetch_patient(patient_id, fhir_access_token).await;
        let query = compose_query(&transcript, patient.as_ref());

        let answer = match self.credentials.bearer_token().await {
            Ok(token) => self.inference.answer_text(&query, &token).await,
            Err(e) => {
                error!(error = %e, "credential exchange failed, skipping inference");
                INFERENCE_ERROR_FALLBACK.to_string()
            }
        };

        Ok(UtteranceReply { transcript, answer })
    }

    /// Run the independent text-to-speech flow.
    pub async fn speak(&self, text: &str) -> RelayResult<SynthesizedAudio> {
        self.synthesis.synthesize(text).await
    }
}
