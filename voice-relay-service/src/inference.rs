//! Inference orchestrator for the generative-model prediction endpoint.
//!
//! The prediction response is a partially-present tree; parsing resolves it
//! into an explicit [`PredictionOutcome`] instead of probing optional fields.
//! At the pipeline boundary every failure collapses to a displayable
//! fallback string, so the caller always has something to show or speak.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::credentials::AccessToken;

/// Returned when the backend answered but produced no usable content.
pub const NO_ANSWER_FALLBACK: &str = "No response generated from LLM";

/// Returned when the prediction call itself failed.
pub const INFERENCE_ERROR_FALLBACK: &str = "Error generating response from LLM.";

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Errors raised by the prediction call. These never escape the pipeline;
/// [`InferenceClient::answer_text`] maps them to [`INFERENCE_ERROR_FALLBACK`].
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("prediction request timed out")]
    Timeout,

    #[error("prediction endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse prediction response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout
        } else {
            InferenceError::Request(e.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    author: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Option<Vec<Prediction>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    grounding_metadata: Option<serde_json::Value>,
    #[serde(default)]
    safety_attributes: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<String>,
}

/// Explicit result of resolving the prediction tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionOutcome {
    /// The first candidate of the first prediction carried answer text.
    Answer(String),
    /// The response carried no predictions at all.
    NoPredictions,
    /// A prediction was present but held no candidate content.
    NoCandidates,
}

impl PredictionOutcome {
    /// Collapse the outcome to displayable text.
    pub fn into_answer_text(self) -> String {
        match self {
            PredictionOutcome::Answer(text) => text,
            PredictionOutcome::NoPredictions | PredictionOutcome::NoCandidates => {
                NO_ANSWER_FALLBACK.to_string()
            }
        }
    }
}

fn resolve_outcome(response: PredictResponse) -> PredictionOutcome {
    let mut predictions = match response.predictions {
        Some(predictions) if !predictions.is_empty() => predictions,
        Some(_) | None => return PredictionOutcome::NoPredictions,
    };
    let first = predictions.remove(0);

    // Diagnostic only; these never influence the returned answer.
    if let Some(metadata) = &first.grounding_metadata {
        debug!(grounding_metadata = %metadata, "prediction carried grounding metadata");
    }
    if let Some(attributes) = &first.safety_attributes {
        debug!(safety_attributes = %attributes, "prediction carried safety attributes");
    }

    match first.candidates {
        Some(candidates) => match candidates.into_iter().next() {
            Some(Candidate {
                content: Some(content),
            }) => PredictionOutcome::Answer(content),
            Some(Candidate { content: None }) | None => PredictionOutcome::NoCandidates,
        },
        None => PredictionOutcome::NoCandidates,
    }
}

/// Submits composed queries to the model-serving endpoint.
pub struct InferenceClient {
    client: reqwest::Client,
    predict_url: String,
}

impl InferenceClient {
    pub fn new(client: reqwest::Client, predict_url: String) -> Self {
        Self {
            client,
            predict_url,
        }
    }

    /// Run one single-turn prediction.
    pub async fn predict(
        &self,
        query: &str,
        token: &AccessToken,
    ) -> Result<PredictionOutcome, InferenceError> {
        let request = PredictRequest {
            instances: vec![Instance {
                messages: vec![Message {
                    author: "user",
                    content: query,
                }],
            }],
            parameters: Parameters {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(query_chars = query.len(), "submitting prediction request");

        let response = self
            .client
            .post(&self.predict_url)
            .bearer_auth(token.secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        Ok(resolve_outcome(body))
    }

    /// No-throw boundary for the end of the user-facing request: always
    /// returns displayable text, possibly an error sentinel.
    pub async fn answer_text(&self, query: &str, token: &AccessToken) -> String {
        match self.predict(query, token).await {
            Ok(outcome) => {
                if !matches!(outcome, PredictionOutcome::Answer(_)) {
                    warn!(?outcome, "prediction returned no usable content");
                }
                outcome.into_answer_text()
            }
            Err(e) => {
                error!(error = %e, "inference call failed");
                INFERENCE_ERROR_FALLBACK.to_string()
            }
        }
    }
}
