use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Unsupported transcription config: {0}")]
    TranscriptionConfig(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Context fetch error: {0}")]
    ContextFetch(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RelayResult<T> = Result<T, RelayError>;
