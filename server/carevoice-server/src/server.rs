use std::sync::Arc;
use voice_relay_service::RelayPipeline;

/// Main CareVoice server state
#[derive(Clone)]
pub struct RelayServer {
    /// Server configuration
    pub config: ServerConfig,
    /// The per-request orchestration pipeline
    pub pipeline: Arc<RelayPipeline>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// Upper bound on uploaded request bodies, in bytes
    pub max_upload_bytes: usize,
}

impl RelayServer {
    /// Create a new CareVoice server instance
    pub fn new(config: ServerConfig, pipeline: RelayPipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }
}

impl std::fmt::Debug for RelayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayServer")
            .field("config", &self.config)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "CareVoice Relay".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
