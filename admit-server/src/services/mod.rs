//! Outbound services: speech-to-text, feedback generation, audio storage

pub mod audio_store;
pub mod feedback;
pub mod transcription;

pub use audio_store::AudioStore;
pub use feedback::{AnthropicClient, FeedbackGenerator, FeedbackPrompt};
pub use transcription::{Transcriber, WhisperClient};

use std::time::Duration;
use thiserror::Error;

pub(crate) const USER_AGENT: &str = concat!("admit-trainer/", env!("CARGO_PKG_VERSION"));

/// AI round trips (audio upload, long feedback) can be slow
pub(crate) const AI_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from the AI provider clients
#[derive(Debug, Error)]
pub enum AiError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Provider returned no text")]
    EmptyResponse,
}

pub(crate) fn build_http_client() -> Result<reqwest::Client, AiError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(AI_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AiError::Network(e.to_string()))
}
