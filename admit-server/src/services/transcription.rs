//! Speech-to-text client (OpenAI-compatible `/v1/audio/transcriptions`)

use async_trait::async_trait;
use serde::Deserialize;

use super::{build_http_client, AiError};
use crate::config::TranscriptionSettings;

/// Converts recorded audio into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, AiError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Whisper transcription over HTTP
pub struct WhisperClient {
    http_client: reqwest::Client,
    settings: TranscriptionSettings,
}

impl WhisperClient {
    pub fn new(settings: TranscriptionSettings) -> Result<Self, AiError> {
        Ok(Self {
            http_client: build_http_client()?,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/audio/transcriptions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, AiError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(AiError::NotConfigured("OPENAI_API_KEY"))?;

        let audio_bytes = audio.len();
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.webm")
            .mime_str("audio/webm")
            .map_err(|e| AiError::Parse(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.settings.model.clone())
            .text("language", self.settings.language.clone());

        tracing::debug!(
            audio_bytes,
            model = %self.settings.model,
            "Requesting transcription"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::Api(status.as_u16(), error_text));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        tracing::info!(chars = body.text.len(), "Transcription complete");

        Ok(body.text)
    }
}
