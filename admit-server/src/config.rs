//! Runtime settings for the HTTP service
//!
//! Built once at startup from the TOML config and the environment.

use admit_common::config::{resolve_secret, TomlConfig};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_BIND: &str = "127.0.0.1";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_TRANSCRIPTION_LANGUAGE: &str = "en";
pub const DEFAULT_FEEDBACK_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_FEEDBACK_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// None disables manager login
    pub manager_password: Option<String>,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
    pub content_dir: Option<PathBuf>,
    pub transcription: TranscriptionSettings,
    pub feedback: FeedbackSettings,
}

impl ServerConfig {
    /// Resolve secrets (environment first, then TOML) and apply defaults
    pub fn from_toml(toml: &TomlConfig) -> Self {
        Self {
            manager_password: resolve_secret(
                "Manager password",
                "MANAGER_PASSWORD",
                toml.manager_password.as_deref(),
            ),
            secure_cookies: toml.secure_cookies.unwrap_or(false),
            content_dir: toml.content_dir.as_ref().map(PathBuf::from),
            transcription: TranscriptionSettings {
                api_key: resolve_secret(
                    "OpenAI API key",
                    "OPENAI_API_KEY",
                    toml.openai_api_key.as_deref(),
                ),
                base_url: toml
                    .openai_base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: toml
                    .transcription_model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
                language: DEFAULT_TRANSCRIPTION_LANGUAGE.to_string(),
            },
            feedback: FeedbackSettings {
                api_key: resolve_secret(
                    "Anthropic API key",
                    "ANTHROPIC_API_KEY",
                    toml.anthropic_api_key.as_deref(),
                ),
                base_url: toml
                    .anthropic_base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
                model: toml
                    .feedback_model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FEEDBACK_MODEL.to_string()),
                max_tokens: DEFAULT_FEEDBACK_MAX_TOKENS,
            },
        }
    }
}

impl Default for ServerConfig {
    /// Defaults with no secrets; used by tests and as the TOML-less baseline
    fn default() -> Self {
        Self {
            manager_password: None,
            secure_cookies: false,
            content_dir: None,
            transcription: TranscriptionSettings {
                api_key: None,
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
                language: DEFAULT_TRANSCRIPTION_LANGUAGE.to_string(),
            },
            feedback: FeedbackSettings {
                api_key: None,
                base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
                model: DEFAULT_FEEDBACK_MODEL.to_string(),
                max_tokens: DEFAULT_FEEDBACK_MAX_TOKENS,
            },
        }
    }
}
