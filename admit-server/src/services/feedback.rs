//! Feedback generation via the Anthropic Messages API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_http_client, AiError};
use crate::config::FeedbackSettings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Fixed evaluator instructions, including the 1-5 rubric and output format
pub const SYSTEM_PROMPT: &str = r#"You are evaluating a trainee's response to an admissions scenario for PEP School, an innovative school that believes children naturally want to learn and delivers "rigour with joy."

Your job is to provide constructive, specific feedback that helps the trainee improve. Be encouraging but honest—vague praise doesn't help anyone learn.

Always provide:
1. A brief (2-3 sentence) overall assessment
2. 1-2 specific things they did well (with quotes from their response)
3. 1-2 specific things to improve (with concrete suggestions)
4. A score from 1-5 where:
   - 5 = Ready for real conversations
   - 4 = Strong, minor improvements needed
   - 3 = Good foundation, needs practice
   - 2 = Understanding there, delivery needs work
   - 1 = Needs to review the material

Format your response as:

**Overall:** [assessment]

**What you did well:**
- [specific strength with example]

**To improve:**
- [specific suggestion]

**Score: [X]/5**"#;

/// Inputs for one evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackPrompt {
    pub scenario: String,
    pub guidance: String,
    pub ai_prompt: String,
    pub transcription: String,
}

impl FeedbackPrompt {
    /// User message placing the scenario, rubric, and answer side by side
    pub fn user_message(&self) -> String {
        format!(
            "SCENARIO:\n\"{}\"\n\n\
             WHAT A GOOD RESPONSE SHOULD INCLUDE:\n{}\n\n\
             SPECIFIC EVALUATION CRITERIA:\n{}\n\n\
             TRAINEE'S RESPONSE:\n\"{}\"\n\n\
             Please evaluate this response.",
            self.scenario, self.guidance, self.ai_prompt, self.transcription
        )
    }
}

/// Produces written feedback for a spoken answer
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, prompt: &FeedbackPrompt) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

pub struct AnthropicClient {
    http_client: reqwest::Client,
    settings: FeedbackSettings,
}

impl AnthropicClient {
    pub fn new(settings: FeedbackSettings) -> Result<Self, AiError> {
        Ok(Self {
            http_client: build_http_client()?,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl FeedbackGenerator for AnthropicClient {
    async fn generate(&self, prompt: &FeedbackPrompt) -> Result<String, AiError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(AiError::NotConfigured("ANTHROPIC_API_KEY"))?;

        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: prompt.user_message(),
            }],
        };

        tracing::debug!(model = %self.settings.model, "Requesting feedback");

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::Api(status.as_u16(), error_text));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        // Only the first block is considered; a non-text first block yields nothing
        match body.content.into_iter().next() {
            Some(block) if block.block_type == "text" => Ok(block.text),
            _ => Err(AiError::EmptyResponse),
        }
    }
}
