//! OpenAI chat completion client
//!
//! Thin wrapper over the chat completions endpoint, used for mood
//! classification and the conversational bar lookup. Requests ask for
//! `json_object` output so the reply can be parsed without scraping
//! prose, and run at temperature 0 to keep classifications stable
//! across runs.

use crate::services::rate_limiter::RateLimiter;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const RATE_LIMIT_MS: u64 = 500; // 2 requests per second

/// OpenAI client errors
#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// OpenAI chat completion client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Result<Self, OpenAiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| OpenAiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(RATE_LIMIT_MS),
            api_key,
        })
    }

    /// Run one chat completion and parse the reply as a JSON value.
    ///
    /// # Arguments
    /// * `system` - System prompt framing the task
    /// * `user` - Task input (bar description, review text, question)
    pub async fn complete_json(
        &self,
        system: &str,
        user: &str,
    ) -> Result<serde_json::Value, OpenAiError> {
        self.rate_limiter.wait().await;

        let request = ChatRequest {
            model: OPENAI_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
            temperature: 0.0,
        };

        tracing::debug!(model = OPENAI_MODEL, "Querying OpenAI chat completion");

        let response = self
            .http_client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OpenAiError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(OpenAiError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenAiError::ApiError(status.as_u16(), error_text));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OpenAiError::ParseError(e.to_string()))?;

        extract_json(body)
    }
}

/// Pull the first choice out of a chat response and parse its content as
/// JSON. The endpoint guarantees JSON output when `json_object` was
/// requested, so a non-JSON reply is a parse error.
fn extract_json(body: ChatResponse) -> Result<serde_json::Value, OpenAiError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| OpenAiError::ParseError("response had no choices".to_string()))?;

    serde_json::from_str(&content)
        .map_err(|e| OpenAiError::ParseError(format!("reply was not valid JSON: {e}")))
}
