//! Natural-language interpretation service adapter.
//!
//! Everything the crate wants from the external service goes through one
//! interface: hand it a prompt, get text back. The transport (a
//! chat-completions HTTP API) is one adapter behind the trait; callers
//! never see request shapes or API versions.
//!
//! The service is best-effort by contract: every failure path here ends in
//! the caller falling back to deterministic local rules, so errors carry
//! just enough to log.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::CODE_FENCE;

/// Errors from the interpretation service.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// Transport failed or timed out
    #[error("interpreter transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with an error status
    #[error("interpreter error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body had no usable text
    #[error("interpreter returned an empty or malformed response")]
    EmptyResponse,
}

/// Free-text interpretation.
pub trait Interpreter {
    /// Send a prompt, return the reply text.
    fn interpret(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, InterpreterError>> + Send;
}

/// Configuration for the chat-completions adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatClientConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// Base URL up to and including the version segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ChatClientConfig {
    /// Config with default transport settings for a bare API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completions transport for the interpretation service.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ChatClientConfig) -> Result<Self, InterpreterError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
        })
    }
}

impl Interpreter for ChatClient {
    async fn interpret(&self, prompt: &str) -> Result<String, InterpreterError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.3,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InterpreterError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body: ChatResponse = response.json().await?;
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(InterpreterError::EmptyResponse)?;

        debug!(chars = text.len(), "interpreter replied");
        Ok(unwrap_code_fence(&text))
    }
}

/// Strip a markdown code fence from a reply, if present.
pub fn unwrap_code_fence(text: &str) -> String {
    if text.starts_with("```") {
        if let Some(caps) = CODE_FENCE.captures(text) {
            return caps[1].trim().to_string();
        }
    }
    text.to_string()
}
