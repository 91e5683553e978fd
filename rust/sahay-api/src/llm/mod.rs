//! LLM client abstractions.
//!
//! The decision pipeline talks to the language model through the
//! [`LlmClient`] trait: one blocking (non-streaming) completion per call.
//! [`openai::OpenAiClient`] is the production implementation; tests
//! substitute scripted clients.

pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default base URL for the OpenAI-compatible API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// LLM connection and model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Base URL for the LLM API.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Per-call timeout in seconds. A timeout counts as a remote failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// A message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Messages to send, system prompt first.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output length cap.
    pub max_tokens: u32,
}

/// Errors surfaced by an LLM client call.
///
/// Every variant means the same thing to the caller: the remote path is
/// unavailable for this message.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network, TLS, or timeout failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("api error ({status}): {body}")]
    Api {
        /// HTTP status returned by the API.
        status: reqwest::StatusCode,
        /// Response body, if any.
        body: String,
    },
    /// The API answered 2xx but the body was not a usable completion.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Trait for LLM completion clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one chat completion and return the assistant text.
    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError>;
}
