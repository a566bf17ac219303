//! LLM abstraction and the OpenAI-compatible completion client (Groq by default).
//!
//! The message handler depends only on `CompletionBackend`, so tests can substitute a mock.

mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiClient;

/// One chat message (system or user) sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One completion call: prompt pair, model, and optional sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Messages in the order the provider expects: system, then user.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(self.user_prompt.as_str()),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
    #[error("completion response had no content")]
    EmptyResponse,
}

/// A hosted chat completion endpoint.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion and return the first choice's text content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
