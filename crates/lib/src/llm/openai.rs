//! OpenAI-compatible chat completions client.
//!
//! Groq, OpenAI, and most hosted providers accept POST {base}/chat/completions with a
//! bearer key. Only non-streaming, tool-free completions are needed here.

use crate::llm::{ChatMessage, CompletionBackend, CompletionRequest, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Client for an OpenAI-compatible completion endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /chat/completions, non-streaming.
    pub async fn chat(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = to_wire_request(request);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: OpenAiChatResponse = res.json().await?;
        first_choice_content(data)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.chat(request).await
    }
}

// --- OpenAI wire types ---

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Option<Vec<OpenAiChoice>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

fn to_wire_request(request: &CompletionRequest) -> OpenAiChatRequest {
    OpenAiChatRequest {
        model: request.model.clone(),
        messages: request.messages(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

/// `choices[0].message.content`; absent or blank content is an error.
fn first_choice_content(data: OpenAiChatResponse) -> Result<String, LlmError> {
    data.choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|s| !s.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(max_tokens: Option<u32>, temperature: Option<f32>) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "sys".to_string(),
            user_prompt: "usr".to_string(),
            model: "mixtral-8x7b-32768".to_string(),
            max_tokens,
            temperature,
        }
    }

    #[test]
    fn sampling_parameters_omitted_when_unset() {
        let body = serde_json::to_value(to_wire_request(&request(None, None))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "mixtral-8x7b-32768",
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "usr" }
                ]
            })
        );
    }

    #[test]
    fn sampling_parameters_sent_when_set() {
        let body = serde_json::to_value(to_wire_request(&request(Some(8192), Some(0.5)))).unwrap();
        assert_eq!(body["max_tokens"], 8192);
        assert_eq!(body["temperature"], 0.5);
    }

    #[test]
    fn extracts_first_choice() {
        let data: OpenAiChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[
                {"index":0,"message":{"role":"assistant","content":"你好，你好吗？"},"finish_reason":"stop"},
                {"index":1,"message":{"role":"assistant","content":"second"}}
            ],"usage":{"total_tokens":10}}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(data).unwrap(), "你好，你好吗？");
    }

    #[test]
    fn missing_or_blank_content_is_empty_response() {
        for raw in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#,
        ] {
            let data: OpenAiChatResponse = serde_json::from_str(raw).unwrap();
            assert!(matches!(first_choice_content(data), Err(LlmError::EmptyResponse)), "{raw}");
        }
    }

    #[test]
    fn base_url_defaults_and_trims() {
        let c = OpenAiClient::new("k".to_string(), None, Duration::from_secs(1)).unwrap();
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);
        let c = OpenAiClient::new(
            "k".to_string(),
            Some("http://127.0.0.1:1234/v1/".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(c.base_url(), "http://127.0.0.1:1234/v1");
    }
}
