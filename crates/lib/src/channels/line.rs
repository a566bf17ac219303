//! LINE channel: webhook payload types and the reply API client.

use crate::channels::inbound::MessageEvent;
use crate::channels::reply::ReplySender;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const LINE_API_BASE: &str = "https://api.line.me";

/// LINE rejects text messages longer than this (characters).
pub const MAX_TEXT_CHARS: usize = 5000;
/// LINE accepts at most this many messages in one reply.
pub const MAX_MESSAGES_PER_REPLY: usize = 5;

/// Webhook POST body. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event (message, follow, postback, ...).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    /// "active" or "standby". Channels in standby must not reply.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl WebhookEvent {
    pub fn is_standby(&self) -> bool {
        self.mode.as_deref() == Some("standby")
    }

    /// The text message carried by this event, if it is a text message event with a reply token.
    pub fn text_message(&self) -> Option<MessageEvent> {
        if self.typ != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.typ != "text" {
            return None;
        }
        let reply_token = self.reply_token.as_ref().filter(|t| !t.is_empty())?;
        Some(MessageEvent {
            text: message.text.clone().unwrap_or_default(),
            reply_token: reply_token.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage>,
}

#[derive(Debug, Serialize)]
struct TextMessage {
    #[serde(rename = "type")]
    typ: &'static str,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {status} {message}")]
    Api { status: u16, message: String },
}

/// Split text into at most `MAX_MESSAGES_PER_REPLY` chunks of at most `MAX_TEXT_CHARS` characters,
/// preferring to break after a newline or space. Text beyond the last chunk is dropped.
pub fn split_reply(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= MAX_TEXT_CHARS {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() && chunks.len() < MAX_MESSAGES_PER_REPLY {
        let end = (start + MAX_TEXT_CHARS).min(chars.len());
        let last_slot = chunks.len() + 1 == MAX_MESSAGES_PER_REPLY;
        let cut = if end < chars.len() && !last_slot {
            let window = &chars[start..end];
            window
                .iter()
                .rposition(|&c| c == '\n')
                .or_else(|| window.iter().rposition(|&c| c == ' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(chars[start..cut].iter().collect());
        start = cut;
    }
    chunks
}

fn build_reply_request<'a>(reply_token: &'a str, text: &str) -> ReplyRequest<'a> {
    ReplyRequest {
        reply_token,
        messages: split_reply(text)
            .into_iter()
            .map(|text| TextMessage { typ: "text", text })
            .collect(),
    }
}

/// Reply client for the LINE Messaging API.
#[derive(Clone)]
pub struct LineChannel {
    api_base: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(
        access_token: String,
        api_base: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LineError> {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| LINE_API_BASE.to_string());
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_base,
            access_token,
            client,
        })
    }

    /// POST /v2/bot/message/reply: answer the event that issued `reply_token`.
    pub async fn reply_message(&self, reply_token: &str, text: &str) -> Result<(), LineError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let body = build_reply_request(reply_token, text);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let raw = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&raw)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(raw);
            return Err(LineError::Api { status, message });
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineChannel {
    async fn reply(&self, reply_token: &str, text: &str) -> anyhow::Result<()> {
        self.reply_message(reply_token, text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "destination": "Uxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
        "events": [
            {
                "type": "message",
                "mode": "active",
                "timestamp": 1462629479859,
                "source": { "type": "user", "userId": "U4af4980629" },
                "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
                "deliveryContext": { "isRedelivery": false },
                "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                "message": { "id": "444573844083572737", "type": "text", "quoteToken": "q3Plxr4AgKd", "text": "Hello, how are you?" }
            },
            {
                "type": "message",
                "replyToken": "b60d432864f44d079f6d8efe86cf404b",
                "message": { "id": "325708", "type": "sticker", "packageId": "1", "stickerId": "1" }
            },
            {
                "type": "follow",
                "replyToken": "85cbe770fa8b4f45bbe077b1d4be4a36",
                "source": { "type": "user", "userId": "U4af4980629" }
            },
            {
                "type": "unfollow",
                "source": { "type": "user", "userId": "U4af4980629" }
            }
        ]
    }"#;

    #[test]
    fn parses_webhook_and_extracts_only_text_messages() {
        let payload: WebhookPayload = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(payload.events.len(), 4);
        assert_eq!(payload.destination.as_deref(), Some("Uxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"));
        let texts: Vec<MessageEvent> = payload.events.iter().filter_map(|e| e.text_message()).collect();
        assert_eq!(
            texts,
            vec![MessageEvent {
                text: "Hello, how are you?".to_string(),
                reply_token: "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA".to_string(),
            }]
        );
        assert!(!payload.events[0].is_standby());
    }

    #[test]
    fn verification_payload_has_no_events() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"destination":"U0","events":[]}"#).unwrap();
        assert!(payload.events.is_empty());
    }

    #[test]
    fn text_message_without_reply_token_is_skipped() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{"type":"message","mode":"standby","message":{"type":"text","text":"hi"}}"#,
        )
        .unwrap();
        assert!(event.is_standby());
        assert!(event.text_message().is_none());
    }

    #[test]
    fn reply_request_wire_format() {
        let body = serde_json::to_value(build_reply_request("tok", "你好")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "replyToken": "tok",
                "messages": [{ "type": "text", "text": "你好" }]
            })
        );
    }

    #[test]
    fn short_reply_is_one_message() {
        assert_eq!(split_reply("hello"), vec!["hello".to_string()]);
        assert_eq!(split_reply(""), vec![String::new()]);
    }

    #[test]
    fn long_reply_splits_on_whitespace() {
        let word = "翻译 ";
        let text = word.repeat(3000);
        let chunks = split_reply(&text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_TEXT_CHARS));
        assert!(chunks[0].ends_with(' '));
        assert_eq!(chunks.concat(), text);
    }

    #[tokio::test]
    async fn reply_seam_keeps_line_error() {
        let channel = LineChannel::new(
            "token".to_string(),
            Some("http://127.0.0.1:1".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = ReplySender::reply(&channel, "tok", "hi").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<LineError>(), Some(LineError::Request(_))));
    }

    #[test]
    fn overlong_reply_is_capped() {
        let text = "a".repeat(MAX_TEXT_CHARS * MAX_MESSAGES_PER_REPLY + 10);
        let chunks = split_reply(&text);
        assert_eq!(chunks.len(), MAX_MESSAGES_PER_REPLY);
        assert!(chunks.iter().all(|c| c.chars().count() == MAX_TEXT_CHARS));
    }
}
