//! Message handler: validate one inbound text, translate it through the completion backend,
//! and answer with exactly one reply.
//!
//! Nothing escapes `Translator::handle`: rejections are sent as the reply, completion failures
//! become an apology, and reply failures are logged.

mod prompt;
pub mod validate;

use std::sync::Arc;

use crate::channels::{MessageEvent, ReplySender};
use crate::config::Config;
use crate::llm::CompletionBackend;

pub use prompt::{build_request, user_prompt, CompletionSettings, SYSTEM_PROMPT};
pub use validate::{Rejection, ValidationRules};

/// Sent when the completion call fails or returns nothing usable.
pub const MSG_APOLOGY: &str = "抱歉，翻译服务暂时不可用，请稍后再试。";

/// What happened to one message. Informational only; the webhook response does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The model's translation was delivered.
    Translated,
    /// The input failed validation and the rule's message was delivered.
    Rejected(Rejection),
    /// The completion call failed; an apology was attempted.
    CompletionFailed,
    /// The reply for a rejection or translation could not be delivered.
    ReplyFailed,
}

/// Shared, read-only handler: clients are built once at startup and injected here.
pub struct Translator {
    backend: Arc<dyn CompletionBackend>,
    replies: Arc<dyn ReplySender>,
    rules: ValidationRules,
    settings: CompletionSettings,
}

impl Translator {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        replies: Arc<dyn ReplySender>,
        rules: ValidationRules,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            backend,
            replies,
            rules,
            settings,
        }
    }

    /// Build from config with the given clients.
    pub fn from_config(
        config: &Config,
        backend: Arc<dyn CompletionBackend>,
        replies: Arc<dyn ReplySender>,
    ) -> Self {
        let settings = CompletionSettings {
            model: config.completion.model.trim().to_string(),
            max_tokens: config.completion.max_tokens,
            temperature: config.completion.temperature,
        };
        Self::new(
            backend,
            replies,
            ValidationRules::from_config(&config.translation),
            settings,
        )
    }

    /// Handle one text message end to end.
    pub async fn handle(&self, event: MessageEvent) -> Outcome {
        let text = match validate::validate(&event.text, &self.rules) {
            Ok(t) => t,
            Err(rejection) => {
                log::info!("translate: input rejected ({})", rejection);
                return if self.send(&event.reply_token, rejection.user_message()).await {
                    Outcome::Rejected(rejection)
                } else {
                    Outcome::ReplyFailed
                };
            }
        };

        log::debug!("translate: {} chars via {}", text.chars().count(), self.settings.model);
        let request = build_request(text, &self.settings);
        match self.backend.complete(&request).await {
            Ok(translated) => {
                if self.send(&event.reply_token, &translated).await {
                    Outcome::Translated
                } else {
                    Outcome::ReplyFailed
                }
            }
            Err(e) => {
                log::warn!("translate: completion failed: {}", e);
                self.send(&event.reply_token, MSG_APOLOGY).await;
                Outcome::CompletionFailed
            }
        }
    }

    /// Send one reply; failures are terminal for the message and only logged.
    async fn send(&self, reply_token: &str, text: &str) -> bool {
        match self.replies.reply(reply_token, text).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("translate: reply failed: {:#}", e);
                false
            }
        }
    }
}
