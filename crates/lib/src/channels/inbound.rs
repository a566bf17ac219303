//! Inbound message from the channel: one text message with the token needed to answer it.

/// A verified text message to be translated and answered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub text: String,
    /// Single-use token issued by the platform; expires within seconds.
    pub reply_token: String,
}
