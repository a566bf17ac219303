//! Messaging channel (LINE).
//!
//! Webhook wire types, the reply client, and the `ReplySender` seam the message
//! handler talks to. Inbound text messages become `MessageEvent`s.

mod inbound;
mod line;
mod reply;

pub use inbound::MessageEvent;
pub use line::{split_reply, EventMessage, LineChannel, LineError, WebhookEvent, WebhookPayload};
pub use reply::ReplySender;
