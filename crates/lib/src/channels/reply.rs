//! Reply seam: the message handler sends through this trait so tests can substitute a recorder.

use async_trait::async_trait;

/// Sends one reply addressed by a platform reply token.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Send `text` as the answer to the message that issued `reply_token`. No retry.
    /// Errors are platform specific; the caller only logs them.
    async fn reply(&self, reply_token: &str, text: &str) -> anyhow::Result<()>;
}
