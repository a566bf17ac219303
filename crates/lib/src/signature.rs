//! X-Line-Signature: base64-encoded HMAC-SHA256 of the raw request body, keyed by the channel secret.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header missing")]
    Missing,
    #[error("signature is not valid base64")]
    Malformed,
    #[error("signature does not match body")]
    Mismatch,
}

fn mac_for(secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    mac
}

/// Sign a body the way the platform does.
pub fn sign(secret: &str, body: &[u8]) -> String {
    STANDARD.encode(mac_for(secret, body).finalize().into_bytes())
}

/// Verify `signature` over the exact `body` bytes. Comparison is constant-time.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> Result<(), SignatureError> {
    let provided = STANDARD
        .decode(signature.trim().as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac_for(secret, body)
        .verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}
