//! Slack request signature verification.
//!
//! Slack signs every slash command request with HMAC-SHA256 over
//! `v0:{timestamp}:{raw body}` keyed by the app's signing secret and sends the
//! hex digest as `X-Slack-Signature: v0=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Version prefix used by Slack's signing scheme.
const SIGNATURE_VERSION: &str = "v0";

/// Maximum accepted clock skew between Slack and this service.
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 60 * 5;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing signature headers")]
    Missing,
    #[error("malformed signature or timestamp")]
    Malformed,
    #[error("request timestamp outside the accepted window")]
    Stale,
    #[error("signature mismatch")]
    Mismatch,
}

/// Computes the `v0=<hex>` signature for a request body.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{SIGNATURE_VERSION}:{timestamp}:").as_bytes());
    mac.update(body);
    format!(
        "{SIGNATURE_VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Verifies a Slack request signature in constant time.
///
/// `now` is the current unix time in seconds.
///
/// # Errors
///
/// See [`SignatureError`].
pub fn verify(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp.parse().map_err(|_| SignatureError::Malformed)?;
    if now.abs_diff(ts) > MAX_TIMESTAMP_SKEW_SECS.unsigned_abs() {
        return Err(SignatureError::Stale);
    }

    let digest = signature
        .strip_prefix("v0=")
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or(SignatureError::Malformed)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{SIGNATURE_VERSION}:{timestamp}:").as_bytes());
    mac.update(body);

    mac.verify_slice(&digest)
        .map_err(|_| SignatureError::Mismatch)
}
