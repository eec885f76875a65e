//! Keyed-hash verification for inbound webhooks

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a payment webhook signature: HMAC-SHA256 over the exact raw body
/// bytes, hex-encoded in the signature header.
///
/// Comparison goes through `Mac::verify_slice`, which is constant-time.
/// Any decoding failure counts as a mismatch.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Response token for the social-media webhook verification handshake:
/// `sha256=` plus the base64 of HMAC-SHA256(secret, challenge).
pub fn crc_response_token(secret: &str, challenge: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(challenge.as_bytes());
    let digest = mac.finalize().into_bytes();
    Some(format!(
        "sha256={}",
        base64::engine::general_purpose::STANDARD.encode(digest)
    ))
}
