//! Webhook signature verification.
//!
//! LINE signs every delivery with HMAC-SHA256 over the raw body keyed
//! by the channel secret, base64-encoded in the `x-line-signature`
//! header. The MAC must be computed on the raw bytes, before any JSON
//! parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a delivery's signature against the channel secret.
///
/// Returns `false` for a missing header, malformed base64, or a MAC
/// mismatch. The comparison is constant-time. Never panics.
pub fn verify(channel_secret: &str, signature_header: Option<&str>, body: &[u8]) -> bool {
    let Some(header) = signature_header else {
        return false;
    };

    let Ok(expected) = STANDARD.decode(header.trim()) else {
        return false;
    };

    // HMAC accepts keys of any length, but an empty secret means the
    // service is misconfigured; reject everything rather than accept
    // signatures keyed on "".
    if channel_secret.is_empty() {
        return false;
    }

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the base64 signature for a body. Used by tests to build
/// valid deliveries.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-channel-secret";
    const BODY: &[u8] = br#"{"destination":"xxx","events":[]}"#;

    #[test]
    fn test_valid_signature_accepted() {
        let header = sign(SECRET, BODY);
        assert!(verify(SECRET, Some(&header), BODY));
    }

    #[test]
    fn test_missing_header_rejected() {
        assert!(!verify(SECRET, None, BODY));
    }

    #[test]
    fn test_malformed_base64_rejected() {
        assert!(!verify(SECRET, Some("not base64 !!!"), BODY));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let header = sign(SECRET, BODY);
        let tampered = br#"{"destination":"xxx","events":[{}]}"#;
        assert!(!verify(SECRET, Some(&header), tampered));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = sign("other-secret", BODY);
        assert!(!verify(SECRET, Some(&header), BODY));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let header = sign("", BODY);
        assert!(!verify("", Some(&header), BODY));
    }

    #[test]
    fn test_header_whitespace_tolerated() {
        let header = format!("  {}  ", sign(SECRET, BODY));
        assert!(verify(SECRET, Some(&header), BODY));
    }
}
