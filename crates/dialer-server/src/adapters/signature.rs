//! Analyzer Webhook Signatures
//!
//! Second-party analyzers sign the raw decision body with a shared secret:
//! `X-Dialer-Signature: sha256=<hex HMAC-SHA256>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-dialer-signature";
const SIGNATURE_PREFIX: &str = "sha256=";

/// Verifier for decision webhooks. Without a secret every request passes.
#[derive(Debug, Clone, Default)]
pub struct WebhookSignature {
    secret: Option<String>,
}

impl WebhookSignature {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Generate the header value for a payload
    pub fn sign(secret: &str, payload: &[u8]) -> String {
        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            // HMAC accepts keys of any length
            Err(_) => return String::new(),
        };
        mac.update(payload);
        format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a header value against the payload in constant time
    pub fn verify(&self, header: Option<&str>, payload: &[u8]) -> bool {
        let Some(secret) = &self.secret else {
            return true;
        };
        let Some(signature) = header
            .map(str::trim)
            .and_then(|h| h.strip_prefix(SIGNATURE_PREFIX))
        else {
            return false;
        };
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_payload() {
        let signature = WebhookSignature::sign("test-secret", b"test payload");

        assert!(signature.starts_with("sha256="));
        assert_eq!(signature.len(), 7 + 64); // "sha256=" + 64 hex chars
    }

    #[test]
    fn test_verify_round_trip() {
        let verifier = WebhookSignature::new(Some("test-secret".into()));
        let body = br#"{"providerCallId":"CA123","decision":"human"}"#;
        let header = WebhookSignature::sign("test-secret", body);

        assert!(verifier.verify(Some(&header), body));
        assert!(!verifier.verify(Some(&header), b"tampered"));
        assert!(!verifier.verify(Some("sha256=deadbeef"), body));
        assert!(!verifier.verify(Some("not-a-signature"), body));
        assert!(!verifier.verify(None, body));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let verifier = WebhookSignature::default();
        assert!(!verifier.is_enabled());
        assert!(verifier.verify(None, b"anything"));
    }
}
