use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature, same scheme GitHub uses for its webhooks.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Sign `payload` with HMAC-SHA256 and format it as `sha256=<hex>`.
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(format!("Invalid HMAC key: {e}")))?;
    mac.update(payload);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify a `sha256=<hex>` signature. Receivers of the status webhook can use
/// this to authenticate deliveries.
pub fn verify_signature(secret: &str, payload: &[u8], signature_header: &str) -> Result<()> {
    let signature_hex = signature_header
        .strip_prefix("sha256=")
        .ok_or_else(|| AppError::WebhookVerification("Missing sha256= prefix".to_string()))?;

    let signature_bytes = hex::decode(signature_hex)
        .map_err(|e| AppError::WebhookVerification(format!("Invalid hex in signature: {e}")))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(format!("Invalid HMAC key: {e}")))?;

    mac.update(payload);

    mac.verify_slice(&signature_bytes)
        .map_err(|_| AppError::WebhookVerification("Signature mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify() {
        let secret = "test-secret";
        let payload = br#"{"status":"success"}"#;

        let header = sign_payload(secret, payload).unwrap();
        assert!(header.starts_with("sha256="));
        assert_eq!(header.len(), "sha256=".len() + 64);
        assert!(verify_signature(secret, payload, &header).is_ok());
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let payload = b"hello world";
        let header = sign_payload("one", payload).unwrap();
        let err = verify_signature("two", payload, &header).unwrap_err();
        assert!(matches!(err, AppError::WebhookVerification(_)));
        assert_eq!(err.to_string(), "Webhook verification failed: Signature mismatch");
    }

    #[test]
    fn test_missing_prefix() {
        let err = verify_signature("s", b"hello world", "abcdef1234567890").unwrap_err();
        assert!(matches!(err, AppError::WebhookVerification(_)));
    }

    #[test]
    fn test_invalid_hex() {
        let err = verify_signature("s", b"hello world", "sha256=zz").unwrap_err();
        assert!(matches!(err, AppError::WebhookVerification(_)));
    }
}
