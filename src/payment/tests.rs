//! Tests for webhook signature verification and event parsing

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::FlipError;
    use base64::Engine as _;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    fn sign_hex(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_correct_signature_verifies() {
        let secret = "whsec_test";
        let body = br#"{"event":{"type":"charge:confirmed"}}"#;
        let sig = sign_hex(secret, body);
        assert!(verify_signature(secret, body, &sig));
    }

    #[test]
    fn test_flipped_body_byte_fails() {
        let secret = "whsec_test";
        let body = b"payload-bytes".to_vec();
        let sig = sign_hex(secret, &body);

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert!(!verify_signature(secret, &tampered, &sig));
        }
    }

    #[test]
    fn test_flipped_signature_byte_fails() {
        let secret = "whsec_test";
        let body = b"payload-bytes";
        let sig = sign_hex(secret, body);

        let mut bytes = hex::decode(&sig).unwrap();
        bytes[0] ^= 0x01;
        assert!(!verify_signature(secret, body, &hex::encode(bytes)));
    }

    #[test]
    fn test_garbage_signature_fails() {
        assert!(!verify_signature("secret", b"body", "not hex at all"));
        assert!(!verify_signature("secret", b"body", ""));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"payload";
        let sig = sign_hex("secret-a", body);
        assert!(!verify_signature("secret-b", body, &sig));
    }

    #[test]
    fn test_crc_response_token_shape() {
        let secret = "shared-secret";
        let challenge = "challenge-token-123";

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(challenge.as_bytes());
        let expected = format!(
            "sha256={}",
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
        );

        assert_eq!(crc_response_token(secret, challenge).unwrap(), expected);
    }

    #[test]
    fn test_parse_webhook_accepts_signed_payload() {
        let secret = "whsec_test";
        let body = br#"{
            "event": {
                "type": "charge:confirmed",
                "data": {"code": "ABC123", "metadata": {"user_id": "42"}}
            }
        }"#;
        let sig = sign_hex(secret, body);

        let envelope = parse_webhook(secret, body, &sig).unwrap();
        assert!(envelope.event.is_confirmed());
        assert_eq!(envelope.event.user_id(), Some("42"));
    }

    #[test]
    fn test_parse_webhook_rejects_bad_signature_before_parsing() {
        let secret = "whsec_test";
        let body = b"{not even json";
        let err = parse_webhook(secret, body, "deadbeef").unwrap_err();
        assert!(matches!(err, FlipError::SignatureInvalid));
    }

    #[test]
    fn test_pending_event_is_not_confirmed() {
        let event = WebhookEvent {
            event_type: "charge:pending".to_string(),
            data: serde_json::json!({"metadata": {"user_id": "42"}}),
        };
        assert!(!event.is_confirmed());
    }

    #[test]
    fn test_missing_metadata_yields_no_user() {
        let event = WebhookEvent {
            event_type: "charge:confirmed".to_string(),
            data: serde_json::json!({}),
        };
        assert_eq!(event.user_id(), None);
    }
}
