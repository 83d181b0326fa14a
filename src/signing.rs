/**
 * DOMAIN LAYER - Ticket Signing
 *
 * qr_sig: HMAC-SHA256 over `code:order_id:event_id`, hex-encoded. Verified
 * with a constant-time comparison so a gate scanner can't be timed into
 * leaking the secret.
 */

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub fn sign(secret: &str, code: &str, order_id: Uuid, event_id: Uuid) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(format!("{}:{}:{}", code, order_id, event_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify(secret: &str, code: &str, order_id: Uuid, event_id: Uuid, signature: &str) -> bool {
    let expected = sign(secret, code, order_id, event_id);
    let expected_bytes = expected.as_bytes();
    let actual_bytes = signature.as_bytes();

    if expected_bytes.len() != actual_bytes.len() {
        return false;
    }

    // Constant-time compare - no early return on first mismatch.
    let mut diff = 0u8;
    for (a, b) in expected_bytes.iter().zip(actual_bytes.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

pub fn generate_code() -> String {
    format!("TKT-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_its_own_signature() {
        let order_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let sig = sign("secret", "TKT-abc", order_id, event_id);
        assert!(verify("secret", "TKT-abc", order_id, event_id, &sig));
    }

    #[test]
    fn verify_rejects_tampered_code() {
        let order_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let sig = sign("secret", "TKT-abc", order_id, event_id);
        assert!(!verify("secret", "TKT-xyz", order_id, event_id, &sig));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let order_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let sig = sign("secret", "TKT-abc", order_id, event_id);
        assert!(!verify("other-secret", "TKT-abc", order_id, event_id, &sig));
    }

    #[test]
    fn verify_rejects_truncated_signature() {
        let order_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let sig = sign("secret", "TKT-abc", order_id, event_id);
        assert!(!verify("secret", "TKT-abc", order_id, event_id, &sig[..sig.len() - 2]));
    }

    #[test]
    fn generated_codes_carry_the_ticket_prefix() {
        assert!(generate_code().starts_with("TKT-"));
    }
}
