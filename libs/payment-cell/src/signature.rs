// libs/payment-cell/src/signature.rs
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tracing::debug;

type HmacSha512 = Hmac<Sha512>;

/// Verify the provider's hex HMAC-SHA512 signature over the raw request
/// body. Fails closed: any decoding problem counts as a mismatch. The
/// comparison runs through `verify_slice`, which is constant-time.
pub fn verify_signature(secret: &str, raw_body: &[u8], signature_hex: &str) -> bool {
    if secret.is_empty() {
        debug!("Payment webhook secret is not set");
        return false;
    }

    let signature = match decode_hex(signature_hex) {
        Some(bytes) => bytes,
        None => {
            debug!("Signature header is not valid hex");
            return false;
        }
    };

    let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(raw_body);

    mac.verify_slice(&signature).is_ok()
}

/// Hex HMAC-SHA512 of a payload, as the provider computes it. Used by the
/// test suite to produce valid signatures.
pub fn sign_payload(secret: &str, raw_body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(raw_body);
    encode_hex(&mac.finalize().into_bytes())
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec-test";
    const BODY: &[u8] = br#"{"event":"charge.success","data":{"reference":"apt-1"}}"#;

    #[test]
    fn round_trip_signature_verifies() {
        let sig = sign_payload(SECRET, BODY);
        assert_eq!(sig.len(), 128); // SHA-512 digest as hex
        assert!(verify_signature(SECRET, BODY, &sig));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let sig = sign_payload(SECRET, BODY);
        assert!(!verify_signature(SECRET, b"{\"event\":\"charge.success\"}", &sig));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let sig = sign_payload("other-secret", BODY);
        assert!(!verify_signature(SECRET, BODY, &sig));
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        assert!(!verify_signature(SECRET, BODY, ""));
        assert!(!verify_signature(SECRET, BODY, "abc")); // odd length
        assert!(!verify_signature(SECRET, BODY, "zz".repeat(64).as_str()));
        let truncated = &sign_payload(SECRET, BODY)[..64];
        assert!(!verify_signature(SECRET, BODY, truncated));
    }

    #[test]
    fn empty_secret_fails_closed() {
        let sig = sign_payload(SECRET, BODY);
        assert!(!verify_signature("", BODY, &sig));
    }
}
