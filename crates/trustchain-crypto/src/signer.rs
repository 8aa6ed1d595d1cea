use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer for block headers.
///
/// Wraps the shared secret supplied by configuration and holds it for the
/// lifetime of the ledger. The key is never logged or persisted: `Debug`
/// is redacted, and signatures travel as lowercase hex.
#[derive(Clone)]
pub struct HmacSigner {
    key: Vec<u8>,
}

impl HmacSigner {
    /// Create a signer from raw key bytes.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Sign a message, returning the signature as lowercase hex.
    pub fn sign(&self, message: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify a hex signature against a freshly computed one.
    ///
    /// The comparison is constant-time (`Mac::verify_slice`). Never fails:
    /// a malformed signature simply does not verify.
    pub fn verify(&self, message: &[u8], signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(message);
        mac.verify_slice(&signature).is_ok()
    }
}

impl fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacSigner(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let sig = signer.sign(b"message");
        assert!(signer.verify(b"message", &sig));
    }

    #[test]
    fn signature_is_64_lowercase_hex() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let sig = signer.sign(b"message");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn sign_is_deterministic() {
        let signer = HmacSigner::new(b"secret".to_vec());
        assert_eq!(signer.sign(b"message"), signer.sign(b"message"));
    }

    #[test]
    fn verify_fails_on_wrong_message() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let sig = signer.sign(b"correct message");
        assert!(!signer.verify(b"wrong message", &sig));
    }

    #[test]
    fn verify_fails_with_wrong_key() {
        let signer = HmacSigner::new(b"secret".to_vec());
        let other = HmacSigner::new(b"other secret".to_vec());
        let sig = signer.sign(b"message");
        assert!(!other.verify(b"message", &sig));
    }

    #[test]
    fn verify_fails_on_malformed_signature() {
        let signer = HmacSigner::new(b"secret".to_vec());
        assert!(!signer.verify(b"message", "not hex at all"));
        assert!(!signer.verify(b"message", "abcd"));
        assert!(!signer.verify(b"message", ""));
    }

    #[test]
    fn debug_redacts_key() {
        let signer = HmacSigner::new(b"very secret key".to_vec());
        let debug = format!("{signer:?}");
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("very secret"));
    }
}
