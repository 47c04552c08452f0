use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::errors::InternalError;

type HmacSha256 = Hmac<Sha256>;

/// Cryptographic primitives shared by the token provider
///
/// HMAC-SHA256 digests for persisted token hashes and random hex tokens for
/// values handed to users exactly once.
pub struct CryptoProvider;

impl CryptoProvider {
    pub fn new() -> Self {
        Self
    }

    /// Compute HMAC-SHA256 of `token` keyed by `key`, as lowercase hex
    pub fn hmac_sha256_token(&self, key: &str, token: &str) -> Result<String, InternalError> {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| InternalError::crypto("hmac_init", e.to_string()))?;
        mac.update(token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Generate `byte_len` random bytes from the thread RNG, hex encoded
    pub fn random_token_hex(&self, byte_len: usize) -> String {
        let mut bytes = vec![0u8; byte_len];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

impl Default for CryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_token_is_deterministic_per_key() {
        let crypto = CryptoProvider::new();

        let hash1 = crypto.hmac_sha256_token("key1", "token").unwrap();
        let hash2 = crypto.hmac_sha256_token("key1", "token").unwrap();
        let other = crypto.hmac_sha256_token("key2", "token").unwrap();

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, other);
    }

    #[test]
    fn test_hmac_sha256_token_hex_format() {
        let crypto = CryptoProvider::new();
        let hash = crypto.hmac_sha256_token("key", "token").unwrap();

        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_random_token_hex() {
        let crypto = CryptoProvider::new();
        let a = crypto.random_token_hex(32);
        let b = crypto.random_token_hex(32);

        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
