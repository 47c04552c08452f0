use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::AccessError;
use crate::providers::crypto_provider::CryptoProvider;
use crate::types::internal::auth::Claims;

/// Byte length of a raw password-reset token before hex encoding
const RESET_TOKEN_BYTES: usize = 32;

/// A freshly minted password-reset token
///
/// `raw` goes to the user; only `hash` and `expires_at` are persisted.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub raw: String,
    pub hash: String,
    pub expires_at: i64,
}

/// Issues and verifies session JWTs and password-reset tokens
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    crypto: CryptoProvider,
    jwt_expires_in_days: i64,
    reset_token_ttl_minutes: i64,
}

impl TokenProvider {
    pub fn new(
        secret_manager: Arc<SecretManager>,
        jwt_expires_in_days: i64,
        reset_token_ttl_minutes: i64,
    ) -> Self {
        Self {
            secret_manager,
            crypto: CryptoProvider::new(),
            jwt_expires_in_days,
            reset_token_ttl_minutes,
        }
    }

    /// Sign a session token for `user_id` issued now
    pub fn generate_jwt(&self, user_id: &str) -> Result<String, InternalError> {
        self.generate_jwt_at(user_id, Utc::now().timestamp())
    }

    /// Sign a session token with an explicit `iat`
    pub fn generate_jwt_at(&self, user_id: &str, issued_at: i64) -> Result<String, InternalError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at,
            exp: issued_at + Duration::days(self.jwt_expires_in_days).num_seconds(),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, InternalError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", format!("Failed to generate JWT: {}", e)))
    }

    /// Verify signature, algorithm and expiry, returning the claims
    ///
    /// Expiry maps to `TokenExpired`; every other failure to `TokenInvalid`.
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, AccessError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iat"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AccessError::TokenExpired,
            _ => AccessError::TokenInvalid,
        })
    }

    /// Mint a reset token valid for the configured TTL
    pub fn generate_reset_token(&self) -> Result<ResetToken, InternalError> {
        let raw = self.crypto.random_token_hex(RESET_TOKEN_BYTES);
        let hash = self.hash_reset_token(&raw)?;
        let expires_at = Utc::now().timestamp()
            + Duration::minutes(self.reset_token_ttl_minutes).num_seconds();
        Ok(ResetToken { raw, hash, expires_at })
    }

    /// Keyed digest under which a reset token is stored
    pub fn hash_reset_token(&self, raw: &str) -> Result<String, InternalError> {
        self.crypto
            .hmac_sha256_token(self.secret_manager.reset_token_secret(), raw.trim())
    }

    pub fn reset_token_ttl_minutes(&self) -> i64 {
        self.reset_token_ttl_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::test_secret_manager;

    fn provider() -> TokenProvider {
        TokenProvider::new(Arc::new(test_secret_manager()), 90, 10)
    }

    #[test]
    fn test_generate_and_validate_jwt() {
        let provider = provider();
        let token = provider.generate_jwt("user-1").unwrap();

        let claims = provider.validate_jwt(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, 90 * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_jwt_is_classified() {
        let provider = provider();
        let now = Utc::now().timestamp();
        let token = provider
            .sign(&Claims {
                sub: "user-1".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert_eq!(provider.validate_jwt(&token), Err(AccessError::TokenExpired));
    }

    #[test]
    fn test_tampered_or_foreign_jwt_is_invalid() {
        let provider = provider();
        let token = provider.generate_jwt("user-1").unwrap();
        let tampered = format!("{}x", token);
        assert_eq!(provider.validate_jwt(&tampered), Err(AccessError::TokenInvalid));

        let other = TokenProvider::new(
            Arc::new(SecretManager::from_values(
                "another-jwt-secret-that-is-long-enough!!",
                "another-pepper-value",
                "another-reset-secret-that-is-long-enough",
            )),
            90,
            10,
        );
        let foreign = other.generate_jwt("user-1").unwrap();
        assert_eq!(provider.validate_jwt(&foreign), Err(AccessError::TokenInvalid));
        assert_eq!(provider.validate_jwt("not-a-jwt"), Err(AccessError::TokenInvalid));
    }

    #[test]
    fn test_reset_token_hash_matches_raw() {
        let provider = provider();
        let token = provider.generate_reset_token().unwrap();

        assert_eq!(token.raw.len(), 64);
        assert_ne!(token.raw, token.hash);
        assert_eq!(provider.hash_reset_token(&token.raw).unwrap(), token.hash);
        assert!(token.expires_at > Utc::now().timestamp());
    }
}
