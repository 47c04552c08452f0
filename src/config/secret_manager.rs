use std::fmt;
use thiserror::Error;

use crate::config::{EnvironmentProvider, SecretConfig, SecretType, SystemEnvironment};

/// Custom error type for secret-related failures
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Required secret '{secret_name}' is missing")]
    Missing { secret_name: String },

    #[error("Secret '{secret_name}' must be at least {expected} characters, got {actual}")]
    InvalidLength {
        secret_name: String,
        expected: usize,
        actual: usize,
    },
}

/// Centralized manager for application secrets
pub struct SecretManager {
    jwt_secret: String,
    password_pepper: String,
    reset_token_secret: String,
}

impl SecretManager {
    /// Load and validate all secrets from the process environment
    pub fn init() -> Result<Self, SecretError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    /// Load and validate all secrets from the given provider
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or too short
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, SecretError> {
        Ok(Self {
            jwt_secret: Self::load_secret(env, &Self::jwt_config())?,
            password_pepper: Self::load_secret(env, &Self::pepper_config())?,
            reset_token_secret: Self::load_secret(env, &Self::reset_token_config())?,
        })
    }

    /// Build a manager from literal values
    pub fn from_values(
        jwt_secret: impl Into<String>,
        password_pepper: impl Into<String>,
        reset_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            password_pepper: password_pepper.into(),
            reset_token_secret: reset_token_secret.into(),
        }
    }

    fn jwt_config() -> SecretConfig {
        SecretConfig::env("JWT_SECRET").min_length(32)
    }

    fn pepper_config() -> SecretConfig {
        SecretConfig::env("PASSWORD_PEPPER").min_length(16)
    }

    fn reset_token_config() -> SecretConfig {
        SecretConfig::env("RESET_TOKEN_SECRET").min_length(32)
    }

    /// Get the JWT signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Get the pepper for password hashing
    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    /// Get the HMAC key for password reset tokens
    pub fn reset_token_secret(&self) -> &str {
        &self.reset_token_secret
    }

    pub(crate) fn load_secret(
        env: &dyn EnvironmentProvider,
        config: &SecretConfig,
    ) -> Result<String, SecretError> {
        let value = match &config.secret_type {
            SecretType::EnvVar { name } => match env.get_var(name) {
                Some(v) => v,
                None if !config.required => return Ok(String::new()),
                None => {
                    return Err(SecretError::Missing {
                        secret_name: name.clone(),
                    });
                }
            },
        };

        if let Some(min_len) = config.min_length {
            if value.len() < min_len {
                return Err(SecretError::InvalidLength {
                    secret_name: config.name().to_string(),
                    expected: min_len,
                    actual: value.len(),
                });
            }
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("reset_token_secret", &"<redacted>")
            .finish()
    }
}
