use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// Unknown identifier or wrong password, deliberately indistinguishable
    #[error("Incorrect {identifier_kind} or password")]
    InvalidCredentials { identifier_kind: &'static str },

    #[error("Your current password is wrong")]
    IncorrectPassword,

    #[error("Passwords are not the same")]
    PasswordMismatch,

    #[error("{0}")]
    PasswordValidationFailed(String),

    #[error("User with this email already exist")]
    DuplicateEmail(String),

    #[error("User with this username already exist")]
    DuplicateUsername(String),

    #[error("There is no user with that {0}")]
    UserNotFound(String),

    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),

    #[error("Invalid token: {token_type} - {reason}")]
    InvalidToken {
        token_type: String,
        reason: String,
    },
}

impl CredentialError {
    pub fn invalid_token(token_type: &str, reason: &str) -> Self {
        CredentialError::InvalidToken {
            token_type: token_type.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_credentials(identifier: &str) -> Self {
        let identifier_kind = if crate::types::internal::auth::looks_like_email(identifier) {
            "email"
        } else {
            "username"
        };
        CredentialError::InvalidCredentials { identifier_kind }
    }
}
