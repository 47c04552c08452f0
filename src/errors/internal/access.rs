use thiserror::Error;

/// Reasons a request is rejected by access control
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("You are not logged in! Please log in to continue")]
    NoToken,

    #[error("Invalid token, Please log in again")]
    TokenInvalid,

    #[error("Your token has expired, please log in again")]
    TokenExpired,

    #[error("The user which this token was assigned to does not exist anymore")]
    UserGone,

    #[error("User recently changed password!, Please log in again")]
    PasswordChanged,

    #[error("You do not have permission to perform this action")]
    Forbidden,
}

impl AccessError {
    /// Stable error code used in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::NoToken => "no_token",
            AccessError::TokenInvalid => "token_invalid",
            AccessError::TokenExpired => "token_expired",
            AccessError::UserGone => "user_gone",
            AccessError::PasswordChanged => "password_changed",
            AccessError::Forbidden => "forbidden",
        }
    }
}
