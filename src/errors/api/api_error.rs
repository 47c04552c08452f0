use crate::errors::internal::{AccessError, CredentialError, EntityError, InternalError};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// How much of an internal failure is echoed back to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Error envelopes carry the full error chain in `detail`
    Development,
    #[default]
    Production,
}

impl ErrorMode {
    pub fn from_app_env(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(ErrorMode::Development),
            "production" | "prod" => Some(ErrorMode::Production),
            _ => None,
        }
    }
}

/// Standardized error envelope
#[derive(Object, Debug)]
#[oai(rename_all = "snake_case")]
pub struct ErrorResponse {
    /// "fail" for client errors, "error" for server errors
    pub status: String,

    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,

    /// Full error chain, development mode only
    #[oai(skip_serializing_if_is_none)]
    pub detail: Option<String>,
}

/// Error responses shared by every endpoint
#[derive(ApiResponse, Debug)]
#[oai(bad_request_handler = "bad_request_handler")]
pub enum ApiError {
    /// Request failed validation
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// Missing, invalid or stale credentials
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Authenticated but not allowed
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Entity or referenced entity does not exist
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Unique field already taken
    #[oai(status = 422)]
    UnprocessableEntity(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

fn bad_request_handler(err: poem::Error) -> ApiError {
    ApiError::bad_request("invalid_request", err.to_string())
}

fn envelope(error: &str, message: String, status_code: u16) -> Json<ErrorResponse> {
    let status = if status_code >= 500 { "error" } else { "fail" };
    Json(ErrorResponse {
        status: status.to_string(),
        error: error.to_string(),
        message,
        status_code,
        detail: None,
    })
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

impl ApiError {
    pub fn bad_request(error: &str, message: impl Into<String>) -> Self {
        ApiError::BadRequest(envelope(error, message.into(), 400))
    }

    pub fn unauthorized(error: &str, message: impl Into<String>) -> Self {
        ApiError::Unauthorized(envelope(error, message.into(), 401))
    }

    pub fn forbidden(error: &str, message: impl Into<String>) -> Self {
        ApiError::Forbidden(envelope(error, message.into(), 403))
    }

    pub fn not_found(error: &str, message: impl Into<String>) -> Self {
        ApiError::NotFound(envelope(error, message.into(), 404))
    }

    pub fn unprocessable(error: &str, message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(envelope(error, message.into(), 422))
    }

    pub fn internal(error: &str, message: impl Into<String>) -> Self {
        ApiError::InternalError(envelope(error, message.into(), 500))
    }

    fn internal_server_error() -> Self {
        Self::internal("internal_error", "Something went wrong")
    }

    /// Convert InternalError to ApiError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Infrastructure failures are logged and reported generically; in
    /// development mode every envelope also carries the error chain.
    pub fn from_internal_error(err: InternalError, mode: ErrorMode) -> Self {
        let mut api_error = match &err {
            InternalError::Database(_) | InternalError::Parse { .. } | InternalError::Crypto { .. } => {
                tracing::error!("Unexpected error: {}", err);
                Self::internal_server_error()
            }

            InternalError::Access(access) => {
                tracing::debug!("Request rejected by access control: {:?}", access);
                match access {
                    AccessError::Forbidden => Self::forbidden(access.code(), access.to_string()),
                    _ => Self::unauthorized(access.code(), access.to_string()),
                }
            }

            InternalError::Credential(credential) => match credential {
                CredentialError::InvalidCredentials { .. } => {
                    tracing::debug!("Invalid credentials attempt");
                    Self::unauthorized("invalid_credentials", credential.to_string())
                }
                CredentialError::IncorrectPassword => {
                    tracing::debug!("Incorrect current password for password update");
                    Self::unauthorized("incorrect_password", credential.to_string())
                }
                CredentialError::PasswordMismatch
                | CredentialError::PasswordValidationFailed(_) => {
                    Self::bad_request("validation_failed", credential.to_string())
                }
                CredentialError::DuplicateEmail(_) | CredentialError::DuplicateUsername(_) => {
                    tracing::warn!("Duplicate account attempt: {}", credential);
                    Self::unprocessable("duplicate_key", credential.to_string())
                }
                CredentialError::UserNotFound(_) => {
                    Self::not_found("not_found", credential.to_string())
                }
                CredentialError::InvalidToken { token_type, reason } => {
                    tracing::debug!("Invalid token: {} - {}", token_type, reason);
                    if token_type == "reset_token" {
                        Self::bad_request("token_invalid", "Token is invalid or has expired")
                    } else {
                        Self::unauthorized(
                            AccessError::TokenInvalid.code(),
                            AccessError::TokenInvalid.to_string(),
                        )
                    }
                }
                CredentialError::PasswordHashingFailed(_) => {
                    tracing::error!("Unexpected error: {}", err);
                    Self::internal_server_error()
                }
            },

            InternalError::Entity(entity) => match entity {
                EntityError::Validation(message) => {
                    tracing::debug!("Validation failed: {}", message);
                    Self::bad_request("validation_failed", message.clone())
                }
                EntityError::Duplicate { .. } => {
                    tracing::warn!("Rejected duplicate write: {}", entity);
                    Self::unprocessable("duplicate_key", entity.to_string())
                }
                EntityError::NotFound { .. } => Self::not_found("not_found", entity.to_string()),
                EntityError::ReferenceNotFound { entity: kind, id } => {
                    tracing::warn!("Rejected write referencing missing {} {}", kind, id);
                    Self::not_found("reference_not_found", entity.to_string())
                }
            },

            InternalError::BlobStore(blob) => {
                tracing::error!("Blob store failure: {}", blob);
                Self::internal(
                    "blob_store_failure",
                    "There was an error uploading the media, Try again later",
                )
            }

            InternalError::Notification(notification) => {
                tracing::error!("Notification failure: {}", notification);
                Self::internal(
                    "notification_failure",
                    "There was an error sending the email, Try again later",
                )
            }
        };

        if mode == ErrorMode::Development {
            api_error.response_mut().detail = Some(error_chain(&err));
        }
        api_error
    }

    fn response_mut(&mut self) -> &mut ErrorResponse {
        match self {
            ApiError::BadRequest(json)
            | ApiError::Unauthorized(json)
            | ApiError::Forbidden(json)
            | ApiError::NotFound(json)
            | ApiError::UnprocessableEntity(json)
            | ApiError::InternalError(json) => &mut json.0,
        }
    }

    fn response(&self) -> &ErrorResponse {
        match self {
            ApiError::BadRequest(json)
            | ApiError::Unauthorized(json)
            | ApiError::Forbidden(json)
            | ApiError::NotFound(json)
            | ApiError::UnprocessableEntity(json)
            | ApiError::InternalError(json) => &json.0,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.response().message.clone()
    }

    pub fn status_code(&self) -> u16 {
        self.response().status_code
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
