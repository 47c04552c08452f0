use thiserror::Error;

pub mod access;
pub mod blob;
pub mod credential;
pub mod database;
pub mod entity;
pub mod notification;

pub use access::AccessError;
pub use blob::BlobStoreError;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use entity::EntityError;
pub use notification::NotificationError;

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure errors (database, parse, crypto) are shared; the remaining
/// variants are domain errors. Never exposed via the API directly, endpoints
/// convert through `ApiError::from_internal_error`.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    BlobStore(#[from] BlobStoreError),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> Self {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> Self {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        InternalError::Entity(EntityError::Validation(message.into()))
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        InternalError::Entity(EntityError::NotFound {
            entity,
            id: id.into(),
        })
    }

    pub fn reference_not_found(entity: &'static str, id: impl Into<String>) -> Self {
        InternalError::Entity(EntityError::ReferenceNotFound {
            entity,
            id: id.into(),
        })
    }

    pub fn duplicate(entity: &'static str, field: &'static str) -> Self {
        InternalError::Entity(EntityError::Duplicate { entity, field })
    }

    /// True for failures that are reported to clients as "Something went wrong"
    pub fn is_unknown(&self) -> bool {
        matches!(
            self,
            InternalError::Database(_)
                | InternalError::Parse { .. }
                | InternalError::Crypto { .. }
                | InternalError::Credential(CredentialError::PasswordHashingFailed(_))
        )
    }
}
