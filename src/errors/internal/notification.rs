use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Invalid mail address '{address}': {message}")]
    Address { address: String, message: String },

    #[error("Building mail message failed: {0}")]
    Build(String),

    #[error("Mail transport failed: {0}")]
    Transport(String),
}
