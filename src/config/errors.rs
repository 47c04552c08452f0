use thiserror::Error;

/// Errors raised while loading startup configuration
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Required setting '{setting_name}' is missing")]
    MissingSetting { setting_name: String },

    #[error("Invalid setting '{setting_name}': {reason}")]
    InvalidSetting { setting_name: String, reason: String },

    #[error("Failed to parse setting '{setting_name}': {error}")]
    ParseError { setting_name: String, error: String },
}

impl ApplicationError {
    pub fn invalid(setting_name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting_name: setting_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(setting_name: &str) -> Self {
        Self::MissingSetting {
            setting_name: setting_name.to_string(),
        }
    }
}
