use chrono::DateTime;
use poem_openapi::{
    ApiResponse, Object,
    types::{ParseFromJSON, ToJSON},
};

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when the database is unreachable
    pub status: String,

    /// "up" or "down"
    pub database: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

/// Success envelope wrapping every payload
#[derive(Object, Debug)]
pub struct Envelope<T: ParseFromJSON + ToJSON> {
    /// Always "success"
    pub status: String,

    pub message: String,

    /// Number of items on this page, list endpoints only
    #[oai(skip_serializing_if_is_none)]
    pub results: Option<u64>,

    #[oai(skip_serializing_if_is_none)]
    pub data: Option<T>,
}

impl<T: ParseFromJSON + ToJSON> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            results: None,
            data: Some(data),
        }
    }

    pub fn list(message: impl Into<String>, results: usize, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            results: Some(results as u64),
            data: Some(data),
        }
    }
}

/// Envelope without a payload
#[derive(Object, Debug)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Successful deletion
#[derive(ApiResponse, Debug)]
pub enum NoContentResponse {
    #[oai(status = 204)]
    NoContent,
}

/// Render a stored Unix timestamp as RFC 3339
pub fn to_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
