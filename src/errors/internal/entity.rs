use thiserror::Error;

/// Errors raised by catalog, review and comment operations
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("No {entity} found with that ID")]
    NotFound { entity: &'static str, id: String },

    /// A referenced parent row (place, review, category) does not exist
    #[error("No {entity} found with that ID")]
    ReferenceNotFound { entity: &'static str, id: String },

    #[error("{} with this {field} already exist", capitalize(.entity))]
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{0}")]
    Validation(String),
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
