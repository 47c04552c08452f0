// Database entities - SeaORM models
pub mod category;
pub mod comment;
pub mod place;
pub mod review;
pub mod user;

/// Normalized form used for case-insensitive name uniqueness
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Decode a JSON array column into its string items
pub fn decode_list(column: &str, raw: &str) -> Result<Vec<String>, crate::errors::InternalError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| crate::errors::InternalError::parse(column, e.to_string()))
}

/// Encode string items for a JSON array column
pub fn encode_list(column: &str, items: &[String]) -> Result<String, crate::errors::InternalError> {
    serde_json::to_string(items)
        .map_err(|e| crate::errors::InternalError::parse(column, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_key_normalizes_case_and_whitespace() {
        assert_eq!(name_key("  Lagos Beach "), "lagos beach");
        assert_eq!(name_key("CAFE"), name_key("cafe"));
    }

    #[test]
    fn test_list_columns() {
        let items = vec!["a".to_string(), "b".to_string()];
        let raw = encode_list("media", &items).unwrap();
        assert_eq!(raw, r#"["a","b"]"#);
        assert_eq!(decode_list("media", "").unwrap(), Vec::<String>::new());
        assert!(decode_list("media", "not json").is_err());
    }
}
