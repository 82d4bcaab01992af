//! Store error types

use thiserror::Error;

/// Errors from the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("JSON error in column {column}: {source}")]
    Json {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid stored value in {column}: {value}")]
    InvalidValue { column: &'static str, value: String },

    #[error("Database connection lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Migration("v001_initial: syntax error".into());
        assert_eq!(err.to_string(), "Migration failed: v001_initial: syntax error");
    }

    #[test]
    fn test_invalid_value_display() {
        let err = StoreError::InvalidValue {
            column: "path_type",
            value: "astronaut".into(),
        };
        assert!(err.to_string().contains("path_type"));
        assert!(err.to_string().contains("astronaut"));
    }
}
