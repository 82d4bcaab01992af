//! Engine error types

use thiserror::Error;

use crate::store::StoreError;

/// Errors from adaptive engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Question {0} is already completed and cannot be skipped")]
    AlreadyCompleted(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_question_display() {
        let err = EngineError::UnknownQuestion("risk_appetite".into());
        assert_eq!(err.to_string(), "Unknown question: risk_appetite");
    }

    #[test]
    fn test_store_error_converts() {
        let err: EngineError = StoreError::Poisoned.into();
        assert!(matches!(err, EngineError::Store(_)));
        assert!(err.to_string().contains("lock poisoned"));
    }
}
