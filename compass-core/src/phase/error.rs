//! Phase assessment error types

use thiserror::Error;

use crate::store::StoreError;

/// Errors from phase and profile operations
#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("Invalid phase ID: {0}")]
    UnknownPhase(String),

    #[error("Assessment not found: {0}")]
    AssessmentNotFound(i64),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
