//! Error types for compass-core

use thiserror::Error;

use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::engine::EngineError;
use crate::expr::ExprError;
use crate::phase::PhaseError;
use crate::store::StoreError;

/// Top-level error type for compass-core
#[derive(Error, Debug)]
pub enum CompassError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),

    #[error("Phase error: {0}")]
    Phase(#[from] PhaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_error_engine_displays_correctly() {
        let error = CompassError::Engine(EngineError::UnknownQuestion("xyz".into()));
        assert!(error.to_string().contains("Engine error"));
        assert!(error.to_string().contains("xyz"));
    }

    #[test]
    fn compass_error_converts_from_auth_error() {
        let error: CompassError = AuthError::Expired.into();
        assert!(matches!(error, CompassError::Auth(_)));
    }

    #[test]
    fn compass_error_converts_from_store_error() {
        let error: CompassError = StoreError::Poisoned.into();
        assert!(matches!(error, CompassError::Store(_)));
    }

    #[test]
    fn compass_error_converts_from_expr_error() {
        let error: CompassError = ExprError::DivisionByZero.into();
        assert!(error.to_string().starts_with("Expression error"));
    }

    #[test]
    fn compass_error_converts_from_phase_error() {
        let error: CompassError = PhaseError::AssessmentNotFound(9).into();
        assert!(matches!(error, CompassError::Phase(_)));
        assert!(error.to_string().contains("9"));
    }
}
