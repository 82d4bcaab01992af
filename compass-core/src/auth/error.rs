//! Authentication error types

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while resolving a bearer token
#[derive(Debug, Error)]
pub enum AuthError {
    /// No authentication token was provided in the request
    #[error("no authentication token provided")]
    MissingToken,

    /// The token is unknown or has been revoked
    #[error("invalid or revoked token")]
    InvalidToken,

    /// The token has expired
    #[error("token has expired")]
    Expired,

    /// The session points at a user that no longer exists
    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// True for failures caused by the caller's credentials rather than the server
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AuthError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::MissingToken;
        assert_eq!(err.to_string(), "no authentication token provided");
    }

    #[test]
    fn test_store_failure_is_not_a_rejection() {
        assert!(AuthError::Expired.is_rejection());
        assert!(AuthError::UserNotFound(7).is_rejection());
        assert!(!AuthError::Store(StoreError::Poisoned).is_rejection());
    }
}
