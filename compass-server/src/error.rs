//! Server error types

use compass_core::StoreError;
use thiserror::Error;

/// Errors that can occur in the compass server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or migrate the database
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
