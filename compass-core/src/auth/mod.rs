//! Bearer-token identity: session issuance, resolution and revocation

mod context;
mod error;
mod sessions;

pub use context::{AuthContext, Identity};
pub use error::AuthError;
pub use sessions::SessionManager;
