//! Authentication context types

use serde::{Deserialize, Serialize};

use crate::store::User;

/// Authentication context for a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AuthContext {
    /// Resolved from a bearer token
    Authenticated {
        /// The authenticated user's identity
        identity: Identity,
    },
    /// No valid authentication (should have been rejected by middleware)
    Anonymous,
}

impl AuthContext {
    /// Returns the identity if authenticated, None otherwise
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthContext::Authenticated { identity } => Some(identity),
            AuthContext::Anonymous => None,
        }
    }

    /// The authenticated user's id
    pub fn user_id(&self) -> Option<i64> {
        self.identity().map(|identity| identity.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }
}

/// Who a bearer token belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    /// The token that was presented, needed for logout
    #[serde(skip)]
    pub token: String,
    /// Unix seconds
    pub expires_at: i64,
}

impl Identity {
    pub fn new(user: User, token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
            token: token.into(),
            expires_at,
        }
    }
}
