//! Session issuance and bearer-token resolution

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::context::Identity;
use super::error::AuthError;
use crate::store::{IdentityStore, User, UserSession};

/// Issues, resolves and revokes bearer sessions
pub struct SessionManager<S: IdentityStore> {
    store: Arc<S>,
}

impl<S: IdentityStore> SessionManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_user(&self, username: &str, email: &str) -> Result<User, AuthError> {
        let user = self.store.create_user(username, email)?;
        tracing::info!(user_id = user.id, username = %user.username, "Created user");
        Ok(user)
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user_by_username(username)?)
    }

    /// Look up a user by id
    pub fn user(&self, user_id: i64) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)?
            .ok_or(AuthError::UserNotFound(user_id))
    }

    /// Issue a fresh random token valid for `ttl`
    pub fn issue(&self, user_id: i64, ttl: Duration) -> Result<UserSession, AuthError> {
        if self.store.get_user(user_id)?.is_none() {
            return Err(AuthError::UserNotFound(user_id));
        }

        let now = Utc::now();
        let session = UserSession {
            token: Uuid::new_v4().to_string(),
            user_id,
            created_at: now.timestamp(),
            expires_at: (now + ttl).timestamp(),
            is_active: true,
        };
        self.store.create_session(&session)?;
        self.store.touch_last_login(user_id, session.created_at)?;
        tracing::info!(user_id, expires_at = session.expires_at, "Issued session token");
        Ok(session)
    }

    /// Map a bearer token to the identity it was issued for
    pub fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let session = match self.store.get_session(token)? {
            Some(session) if session.is_active => session,
            _ => return Err(AuthError::InvalidToken),
        };
        if session.is_expired(Utc::now().timestamp()) {
            return Err(AuthError::Expired);
        }

        let user = self
            .store
            .get_user(session.user_id)?
            .ok_or(AuthError::UserNotFound(session.user_id))?;
        Ok(Identity::new(user, session.token, session.expires_at))
    }

    /// Deactivate a token. Returns false if it was unknown.
    pub fn revoke(&self, token: &str) -> Result<bool, AuthError> {
        let revoked = self.store.deactivate_session(token)?;
        if revoked {
            tracing::info!("Revoked session token");
        }
        Ok(revoked)
    }
}
