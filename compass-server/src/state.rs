//! Shared application state for the compass server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use compass_core::{AdaptiveEngine, EngineConfig, PhaseService, SessionManager, SqliteStore};

use crate::error::ServerError;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Adaptive assessment engine
    pub engine: Arc<AdaptiveEngine<SqliteStore>>,
    /// Multi-phase assessments and entrepreneur profiles
    pub phases: Arc<PhaseService<SqliteStore>>,
    /// Bearer session issuance and resolution
    pub sessions: Arc<SessionManager<SqliteStore>>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state over an opened store
    pub fn new(store: Arc<SqliteStore>, config: EngineConfig) -> Self {
        Self {
            engine: Arc::new(AdaptiveEngine::with_config(Arc::clone(&store), config)),
            phases: Arc::new(PhaseService::new(Arc::clone(&store))),
            sessions: Arc::new(SessionManager::new(store)),
            started_at: Utc::now(),
        }
    }

    /// Create state over an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, ServerError> {
        let store = Arc::new(SqliteStore::open_in_memory()?);
        Ok(Self::new(store, EngineConfig::default()))
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new_in_memory() {
        let state = AppState::new_in_memory().unwrap();
        assert!(state.uptime_seconds() >= 0);
        assert_eq!(state.engine.config().batch_size, 5);
    }

    #[test]
    fn test_engine_and_sessions_share_store() {
        let state = AppState::new_in_memory().unwrap();
        let user = state.sessions.create_user("ada", "ada@example.com").unwrap();
        assert_eq!(
            state.engine.progress(user.id).unwrap().status,
            compass_core::PathStatus::NotStarted
        );
        assert_eq!(state.phases.profile(user.id).unwrap().user_id, user.id);
    }
}
