//! Shared test utilities for compass-server integration tests

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use axum_test::TestServer;
use chrono::Duration;
use compass_core::CatalogDocument;
use compass_server::{AppState, create_router};

/// A running test server plus a bearer token for one user
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub token: String,
    pub user_id: i64,
}

impl TestApp {
    /// Authorization header for this app's user
    pub fn auth(&self) -> (HeaderName, HeaderValue) {
        bearer(&self.token)
    }
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

/// Creates an app over an in-memory store with the built-in catalog loaded
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let state = Arc::new(AppState::new_in_memory().unwrap());
    state
        .engine
        .load_catalog(&CatalogDocument::builtin().unwrap())
        .unwrap();
    create_test_app_with_state(state)
}

/// Creates an app over existing state with a fresh user and token
#[allow(dead_code)]
pub fn create_test_app_with_state(state: Arc<AppState>) -> TestApp {
    let user = state
        .sessions
        .create_user("founder", "founder@example.com")
        .unwrap();
    let session = state.sessions.issue(user.id, Duration::hours(1)).unwrap();
    let server = TestServer::new(create_router(Arc::clone(&state))).unwrap();

    TestApp {
        server,
        state,
        token: session.token,
        user_id: user.id,
    }
}
