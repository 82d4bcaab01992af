//! Bearer-token authentication middleware for axum

use std::sync::Arc;

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use compass_core::{AuthContext, AuthError, SessionManager, SqliteStore};

use crate::http::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Authentication layer state
#[derive(Clone)]
pub struct AuthLayer {
    sessions: Arc<SessionManager<SqliteStore>>,
}

impl AuthLayer {
    pub fn new(sessions: Arc<SessionManager<SqliteStore>>) -> Self {
        Self { sessions }
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix(BEARER_PREFIX).map(str::trim)
}

/// Authentication middleware function
///
/// Rejects the request with 401 unless the bearer token resolves to a user,
/// then attaches the [`AuthContext`] to the request extensions.
pub async fn auth_middleware(
    axum::Extension(auth_layer): axum::Extension<AuthLayer>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = match extract_bearer(&request) {
        Some(token) => auth_layer.sessions.resolve(token),
        None => Err(AuthError::MissingToken),
    };

    let identity = match result {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(error = %e, path = %request.uri().path(), "Rejected request");
            return ApiError::from(e).into_response();
        }
    };

    request
        .extensions_mut()
        .insert(AuthContext::Authenticated { identity });

    next.run(request).await
}
