//! Health and session endpoints

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use compass_core::{AuthContext, EntrepreneurProfile, Identity, User};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

fn identity(auth: &AuthContext) -> Result<&Identity, ApiError> {
    auth.identity()
        .ok_or_else(|| ApiError::unauthorized("no authenticated user"))
}

/// GET /api/auth/me
pub async fn me(Extension(auth): Extension<AuthContext>) -> Result<Json<Identity>, ApiError> {
    Ok(Json(identity(&auth)?.clone()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: User,
}

/// GET /api/auth/verify - the middleware has already checked the token
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let user = state.sessions.user(identity(&auth)?.user_id)?;
    Ok(Json(VerifyResponse { valid: true, user }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
    pub profile: EntrepreneurProfile,
}

/// GET /api/auth/profile - user record plus entrepreneur profile
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user_id = identity(&auth)?.user_id;
    let user = state.sessions.user(user_id)?;
    let profile = state.phases.profile(user_id)?;
    Ok(Json(ProfileResponse { user, profile }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

/// POST /api/auth/logout - revoke the presented token
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = &identity(&auth)?.token;
    let revoked = state.sessions.revoke(token)?;
    Ok(Json(LogoutResponse { revoked }))
}
