//! HTTP server module

mod adaptive;
mod api;
mod error;
mod phases;

use std::sync::Arc;

use axum::{
    Extension, Router, middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::middleware::{AuthLayer, auth_middleware};

pub use adaptive::{
    NextQuestionsRequest, PrePopulateResponse, ResponseRequest, SkipRequest, StartRequest,
};
pub use api::{HealthResponse, LogoutResponse, ProfileResponse, VerifyResponse};
pub use error::{ApiError, ErrorResponse};
pub use phases::{AssessmentMessage, MessageResponse, PhasesResponse, ProfileMessage};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_layer = AuthLayer::new(Arc::clone(&state.sessions));

    let protected = Router::new()
        .route("/api/auth/me", get(api::me))
        .route("/api/auth/logout", post(api::logout))
        .route("/api/auth/verify", get(api::verify))
        .route("/api/auth/profile", get(api::profile))
        .route("/api/adaptive/initialize", post(adaptive::initialize))
        .route("/api/adaptive/start", post(adaptive::start))
        .route("/api/adaptive/questions/next", post(adaptive::next_questions))
        .route("/api/adaptive/response", post(adaptive::record_response))
        .route("/api/adaptive/skip", post(adaptive::skip_question))
        .route("/api/adaptive/pre-populate", post(adaptive::pre_populate))
        .route("/api/adaptive/path/update", post(adaptive::update_path))
        .route("/api/adaptive/progress", get(adaptive::progress))
        .route("/api/adaptive/analytics", get(adaptive::analytics))
        .route("/api/assessment/phases", get(phases::list_phases))
        .route("/api/assessment/start/:phase_id", post(phases::start_phase))
        .route("/api/assessment/profile/update", put(phases::update_profile))
        .route(
            "/api/assessment/:assessment_id/response",
            post(phases::save_response),
        )
        .route(
            "/api/assessment/:assessment_id/progress",
            put(phases::update_progress),
        )
        .route(
            "/api/assessment/:assessment_id/responses",
            get(phases::list_responses),
        )
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(auth_layer));

    Router::new()
        .route("/api/health", get(api::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
