//! Multi-phase assessment and profile endpoints

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use compass_core::{
    AuthContext, EntrepreneurProfile, PhaseAssessment, PhaseOverview, PhaseResponseInput,
    PhaseResponses, ProfileUpdate, ProgressUpdate,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::AppState;

fn user_id(auth: &AuthContext) -> Result<i64, ApiError> {
    auth.user_id()
        .ok_or_else(|| ApiError::unauthorized("no authenticated user"))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhasesResponse {
    pub phases: Vec<PhaseOverview>,
}

/// GET /api/assessment/phases
pub async fn list_phases(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PhasesResponse>, ApiError> {
    let user_id = user_id(&auth)?;
    Ok(Json(PhasesResponse {
        phases: state.phases.phases(user_id)?,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssessmentMessage {
    pub message: String,
    pub assessment: PhaseAssessment,
}

/// POST /api/assessment/start/:phase_id - start or resume
pub async fn start_phase(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(phase_id): Path<String>,
) -> Result<Json<AssessmentMessage>, ApiError> {
    let user_id = user_id(&auth)?;
    let assessment = state.phases.start(user_id, &phase_id)?;
    Ok(Json(AssessmentMessage {
        message: format!("Assessment {} started", assessment.phase_name),
        assessment,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/assessment/:assessment_id/response
pub async fn save_response(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(assessment_id): Path<i64>,
    Json(body): Json<PhaseResponseInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = user_id(&auth)?;
    state.phases.save_response(user_id, assessment_id, &body)?;
    Ok(Json(MessageResponse {
        message: "Response saved successfully".to_string(),
    }))
}

/// PUT /api/assessment/:assessment_id/progress
pub async fn update_progress(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(assessment_id): Path<i64>,
    Json(body): Json<ProgressUpdate>,
) -> Result<Json<AssessmentMessage>, ApiError> {
    let user_id = user_id(&auth)?;
    let assessment = state.phases.update_progress(user_id, assessment_id, body)?;
    Ok(Json(AssessmentMessage {
        message: "Progress updated successfully".to_string(),
        assessment,
    }))
}

/// GET /api/assessment/:assessment_id/responses
pub async fn list_responses(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(assessment_id): Path<i64>,
) -> Result<Json<PhaseResponses>, ApiError> {
    let user_id = user_id(&auth)?;
    Ok(Json(state.phases.responses(user_id, assessment_id)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileMessage {
    pub message: String,
    pub profile: EntrepreneurProfile,
}

/// PUT /api/assessment/profile/update
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<ProfileMessage>, ApiError> {
    let user_id = user_id(&auth)?;
    let profile = state.phases.update_profile(user_id, body)?;
    Ok(Json(ProfileMessage {
        message: "Profile updated successfully".to_string(),
        profile,
    }))
}
