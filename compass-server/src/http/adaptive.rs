//! Adaptive assessment REST API endpoints
//!
//! Every handler takes the user id from the [`AuthContext`] attached by the
//! auth middleware; request bodies never carry a user id.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use compass_core::expr::Responses;
use compass_core::{
    AssessmentAnalytics, AuthContext, CatalogDocument, PathUpdate, PrePopulationOpportunity,
    ProgressSummary, QuestionBatch, RecordedResponse, ResponseSubmission, SeedReport,
    StartedAssessment,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::AppState;

fn user_id(auth: &AuthContext) -> Result<i64, ApiError> {
    auth.user_id()
        .ok_or_else(|| ApiError::unauthorized("no authenticated user"))
}

/// POST /api/adaptive/initialize - seed the built-in catalog
pub async fn initialize(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeedReport>, ApiError> {
    let catalog = CatalogDocument::builtin().map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(state.engine.load_catalog(&catalog)?))
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StartRequest {
    /// Answers used to classify a user who has no path yet
    #[serde(default)]
    pub initial_responses: Responses,
}

/// POST /api/adaptive/start - classify or resume
pub async fn start(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<StartRequest>,
) -> Result<Json<StartedAssessment>, ApiError> {
    let user_id = user_id(&auth)?;
    Ok(Json(state.engine.start(user_id, &body.initial_responses)?))
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NextQuestionsRequest {
    /// Unsaved answers to consider when filtering
    #[serde(default)]
    pub new_responses: Responses,
}

/// POST /api/adaptive/questions/next
pub async fn next_questions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<NextQuestionsRequest>,
) -> Result<Json<QuestionBatch>, ApiError> {
    let user_id = user_id(&auth)?;
    Ok(Json(state.engine.next_questions(user_id, &body.new_responses)?))
}

/// Body of POST /api/adaptive/response
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseRequest {
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub response_value: serde_json::Value,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub is_pre_populated: bool,
    #[serde(default)]
    pub time_spent: u32,
}

impl ResponseRequest {
    fn into_submission(self) -> Result<ResponseSubmission, ApiError> {
        if self.question_id.trim().is_empty() || self.response_value.is_null() {
            return Err(ApiError::bad_request(
                "question_id and response_value are required",
            ));
        }
        let mut submission = ResponseSubmission::new(self.question_id, self.response_value)
            .with_time_spent(self.time_spent);
        if let Some(confidence) = self.confidence {
            submission = submission.with_confidence(confidence);
        }
        submission.is_pre_populated = self.is_pre_populated;
        Ok(submission)
    }
}

/// POST /api/adaptive/response
pub async fn record_response(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<ResponseRequest>,
) -> Result<Json<RecordedResponse>, ApiError> {
    let user_id = user_id(&auth)?;
    let submission = body.into_submission()?;
    Ok(Json(state.engine.record_response(user_id, submission)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkipRequest {
    pub question_id: String,
}

/// POST /api/adaptive/skip
pub async fn skip_question(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<SkipRequest>,
) -> Result<Json<ProgressSummary>, ApiError> {
    let user_id = user_id(&auth)?;
    if body.question_id.trim().is_empty() {
        return Err(ApiError::bad_request("question_id is required"));
    }
    Ok(Json(state.engine.skip_question(user_id, &body.question_id)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrePopulateResponse {
    pub pre_populated_count: usize,
    pub pre_populated_questions: Vec<PrePopulationOpportunity>,
}

/// POST /api/adaptive/pre-populate - save every available suggestion
pub async fn pre_populate(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PrePopulateResponse>, ApiError> {
    let user_id = user_id(&auth)?;
    let applied = state.engine.apply_prepopulation(user_id)?;
    Ok(Json(PrePopulateResponse {
        pre_populated_count: applied.len(),
        pre_populated_questions: applied,
    }))
}

/// POST /api/adaptive/path/update - re-classify against stored answers
pub async fn update_path(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PathUpdate>, ApiError> {
    let user_id = user_id(&auth)?;
    Ok(Json(state.engine.reclassify(user_id)?))
}

/// GET /api/adaptive/progress
pub async fn progress(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProgressSummary>, ApiError> {
    let user_id = user_id(&auth)?;
    Ok(Json(state.engine.progress(user_id)?))
}

/// GET /api/adaptive/analytics
pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AssessmentAnalytics>, ApiError> {
    let user_id = user_id(&auth)?;
    Ok(Json(state.engine.analytics(user_id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_request_requires_fields() {
        let body: ResponseRequest = serde_json::from_value(json!({"question_id": "x"})).unwrap();
        assert!(body.into_submission().is_err());

        let body: ResponseRequest =
            serde_json::from_value(json!({"response_value": 3})).unwrap();
        assert!(body.into_submission().is_err());
    }

    #[test]
    fn test_response_request_defaults_confidence() {
        let body: ResponseRequest = serde_json::from_value(json!({
            "question_id": "risk_tolerance",
            "response_value": 6,
            "time_spent": 40
        }))
        .unwrap();
        let submission = body.into_submission().unwrap();
        assert_eq!(submission.confidence, 1.0);
        assert_eq!(submission.time_spent, 40);
    }

    #[test]
    fn test_user_id_requires_authentication() {
        assert!(user_id(&AuthContext::Anonymous).is_err());
    }
}
