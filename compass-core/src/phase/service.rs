//! Phase assessment and profile operations

use std::sync::Arc;

use chrono::Utc;

use super::error::PhaseError;
use super::types::{
    EntrepreneurProfile, Phase, PhaseAssessment, PhaseOverview, PhaseResponseInput,
    PhaseResponses, ProfileUpdate, ProgressUpdate,
};
use crate::store::PhaseStore;

/// Python-style truthiness for a client-supplied JSON value
fn has_content(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
    }
}

/// Tracks each user's runs through the fixed phases and their profile
pub struct PhaseService<S: PhaseStore> {
    store: Arc<S>,
}

impl<S: PhaseStore> PhaseService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All phases in order, with the user's progress on each
    pub fn phases(&self, user_id: i64) -> Result<Vec<PhaseOverview>, PhaseError> {
        let assessments = self.store.list_assessments(user_id)?;
        Ok(Phase::ALL
            .into_iter()
            .map(|phase| {
                let assessment = assessments.iter().find(|a| a.phase_id == phase);
                PhaseOverview::new(phase, assessment)
            })
            .collect())
    }

    /// Start a phase, or resume the user's existing run of it
    pub fn start(&self, user_id: i64, phase_id: &str) -> Result<PhaseAssessment, PhaseError> {
        let phase =
            Phase::parse(phase_id).ok_or_else(|| PhaseError::UnknownPhase(phase_id.to_string()))?;
        let assessment = self
            .store
            .start_assessment(user_id, phase, Utc::now().timestamp())?;
        tracing::info!(user_id, phase = %phase, assessment_id = assessment.id, "Started phase");
        Ok(assessment)
    }

    fn owned(&self, user_id: i64, assessment_id: i64) -> Result<PhaseAssessment, PhaseError> {
        self.store
            .get_assessment(user_id, assessment_id)?
            .ok_or(PhaseError::AssessmentNotFound(assessment_id))
    }

    /// Record or replace an answer within one of the user's phases
    pub fn save_response(
        &self,
        user_id: i64,
        assessment_id: i64,
        input: &PhaseResponseInput,
    ) -> Result<(), PhaseError> {
        self.owned(user_id, assessment_id)?;
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(PhaseError::MissingFields(missing));
        }

        self.store
            .save_phase_response(assessment_id, input, Utc::now().timestamp())?;
        tracing::debug!(
            user_id,
            assessment_id,
            question_id = %input.question_id,
            "Saved phase response"
        );
        Ok(())
    }

    pub fn update_progress(
        &self,
        user_id: i64,
        assessment_id: i64,
        update: ProgressUpdate,
    ) -> Result<PhaseAssessment, PhaseError> {
        let now = Utc::now().timestamp();
        let assessment = self
            .store
            .modify_assessment(user_id, assessment_id, |assessment| {
                if let Some(progress) = update.progress_percentage {
                    assessment.progress_percentage = progress.clamp(0.0, 100.0);
                }
                if update.is_completed {
                    assessment.is_completed = true;
                    assessment.completed_at = Some(now);
                    assessment.progress_percentage = 100.0;
                }
                if let Some(data) = update.assessment_data.filter(has_content) {
                    assessment.assessment_data = data;
                }
            })?
            .ok_or(PhaseError::AssessmentNotFound(assessment_id))?;

        if assessment.is_completed {
            tracing::info!(user_id, assessment_id, phase = %assessment.phase_id, "Phase completed");
        }
        Ok(assessment)
    }

    pub fn responses(
        &self,
        user_id: i64,
        assessment_id: i64,
    ) -> Result<PhaseResponses, PhaseError> {
        let assessment = self.owned(user_id, assessment_id)?;
        let responses = self.store.list_phase_responses(assessment_id)?;
        Ok(PhaseResponses {
            assessment,
            responses,
        })
    }

    /// The user's profile, created blank on first access
    pub fn profile(&self, user_id: i64) -> Result<EntrepreneurProfile, PhaseError> {
        Ok(self
            .store
            .modify_profile(user_id, Utc::now().timestamp(), |_| false)?)
    }

    pub fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<EntrepreneurProfile, PhaseError> {
        let profile = self
            .store
            .modify_profile(user_id, Utc::now().timestamp(), |profile| {
                update.apply(profile);
                true
            })?;
        tracing::info!(user_id, "Updated entrepreneur profile");
        Ok(profile)
    }
}
