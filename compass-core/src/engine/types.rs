//! Engine inputs and results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{ExplanationLevel, Priority, Question, QuestionType};
use crate::path::{AssessmentPath, PathScope, PathStatus};
use crate::persona::{PathConfig, Persona};

/// A question as presented to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPrompt {
    pub question_id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub options: serde_json::Value,
    pub category: String,
    pub subcategory: String,
    pub priority: Priority,
    /// Taken from the user's path, not the question
    pub explanation_level: ExplanationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_populated_value: Option<String>,
}

impl QuestionPrompt {
    pub(crate) fn new(
        question: &Question,
        explanation_level: ExplanationLevel,
        pre_populated_value: Option<String>,
    ) -> Self {
        Self {
            question_id: question.question_id.clone(),
            text: question.text.clone(),
            question_type: question.question_type,
            options: question.options.clone(),
            category: question.category.clone(),
            subcategory: question.subcategory.clone(),
            priority: question.priority,
            explanation_level,
            pre_populated_value,
        }
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// An answer submitted by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSubmission {
    pub question_id: String,
    pub response_value: serde_json::Value,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub is_pre_populated: bool,
    #[serde(default)]
    pub pre_population_source: Option<String>,
    /// Seconds spent answering
    #[serde(default)]
    pub time_spent: u32,
}

impl ResponseSubmission {
    pub fn new(question_id: impl Into<String>, response_value: serde_json::Value) -> Self {
        Self {
            question_id: question_id.into(),
            response_value,
            confidence: default_confidence(),
            is_pre_populated: false,
            pre_population_source: None,
            time_spent: 0,
        }
    }

    pub fn with_time_spent(mut self, seconds: u32) -> Self {
        self.time_spent = seconds;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Aggregate view of a user's path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub status: PathStatus,
    pub path_type: Option<Persona>,
    pub path_description: Option<String>,
    pub completion_percentage: f64,
    /// Completed questions within the path's priority filter
    pub questions_completed: usize,
    pub questions_skipped: usize,
    pub total_questions: u32,
    pub estimated_completion_time: u32,
    /// Minutes
    pub actual_time_spent: u32,
    pub remaining_time: u32,
    pub current_question_id: Option<String>,
}

impl ProgressSummary {
    pub fn not_started() -> Self {
        Self {
            status: PathStatus::NotStarted,
            path_type: None,
            path_description: None,
            completion_percentage: 0.0,
            questions_completed: 0,
            questions_skipped: 0,
            total_questions: 0,
            estimated_completion_time: 0,
            actual_time_spent: 0,
            remaining_time: 0,
            current_question_id: None,
        }
    }

    pub(crate) fn for_path(path: &AssessmentPath, scope: &PathScope) -> Self {
        Self {
            status: path.status(),
            path_type: Some(path.persona),
            path_description: Some(path.persona.description().to_string()),
            completion_percentage: path.completion_percentage,
            questions_completed: path.completed_within(scope),
            questions_skipped: path.skipped.len(),
            total_questions: scope.total(),
            estimated_completion_time: path.estimated_minutes,
            actual_time_spent: path.actual_minutes(),
            remaining_time: path.remaining_minutes(),
            current_question_id: path.current_question_id.clone(),
        }
    }
}

/// Result of starting or resuming an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartedAssessment {
    pub path_type: Persona,
    pub path_config: PathConfig,
    pub questions: Vec<QuestionPrompt>,
    pub progress: ProgressSummary,
}

/// A batch of questions plus current progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBatch {
    pub questions: Vec<QuestionPrompt>,
    pub progress: ProgressSummary,
    pub has_more_questions: bool,
}

/// Result of recording a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub progress: ProgressSummary,
    /// Suggestions that became available with this answer
    pub pre_populated_questions: Vec<PrePopulationOpportunity>,
}

/// Result of re-classifying a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathUpdate {
    pub path_changed: bool,
    /// None when the user has no path yet
    pub path_type: Option<Persona>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_config: Option<PathConfig>,
}

/// A suggested answer for an unanswered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrePopulationOpportunity {
    pub question_id: String,
    pub question_text: String,
    /// Display form of the suggestion
    pub pre_populated_value: String,
    /// The suggestion as it is stored when applied
    pub response_value: serde_json::Value,
    pub confidence: f64,
    /// Rule name, or `question_logic`
    pub source: String,
}

/// Per-user response statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentAnalytics {
    pub total_responses: usize,
    pub pre_populated_responses: usize,
    pub average_confidence: f64,
    /// Minutes
    pub time_saved_estimate: u32,
    /// Percent, one decimal
    pub path_efficiency: f64,
    pub question_categories: BTreeMap<String, usize>,
}

/// Counts from loading a catalog into the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedReport {
    pub questions_inserted: usize,
    pub questions_existing: usize,
    pub rules_inserted: usize,
    pub rules_existing: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_defaults() {
        let submission: ResponseSubmission = serde_json::from_value(json!({
            "question_id": "risk_tolerance",
            "response_value": 7
        }))
        .unwrap();
        assert_eq!(submission.confidence, 1.0);
        assert!(!submission.is_pre_populated);
        assert_eq!(submission.time_spent, 0);
    }

    #[test]
    fn test_prompt_omits_missing_suggestion() {
        let prompt = QuestionPrompt {
            question_id: "core_motivation".into(),
            text: "Why?".into(),
            question_type: QuestionType::Text,
            options: serde_json::Value::Null,
            category: "self_discovery".into(),
            subcategory: "motivation".into(),
            priority: Priority::Critical,
            explanation_level: ExplanationLevel::Detailed,
            pre_populated_value: None,
        };
        let json = serde_json::to_value(&prompt).unwrap();
        assert!(json.get("pre_populated_value").is_none());
        assert_eq!(json["explanation_level"], "detailed");
    }

    #[test]
    fn test_not_started_progress() {
        let progress = ProgressSummary::not_started();
        assert_eq!(progress.status, PathStatus::NotStarted);
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["status"], "not_started");
        assert!(json["path_type"].is_null());
    }
}
