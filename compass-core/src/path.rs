//! Per-user assessment path state

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Question;
use crate::persona::{Classification, PathConfig, Persona};

/// Lifecycle of a user's path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Question ids visible to a path's priority filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathScope {
    question_ids: HashSet<String>,
}

impl PathScope {
    pub fn new(config: &PathConfig, catalog: &[Question]) -> Self {
        Self {
            question_ids: catalog
                .iter()
                .filter(|q| config.includes(q.priority))
                .map(|q| q.question_id.clone())
                .collect(),
        }
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.question_ids.contains(question_id)
    }

    /// Number of questions on the path
    pub fn total(&self) -> u32 {
        u32::try_from(self.question_ids.len()).unwrap_or(u32::MAX)
    }
}

/// A user's assessment path: chosen persona, its configuration snapshot
/// and completion bookkeeping.
///
/// A question id lives in at most one of `completed` and `skipped`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPath {
    pub user_id: i64,
    pub persona: Persona,
    pub config: PathConfig,
    pub current_question_id: Option<String>,
    pub completed: Vec<String>,
    pub skipped: Vec<String>,
    pub estimated_minutes: u32,
    pub actual_seconds: u64,
    pub completion_percentage: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AssessmentPath {
    pub fn new(user_id: i64, classification: Classification, now: i64) -> Self {
        Self {
            user_id,
            persona: classification.persona,
            estimated_minutes: classification.config.estimated_minutes,
            config: classification.config,
            current_question_id: None,
            completed: Vec::new(),
            skipped: Vec::new(),
            actual_seconds: 0,
            completion_percentage: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_excluded(&self, question_id: &str) -> bool {
        self.is_completed(question_id) || self.is_skipped(question_id)
    }

    pub fn is_completed(&self, question_id: &str) -> bool {
        self.completed.iter().any(|id| id == question_id)
    }

    pub fn is_skipped(&self, question_id: &str) -> bool {
        self.skipped.iter().any(|id| id == question_id)
    }

    /// Move a question into `completed`. Returns false if it already was.
    pub fn mark_completed(&mut self, question_id: &str) -> bool {
        self.skipped.retain(|id| id != question_id);
        if self.is_completed(question_id) {
            return false;
        }
        self.completed.push(question_id.to_string());
        true
    }

    /// Add a question to `skipped`. Returns false if it was already skipped.
    ///
    /// Callers must reject completed questions first.
    pub fn mark_skipped(&mut self, question_id: &str) -> bool {
        if self.is_skipped(question_id) {
            return false;
        }
        self.skipped.push(question_id.to_string());
        true
    }

    /// Completed questions that lie on the path.
    ///
    /// Answers outside the priority filter stay in `completed` but do not
    /// count towards progress.
    pub fn completed_within(&self, scope: &PathScope) -> usize {
        self.completed.iter().filter(|id| scope.contains(id)).count()
    }

    /// Recompute completion against the questions visible to the path
    pub fn recompute_percentage(&mut self, scope: &PathScope) {
        let total = scope.total();
        self.completion_percentage = if total == 0 {
            0.0
        } else {
            self.completed_within(scope) as f64 / total as f64 * 100.0
        };
    }

    /// Replace the configuration snapshot if the persona changed.
    ///
    /// Completed and skipped sets are kept. Returns true when the path changed.
    pub fn apply_classification(&mut self, classification: Classification) -> bool {
        if classification.persona == self.persona {
            return false;
        }
        self.persona = classification.persona;
        self.estimated_minutes = classification.config.estimated_minutes;
        self.config = classification.config;
        true
    }

    pub fn add_time(&mut self, seconds: u32) {
        self.actual_seconds = self.actual_seconds.saturating_add(seconds as u64);
    }

    pub fn actual_minutes(&self) -> u32 {
        u32::try_from(self.actual_seconds / 60).unwrap_or(u32::MAX)
    }

    pub fn remaining_minutes(&self) -> u32 {
        self.estimated_minutes.saturating_sub(self.actual_minutes())
    }

    pub fn status(&self) -> PathStatus {
        if self.completion_percentage >= 100.0 {
            PathStatus::Completed
        } else {
            PathStatus::InProgress
        }
    }
}
