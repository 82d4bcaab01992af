//! Adaptive assessment business logic

use std::sync::Arc;

use chrono::Utc;

use super::config::EngineConfig;
use super::error::EngineError;
use super::types::{
    PathUpdate, ProgressSummary, QuestionBatch, QuestionPrompt, RecordedResponse,
    ResponseSubmission, SeedReport, StartedAssessment,
};
use crate::catalog::{CatalogDocument, Question};
use crate::expr::Responses;
use crate::path::{AssessmentPath, PathScope};
use crate::persona::classify;
use crate::store::{AssessmentStore, StoredResponse};

/// Sequences questions, records answers and tracks each user's path
pub struct AdaptiveEngine<S: AssessmentStore> {
    pub(super) store: Arc<S>,
    pub(super) config: EngineConfig,
}

impl<S: AssessmentStore> AdaptiveEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Insert catalog questions and rules that are not stored yet
    pub fn load_catalog(&self, catalog: &CatalogDocument) -> Result<SeedReport, EngineError> {
        let mut report = SeedReport::default();
        for question in &catalog.questions {
            if self.store.insert_question(question)? {
                report.questions_inserted += 1;
            } else {
                report.questions_existing += 1;
            }
        }
        for rule in &catalog.rules {
            if self.store.insert_rule(rule)? {
                report.rules_inserted += 1;
            } else {
                report.rules_existing += 1;
            }
        }
        tracing::info!(
            questions_inserted = report.questions_inserted,
            rules_inserted = report.rules_inserted,
            "Loaded question catalog"
        );
        Ok(report)
    }

    pub fn questions(&self) -> Result<Vec<Question>, EngineError> {
        Ok(self.store.list_questions()?)
    }

    /// Stored answers keyed by question id
    pub fn known_responses(&self, user_id: i64) -> Result<Responses, EngineError> {
        Ok(self
            .store
            .get_responses(user_id)?
            .into_iter()
            .map(|response| (response.question_id, response.value))
            .collect())
    }

    /// Stored answers overlaid with answers supplied by the caller
    fn merged_responses(&self, user_id: i64, extra: &Responses) -> Result<Responses, EngineError> {
        let mut responses = self.known_responses(user_id)?;
        responses.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(responses)
    }

    /// Load the user's path, classifying and saving a new one if absent
    pub(super) fn load_or_create_path(
        &self,
        user_id: i64,
        responses: &Responses,
    ) -> Result<AssessmentPath, EngineError> {
        if let Some(path) = self.store.get_path(user_id)? {
            return Ok(path);
        }

        let classification = classify(responses);
        tracing::info!(
            user_id,
            persona = %classification.persona,
            score = classification.score,
            "Assigned assessment path"
        );
        let candidate = AssessmentPath::new(user_id, classification, Utc::now().timestamp());
        // Another request may have created the path first; the stored one wins
        self.store
            .modify_path(&candidate, &[], |_| Ok::<_, EngineError>(false))
    }

    fn scope(&self, path: &AssessmentPath) -> Result<PathScope, EngineError> {
        Ok(PathScope::new(&path.config, &self.store.list_questions()?))
    }

    /// Classify or resume, then hand out the first batch
    pub fn start(
        &self,
        user_id: i64,
        initial_responses: &Responses,
    ) -> Result<StartedAssessment, EngineError> {
        let responses = self.merged_responses(user_id, initial_responses)?;
        let path = self.load_or_create_path(user_id, &responses)?;
        let catalog = self.store.list_questions()?;
        let questions = self.select(&path, &catalog, &responses);
        let progress = ProgressSummary::for_path(&path, &PathScope::new(&path.config, &catalog));

        Ok(StartedAssessment {
            path_type: path.persona,
            path_config: path.config,
            questions,
            progress,
        })
    }

    /// Next questions for the user's path, in catalog order
    pub fn next_questions(
        &self,
        user_id: i64,
        new_responses: &Responses,
    ) -> Result<QuestionBatch, EngineError> {
        let responses = self.merged_responses(user_id, new_responses)?;
        let path = self.load_or_create_path(user_id, &responses)?;
        let catalog = self.store.list_questions()?;
        let questions = self.select(&path, &catalog, &responses);
        let progress = ProgressSummary::for_path(&path, &PathScope::new(&path.config, &catalog));

        Ok(QuestionBatch {
            has_more_questions: !questions.is_empty(),
            questions,
            progress,
        })
    }

    fn select(
        &self,
        path: &AssessmentPath,
        catalog: &[Question],
        responses: &Responses,
    ) -> Vec<QuestionPrompt> {
        catalog
            .iter()
            .filter(|q| path.config.includes(q.priority))
            .filter(|q| !path.is_excluded(&q.question_id))
            .filter(|q| !q.should_skip(responses))
            .take(self.config.batch_size)
            .map(|q| {
                QuestionPrompt::new(
                    q,
                    path.config.explanation_level,
                    q.pre_populated_value(responses),
                )
            })
            .collect()
    }

    /// Persist an answer and advance the user's path
    pub fn record_response(
        &self,
        user_id: i64,
        submission: ResponseSubmission,
    ) -> Result<RecordedResponse, EngineError> {
        let path = self.save_responses(user_id, std::slice::from_ref(&submission))?;

        let progress = ProgressSummary::for_path(&path, &self.scope(&path)?);
        let pre_populated_questions = self.prepopulation_opportunities(user_id)?;
        Ok(RecordedResponse {
            progress,
            pre_populated_questions,
        })
    }

    /// Upsert responses and advance the path in a single transaction.
    ///
    /// Either every submission is stored or none is.
    pub(super) fn save_responses(
        &self,
        user_id: i64,
        submissions: &[ResponseSubmission],
    ) -> Result<AssessmentPath, EngineError> {
        let catalog = self.store.list_questions()?;
        for submission in submissions {
            if !(0.0..=1.0).contains(&submission.confidence) {
                return Err(EngineError::InvalidResponse(format!(
                    "confidence {} outside [0, 1]",
                    submission.confidence
                )));
            }
            if !catalog.iter().any(|q| q.question_id == submission.question_id) {
                return Err(EngineError::UnknownQuestion(submission.question_id.clone()));
            }
        }

        let now = Utc::now().timestamp();
        let responses: Vec<StoredResponse> = submissions
            .iter()
            .map(|submission| StoredResponse {
                user_id,
                question_id: submission.question_id.clone(),
                value: submission.response_value.clone(),
                confidence: submission.confidence,
                is_pre_populated: submission.is_pre_populated,
                pre_population_source: submission.pre_population_source.clone(),
                time_spent: submission.time_spent,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let initial = self.load_or_create_path(user_id, &self.known_responses(user_id)?)?;
        let path = self.store.modify_path(&initial, &responses, |path| {
            for submission in submissions {
                path.mark_completed(&submission.question_id);
                path.current_question_id = Some(submission.question_id.clone());
                path.add_time(submission.time_spent);
            }
            path.recompute_percentage(&PathScope::new(&path.config, &catalog));
            path.updated_at = now;
            Ok::<_, EngineError>(true)
        })?;

        tracing::debug!(
            user_id,
            count = submissions.len(),
            completion = path.completion_percentage,
            "Recorded responses"
        );
        Ok(path)
    }

    /// Mark a question as skipped without answering it
    pub fn skip_question(
        &self,
        user_id: i64,
        question_id: &str,
    ) -> Result<ProgressSummary, EngineError> {
        let catalog = self.store.list_questions()?;
        if !catalog.iter().any(|q| q.question_id == question_id) {
            return Err(EngineError::UnknownQuestion(question_id.to_string()));
        }

        let initial = self.load_or_create_path(user_id, &self.known_responses(user_id)?)?;
        let now = Utc::now().timestamp();
        let path = self.store.modify_path(&initial, &[], |path| {
            if path.is_completed(question_id) {
                return Err(EngineError::AlreadyCompleted(question_id.to_string()));
            }
            if !path.mark_skipped(question_id) {
                return Ok(false);
            }
            path.recompute_percentage(&PathScope::new(&path.config, &catalog));
            path.updated_at = now;
            Ok(true)
        })?;

        tracing::debug!(user_id, question_id, "Skipped question");
        Ok(ProgressSummary::for_path(
            &path,
            &PathScope::new(&path.config, &catalog),
        ))
    }

    /// Re-run classification against stored answers
    pub fn reclassify(&self, user_id: i64) -> Result<PathUpdate, EngineError> {
        let Some(initial) = self.store.get_path(user_id)? else {
            return Ok(PathUpdate {
                path_changed: false,
                path_type: None,
                path_config: None,
            });
        };

        let classification = classify(&self.known_responses(user_id)?);
        let catalog = self.store.list_questions()?;
        let now = Utc::now().timestamp();
        let mut previous = initial.persona;
        let mut changed = false;
        let path = self.store.modify_path(&initial, &[], |path| {
            previous = path.persona;
            changed = path.apply_classification(classification);
            if changed {
                path.recompute_percentage(&PathScope::new(&path.config, &catalog));
                path.updated_at = now;
            }
            Ok::<_, EngineError>(changed)
        })?;

        if !changed {
            return Ok(PathUpdate {
                path_changed: false,
                path_type: Some(path.persona),
                path_config: None,
            });
        }
        tracing::info!(user_id, from = %previous, to = %path.persona, "Re-classified assessment path");

        Ok(PathUpdate {
            path_changed: true,
            path_type: Some(path.persona),
            path_config: Some(path.config),
        })
    }

    /// Read-only summary of the user's path
    pub fn progress(&self, user_id: i64) -> Result<ProgressSummary, EngineError> {
        match self.store.get_path(user_id)? {
            Some(path) => Ok(ProgressSummary::for_path(&path, &self.scope(&path)?)),
            None => Ok(ProgressSummary::not_started()),
        }
    }
}
