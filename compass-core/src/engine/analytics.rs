//! Per-user response statistics

use std::collections::{BTreeMap, HashMap};

use super::error::EngineError;
use super::service::AdaptiveEngine;
use super::types::AssessmentAnalytics;
use crate::path::AssessmentPath;
use crate::store::AssessmentStore;

impl<S: AssessmentStore> AdaptiveEngine<S> {
    pub fn analytics(&self, user_id: i64) -> Result<AssessmentAnalytics, EngineError> {
        let responses = self.store.get_responses(user_id)?;
        let path = self.store.get_path(user_id)?;

        let categories: HashMap<String, String> = self
            .store
            .list_questions()?
            .into_iter()
            .map(|q| (q.question_id, q.category))
            .collect();
        let mut question_categories = BTreeMap::new();
        for response in &responses {
            if let Some(category) = categories.get(&response.question_id) {
                *question_categories.entry(category.clone()).or_insert(0) += 1;
            }
        }

        let pre_populated = responses.iter().filter(|r| r.is_pre_populated).count();
        let average_confidence = if responses.is_empty() {
            0.0
        } else {
            responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64
        };
        let skipped = path.as_ref().map_or(0, |p| p.skipped.len());
        let time_saved = (skipped + pre_populated) as u32 * self.config.minutes_saved_per_question;

        Ok(AssessmentAnalytics {
            total_responses: responses.len(),
            pre_populated_responses: pre_populated,
            average_confidence,
            time_saved_estimate: time_saved,
            path_efficiency: path.as_ref().map_or(0.0, path_efficiency),
            question_categories,
        })
    }
}

/// Estimated over actual minutes as a percentage, capped at 100
fn path_efficiency(path: &AssessmentPath) -> f64 {
    if path.estimated_minutes == 0 {
        return 0.0;
    }
    let ratio = (path.estimated_minutes as f64 / path.actual_minutes().max(1) as f64).min(1.0);
    (ratio * 1000.0).round() / 10.0
}
