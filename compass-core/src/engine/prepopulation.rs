//! Suggested answers derived from earlier responses

use std::collections::HashSet;

use super::error::EngineError;
use super::service::AdaptiveEngine;
use super::types::{PrePopulationOpportunity, ResponseSubmission};
use crate::catalog::PrePopulationRule;
use crate::store::AssessmentStore;

/// Source label for suggestions computed from a question's own logic
pub const QUESTION_LOGIC_SOURCE: &str = "question_logic";

impl<S: AssessmentStore> AdaptiveEngine<S> {
    /// Suggestions for every unanswered question, in catalog order.
    ///
    /// A question's own logic takes precedence over rules targeting it.
    pub fn prepopulation_opportunities(
        &self,
        user_id: i64,
    ) -> Result<Vec<PrePopulationOpportunity>, EngineError> {
        let responses = self.known_responses(user_id)?;
        let questions = self.store.list_questions()?;
        let known_ids: HashSet<&str> = questions.iter().map(|q| q.question_id.as_str()).collect();

        let rules: Vec<PrePopulationRule> = self
            .store
            .list_active_rules()?
            .into_iter()
            .filter(|rule| {
                let known = known_ids.contains(rule.target_question_id.as_str());
                if !known {
                    tracing::warn!(
                        rule = %rule.rule_name,
                        target = %rule.target_question_id,
                        "Skipping pre-population rule for unknown question"
                    );
                }
                known
            })
            .collect();

        let mut opportunities = Vec::new();
        for question in questions
            .iter()
            .filter(|q| !responses.contains_key(&q.question_id))
        {
            let from_logic = question.suggested_value(&responses).map(|value| {
                (
                    value,
                    self.config.prepopulation_confidence,
                    QUESTION_LOGIC_SOURCE.to_string(),
                )
            });
            let suggestion = from_logic.or_else(|| {
                rules
                    .iter()
                    .filter(|rule| rule.target_question_id == question.question_id)
                    .find_map(|rule| {
                        rule.suggested_value(&responses).map(|value| {
                            (value, rule.confidence_threshold, rule.rule_name.clone())
                        })
                    })
            });

            if let Some((value, confidence, source)) = suggestion {
                opportunities.push(PrePopulationOpportunity {
                    question_id: question.question_id.clone(),
                    question_text: question.text.clone(),
                    pre_populated_value: value.to_string(),
                    response_value: value.to_json(),
                    confidence,
                    source,
                });
            }
        }
        Ok(opportunities)
    }

    /// Record every current suggestion as a pre-populated response.
    ///
    /// The batch is stored in one transaction.
    pub fn apply_prepopulation(
        &self,
        user_id: i64,
    ) -> Result<Vec<PrePopulationOpportunity>, EngineError> {
        let opportunities = self.prepopulation_opportunities(user_id)?;
        if opportunities.is_empty() {
            return Ok(opportunities);
        }

        let submissions: Vec<ResponseSubmission> = opportunities
            .iter()
            .map(|opportunity| ResponseSubmission {
                question_id: opportunity.question_id.clone(),
                response_value: opportunity.response_value.clone(),
                confidence: opportunity.confidence,
                is_pre_populated: true,
                pre_population_source: Some(opportunity.source.clone()),
                time_spent: 0,
            })
            .collect();
        self.save_responses(user_id, &submissions)?;
        tracing::info!(user_id, count = opportunities.len(), "Applied pre-populated answers");
        Ok(opportunities)
    }
}
