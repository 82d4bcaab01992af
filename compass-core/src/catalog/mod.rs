//! Question catalog: reference questions and pre-population rules

mod types;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expr;

pub use types::{ExplanationLevel, Priority, PrePopulationRule, Question, QuestionType};

/// Built-in catalog shipped with the binary
const SEED_CATALOG: &str = include_str!("seed.json");

/// Errors loading a catalog document
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate question id: {0}")]
    DuplicateQuestion(String),

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("Rule {rule} has confidence threshold {value} outside [0, 1]")]
    InvalidConfidence { rule: String, value: f64 },
}

/// A catalog as loaded from JSON: questions in catalog order plus rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub rules: Vec<PrePopulationRule>,
}

impl CatalogDocument {
    /// The built-in seed catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(SEED_CATALOG)
    }

    /// Parse and validate a catalog document
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    /// Reject structural problems; log expressions that will never evaluate.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut ids = HashSet::new();
        for question in &self.questions {
            if !ids.insert(question.question_id.as_str()) {
                return Err(CatalogError::DuplicateQuestion(question.question_id.clone()));
            }
        }

        let mut names = HashSet::new();
        for rule in &self.rules {
            if !names.insert(rule.rule_name.as_str()) {
                return Err(CatalogError::DuplicateRule(rule.rule_name.clone()));
            }
            if !(0.0..=1.0).contains(&rule.confidence_threshold) {
                return Err(CatalogError::InvalidConfidence {
                    rule: rule.rule_name.clone(),
                    value: rule.confidence_threshold,
                });
            }
        }

        for question in &self.questions {
            let expressions = question
                .skip_conditions
                .iter()
                .chain(question.pre_populate_logic.iter());
            for source in expressions {
                if let Err(e) = expr::parse(source) {
                    tracing::warn!(
                        question = %question.question_id,
                        expression = %source,
                        error = %e,
                        "Catalog expression will never evaluate"
                    );
                }
            }
            for dependency in &question.dependencies {
                if !ids.contains(dependency.as_str()) {
                    tracing::warn!(
                        question = %question.question_id,
                        dependency = %dependency,
                        "Question depends on an id missing from the catalog"
                    );
                }
            }
        }

        for rule in &self.rules {
            if let Err(e) = expr::parse(&rule.logic_expression) {
                tracing::warn!(rule = %rule.rule_name, error = %e, "Rule expression will never evaluate");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = CatalogDocument::builtin().unwrap();
        assert!(catalog.questions.len() >= 10);
        assert_eq!(catalog.rules.len(), 2);
        assert_eq!(catalog.questions[0].question_id, "core_motivation");
    }

    #[test]
    fn builtin_expressions_all_parse() {
        let catalog = CatalogDocument::builtin().unwrap();
        for question in &catalog.questions {
            for condition in &question.skip_conditions {
                assert!(expr::parse(condition).is_ok(), "{}", condition);
            }
            if let Some(logic) = &question.pre_populate_logic {
                assert!(expr::parse(logic).is_ok(), "{}", logic);
            }
        }
        for rule in &catalog.rules {
            assert!(expr::parse(&rule.logic_expression).is_ok());
        }
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let json = r#"{"questions": [
            {"question_id": "a", "category": "c", "subcategory": "s", "text": "t", "question_type": "text", "priority": 1},
            {"question_id": "a", "category": "c", "subcategory": "s", "text": "t", "question_type": "text", "priority": 2}
        ]}"#;
        let err = CatalogDocument::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateQuestion(id) if id == "a"));
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let json = r#"{"questions": [
            {"question_id": "a", "category": "c", "subcategory": "s", "text": "t", "question_type": "text", "priority": 7}
        ]}"#;
        assert!(matches!(
            CatalogDocument::from_json_str(json),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn rejects_bad_confidence() {
        let json = r#"{"rules": [
            {"rule_name": "r", "target_question_id": "a", "source_question_ids": ["b"],
             "logic_expression": "b", "confidence_threshold": 1.5}
        ]}"#;
        assert!(matches!(
            CatalogDocument::from_json_str(json),
            Err(CatalogError::InvalidConfidence { .. })
        ));
    }

    #[test]
    fn accepts_unparseable_expressions() {
        let json = r#"{"questions": [
            {"question_id": "a", "category": "c", "subcategory": "s", "text": "t", "question_type": "text",
             "priority": 1, "skip_conditions": ["eval('boom')"]}
        ]}"#;
        assert!(CatalogDocument::from_json_str(json).is_ok());
    }
}
