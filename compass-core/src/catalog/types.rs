//! Question catalog types

use serde::{Deserialize, Serialize};

use crate::expr::{self, Responses, Value};

/// Question importance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Critical = 1,
    Important = 2,
    Optional = 3,
}

impl Priority {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Critical),
            2 => Ok(Priority::Important),
            3 => Ok(Priority::Optional),
            other => Err(format!("priority must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.as_u8()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    Text,
    Scale,
    Matrix,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::Text => "text",
            Self::Scale => "scale",
            Self::Matrix => "matrix",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" => Some(Self::MultipleChoice),
            "text" => Some(Self::Text),
            "scale" => Some(Self::Scale),
            "matrix" => Some(Self::Matrix),
            _ => None,
        }
    }
}

/// How much guidance accompanies each question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationLevel {
    Minimal,
    #[default]
    Standard,
    Detailed,
    Technical,
    Visual,
}

impl ExplanationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Standard => "standard",
            Self::Detailed => "detailed",
            Self::Technical => "technical",
            Self::Visual => "visual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "minimal" => Some(Self::Minimal),
            "standard" => Some(Self::Standard),
            "detailed" => Some(Self::Detailed),
            "technical" => Some(Self::Technical),
            "visual" => Some(Self::Visual),
            _ => None,
        }
    }
}

/// A catalog question. Reference data, never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub category: String,
    pub subcategory: String,
    pub text: String,
    pub question_type: QuestionType,
    /// Choice list, or `{min, max, labels}` for scales
    #[serde(default)]
    pub options: serde_json::Value,
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub skip_conditions: Vec<String>,
    #[serde(default)]
    pub pre_populate_sources: Vec<String>,
    #[serde(default)]
    pub pre_populate_logic: Option<String>,
    #[serde(default)]
    pub explanation_level: ExplanationLevel,
}

impl Question {
    /// True when any skip condition holds for the given responses
    pub fn should_skip(&self, responses: &Responses) -> bool {
        self.skip_conditions
            .iter()
            .any(|condition| expr::evaluate_condition(condition, responses))
    }

    /// Suggested answer derived from earlier responses, if every source is known
    pub fn suggested_value(&self, responses: &Responses) -> Option<Value> {
        let logic = self.pre_populate_logic.as_deref()?;
        derive_suggestion(&self.pre_populate_sources, logic, responses)
    }

    /// [`Question::suggested_value`] rendered for display
    pub fn pre_populated_value(&self, responses: &Responses) -> Option<String> {
        self.suggested_value(responses)?.as_suggestion()
    }
}

/// Named pre-population rule targeting a catalog question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrePopulationRule {
    pub rule_name: String,
    pub target_question_id: String,
    pub source_question_ids: Vec<String>,
    pub logic_expression: String,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_active() -> bool {
    true
}

impl PrePopulationRule {
    pub fn suggested_value(&self, responses: &Responses) -> Option<Value> {
        derive_suggestion(&self.source_question_ids, &self.logic_expression, responses)
    }
}

/// Evaluate pre-population logic once all sources have answers.
///
/// Blank results (null, empty string) are not suggestions.
fn derive_suggestion(sources: &[String], logic: &str, responses: &Responses) -> Option<Value> {
    if sources.is_empty() || logic.trim().is_empty() {
        return None;
    }
    if !sources.iter().all(|source| responses.contains_key(source)) {
        return None;
    }
    match expr::evaluate_value(logic, responses) {
        Ok(value) if value.is_blank() => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(logic = %logic, error = %e, "Pre-population logic failed");
            None
        }
    }
}
