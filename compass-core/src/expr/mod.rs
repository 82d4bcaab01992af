//! Sandboxed condition and pre-population expressions
//!
//! Catalog entries carry small expressions such as
//! `business_knowledge_level <= 2` or `current_savings / monthly_expenses`.
//! They are parsed into an [`Expr`] tree and evaluated against a user's
//! known responses. The grammar has literals, variable lookups, arithmetic,
//! comparisons, membership, boolean connectives and a conditional form, and
//! nothing else: no calls, no member access, no host interaction.
//!
//! Failures never propagate out of [`evaluate_condition`]: a condition that
//! cannot be evaluated yet (unknown identifier, type mismatch, syntax error)
//! reads as `false`.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;
mod value;

use std::collections::BTreeMap;

pub use ast::{ArithOp, CompareOp, Expr};
pub use error::ExprError;
pub use eval::evaluate;
pub use parser::{MAX_DEPTH, MAX_LEN, parse};
pub use value::Value;

/// Known answers keyed by question id
pub type Responses = BTreeMap<String, serde_json::Value>;

/// Evaluate a condition; any failure yields `false`.
pub fn evaluate_condition(source: &str, responses: &Responses) -> bool {
    match evaluate_value(source, responses) {
        Ok(value) => value.is_truthy(),
        Err(e) => {
            tracing::debug!(condition = %source, error = %e, "Condition not satisfiable");
            false
        }
    }
}

/// Parse and evaluate an expression to a value.
pub fn evaluate_value(source: &str, responses: &Responses) -> Result<Value, ExprError> {
    let expr = parse(source)?;
    evaluate(&expr, responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_condition_is_false() {
        let responses = Responses::new();
        assert!(!evaluate_condition("a ==", &responses));
        assert!(!evaluate_condition("__import__('os')", &responses));
        assert!(!evaluate_condition("", &responses));
    }

    #[test]
    fn unknown_identifier_is_false() {
        let responses = Responses::new();
        assert!(!evaluate_condition("work_experience >= 5", &responses));
    }

    #[test]
    fn satisfied_condition_is_true() {
        let mut responses = Responses::new();
        responses.insert("leadership_roles".into(), json!(1));
        assert!(evaluate_condition("leadership_roles > 0", &responses));
    }

    #[test]
    fn truthy_non_boolean_result_counts() {
        let mut responses = Responses::new();
        responses.insert("notes".into(), json!("something"));
        assert!(evaluate_condition("notes", &responses));
    }
}
