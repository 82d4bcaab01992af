//! Expression error types

use thiserror::Error;

/// Errors from tokenizing, parsing or evaluating an expression.
///
/// These never escape the engine: a failing condition reads as `false` and a
/// failing pre-population expression yields no suggestion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression longer than {0} bytes")]
    TooLong(usize),

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("unsupported response value for {0}")]
    UnsupportedValue(String),
}
