//! Tree-walking evaluator

use std::cmp::Ordering;

use super::Responses;
use super::ast::{ArithOp, CompareOp, Expr};
use super::error::ExprError;
use super::value::Value;

/// Evaluate a parsed expression against known responses.
pub fn evaluate(expr: &Expr, responses: &Responses) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(name) => match responses.get(name) {
            Some(json) => Value::from_json(name, json),
            None => Err(ExprError::UnknownIdentifier(name.clone())),
        },
        Expr::List(items) => Ok(Value::List(
            items
                .iter()
                .map(|item| evaluate(item, responses))
                .collect::<Result<_, _>>()?,
        )),
        Expr::Neg(inner) => match evaluate(inner, responses)? {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(ExprError::TypeMismatch {
                op: "-",
                left: other.type_name(),
                right: "nothing",
            }),
        },
        Expr::Not(inner) => Ok(Value::Bool(!evaluate(inner, responses)?.is_truthy())),
        Expr::And(left, right) => {
            let left = evaluate(left, responses)?;
            if !left.is_truthy() {
                return Ok(left);
            }
            evaluate(right, responses)
        }
        Expr::Or(left, right) => {
            let left = evaluate(left, responses)?;
            if left.is_truthy() {
                return Ok(left);
            }
            evaluate(right, responses)
        }
        Expr::Arith(op, left, right) => {
            let left = evaluate(left, responses)?;
            let right = evaluate(right, responses)?;
            arithmetic(*op, left, right)
        }
        Expr::Compare(first, links) => {
            let mut left = evaluate(first, responses)?;
            for (op, next) in links {
                let right = evaluate(next, responses)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            if evaluate(cond, responses)?.is_truthy() {
                evaluate(then, responses)
            } else {
                evaluate(otherwise, responses)
            }
        }
    }
}

fn arithmetic(op: ArithOp, left: Value, right: Value) -> Result<Value, ExprError> {
    match (op, left, right) {
        (_, Value::Number(a), Value::Number(b)) => {
            let result = match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div | ArithOp::Rem if b == 0.0 => return Err(ExprError::DivisionByZero),
                ArithOp::Div => a / b,
                ArithOp::Rem => a.rem_euclid(b),
            };
            Ok(Value::Number(result))
        }
        (ArithOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (ArithOp::Add, Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (op, left, right) => Err(ExprError::TypeMismatch {
            op: op.symbol(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, ExprError> {
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::NotEq => Ok(left != right),
        CompareOp::In => contains(right, left),
        CompareOp::NotIn => contains(right, left).map(|found| !found),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = order(op, left, right)?;
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

fn order(op: CompareOp, left: &Value, right: &Value) -> Result<Ordering, ExprError> {
    let mismatch = || ExprError::TypeMismatch {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).ok_or_else(mismatch),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => Err(mismatch()),
    }
}

fn contains(haystack: &Value, needle: &Value) -> Result<bool, ExprError> {
    match (haystack, needle) {
        (Value::List(items), needle) => Ok(items.iter().any(|item| item == needle)),
        (Value::Str(text), Value::Str(part)) => Ok(text.contains(part.as_str())),
        _ => Err(ExprError::TypeMismatch {
            op: "in",
            left: needle.type_name(),
            right: haystack.type_name(),
        }),
    }
}
