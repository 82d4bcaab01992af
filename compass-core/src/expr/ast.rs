//! Expression syntax tree

use std::collections::BTreeSet;

use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

/// Parsed expression.
///
/// Only literals, variable lookups, arithmetic, comparisons and boolean
/// connectives exist; there is no call or member access node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    List(Vec<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    /// Chained comparison: `a < b <= c` holds when every link holds
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    /// `then if cond else otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    /// Every variable name referenced by the expression
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Var(name) => {
                names.insert(name.clone());
            }
            Expr::List(items) => items.iter().for_each(|e| e.collect_identifiers(names)),
            Expr::Neg(inner) | Expr::Not(inner) => inner.collect_identifiers(names),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Arith(_, l, r) => {
                l.collect_identifiers(names);
                r.collect_identifiers(names);
            }
            Expr::Compare(first, rest) => {
                first.collect_identifiers(names);
                rest.iter().for_each(|(_, e)| e.collect_identifiers(names));
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_identifiers(names);
                then.collect_identifiers(names);
                otherwise.collect_identifiers(names);
            }
        }
    }
}
