//! Parsed predicate expressions.
//!
//! The store does not parse a query language; callers hand it an already
//! built [`Expression`] tree.

use docstate_types::Value;
use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

/// Binary comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Predicate tree over field paths and literal values.
///
/// For multi-valued paths a positive predicate holds when any resolved value
/// satisfies it. Every `negated` form, and `NotEq`, is the logical negation
/// of the positive form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Matches every state.
    All,
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Compare {
        path: FieldPath,
        op: CompareOp,
        value: Value,
    },
    In {
        path: FieldPath,
        values: Vec<Value>,
        negated: bool,
    },
    Between {
        path: FieldPath,
        low: Value,
        high: Value,
        negated: bool,
    },
    /// SQL `LIKE`: `%` any run, `_` one character, `\` escapes.
    Like {
        path: FieldPath,
        pattern: String,
        case_insensitive: bool,
        negated: bool,
    },
    IsNull {
        path: FieldPath,
        negated: bool,
    },
}

impl Expression {
    pub fn and(children: impl IntoIterator<Item = Expression>) -> Self {
        Self::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = Expression>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    pub fn negate(inner: Expression) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn compare(path: FieldPath, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            path,
            op,
            value: value.into(),
        }
    }

    pub fn equals(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Eq, value)
    }

    pub fn not_equals(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::NotEq, value)
    }

    pub fn lt(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Lt, value)
    }

    pub fn gt(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Gt, value)
    }

    pub fn is_in(path: FieldPath, values: impl IntoIterator<Item = Value>) -> Self {
        Self::In {
            path,
            values: values.into_iter().collect(),
            negated: false,
        }
    }

    pub fn between(path: FieldPath, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::Between {
            path,
            low: low.into(),
            high: high.into(),
            negated: false,
        }
    }

    pub fn like(path: FieldPath, pattern: impl Into<String>) -> Self {
        Self::Like {
            path,
            pattern: pattern.into(),
            case_insensitive: false,
            negated: false,
        }
    }

    pub fn ilike(path: FieldPath, pattern: impl Into<String>) -> Self {
        Self::Like {
            path,
            pattern: pattern.into(),
            case_insensitive: true,
            negated: false,
        }
    }

    pub fn is_null(path: FieldPath) -> Self {
        Self::IsNull {
            path,
            negated: false,
        }
    }

    pub fn is_not_null(path: FieldPath) -> Self {
        Self::IsNull {
            path,
            negated: true,
        }
    }
}
