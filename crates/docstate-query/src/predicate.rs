use std::cmp::Ordering;

use docstate_types::{State, Value};
use regex::{Regex, RegexBuilder};

use crate::compare::{compare_scalars, scalars_equal};
use crate::error::{QueryError, QueryResult};
use crate::expr::{CompareOp, Expression};
use crate::path::FieldPath;

/// An [`Expression`] validated and prepared for repeated evaluation.
///
/// Compilation checks literal operands and turns LIKE patterns into regular
/// expressions once, so that a full scan only pays for matching.
#[derive(Debug)]
pub enum Predicate {
    All,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare {
        path: FieldPath,
        op: CompareOp,
        value: Value,
    },
    In {
        path: FieldPath,
        values: Vec<Value>,
    },
    Between {
        path: FieldPath,
        low: Value,
        high: Value,
    },
    Like {
        path: FieldPath,
        regex: Regex,
    },
    IsNull {
        path: FieldPath,
    },
}

impl Predicate {
    pub fn compile(expression: &Expression) -> QueryResult<Self> {
        let negate_if = |negated: bool, p: Predicate| {
            if negated {
                Predicate::Not(Box::new(p))
            } else {
                p
            }
        };
        Ok(match expression {
            Expression::All => Self::All,
            Expression::And(children) => Self::And(
                children
                    .iter()
                    .map(Self::compile)
                    .collect::<QueryResult<_>>()?,
            ),
            Expression::Or(children) => Self::Or(
                children
                    .iter()
                    .map(Self::compile)
                    .collect::<QueryResult<_>>()?,
            ),
            Expression::Not(inner) => Self::Not(Box::new(Self::compile(inner)?)),
            Expression::Compare { path, op, value } => {
                require_scalar(op.symbol(), value)?;
                match op {
                    CompareOp::NotEq => Self::Not(Box::new(Self::Compare {
                        path: path.clone(),
                        op: CompareOp::Eq,
                        value: value.clone(),
                    })),
                    _ => Self::Compare {
                        path: path.clone(),
                        op: *op,
                        value: value.clone(),
                    },
                }
            }
            Expression::In {
                path,
                values,
                negated,
            } => {
                for value in values {
                    require_scalar("IN", value)?;
                }
                negate_if(
                    *negated,
                    Self::In {
                        path: path.clone(),
                        values: values.clone(),
                    },
                )
            }
            Expression::Between {
                path,
                low,
                high,
                negated,
            } => {
                require_scalar("BETWEEN", low)?;
                require_scalar("BETWEEN", high)?;
                negate_if(
                    *negated,
                    Self::Between {
                        path: path.clone(),
                        low: low.clone(),
                        high: high.clone(),
                    },
                )
            }
            Expression::Like {
                path,
                pattern,
                case_insensitive,
                negated,
            } => negate_if(
                *negated,
                Self::Like {
                    path: path.clone(),
                    regex: like_to_regex(pattern, *case_insensitive)?,
                },
            ),
            Expression::IsNull { path, negated } => {
                negate_if(*negated, Self::IsNull { path: path.clone() })
            }
        })
    }

    /// Evaluate against one state's fields.
    pub fn matches(&self, state: &State) -> bool {
        match self {
            Self::All => true,
            Self::And(children) => children.iter().all(|c| c.matches(state)),
            Self::Or(children) => children.iter().any(|c| c.matches(state)),
            Self::Not(inner) => !inner.matches(state),
            Self::Compare { path, op, value } => path.resolve(state).into_iter().any(|v| {
                compare_scalars(v, value).is_some_and(|ord| match op {
                    CompareOp::Eq | CompareOp::NotEq => ord == Ordering::Equal,
                    CompareOp::Lt => ord == Ordering::Less,
                    CompareOp::LtEq => ord != Ordering::Greater,
                    CompareOp::Gt => ord == Ordering::Greater,
                    CompareOp::GtEq => ord != Ordering::Less,
                })
            }),
            Self::In { path, values } => path
                .resolve(state)
                .into_iter()
                .any(|v| values.iter().any(|candidate| scalars_equal(v, candidate))),
            Self::Between { path, low, high } => path.resolve(state).into_iter().any(|v| {
                matches!(compare_scalars(v, low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(compare_scalars(v, high), Some(Ordering::Less | Ordering::Equal))
            }),
            Self::Like { path, regex } => path
                .resolve(state)
                .into_iter()
                .filter_map(Value::as_str)
                .any(|s| regex.is_match(s)),
            Self::IsNull { path } => path.resolve(state).is_empty(),
        }
    }
}

fn require_scalar(operator: &'static str, value: &Value) -> QueryResult<()> {
    if value.is_scalar() {
        Ok(())
    } else {
        Err(QueryError::InvalidOperand {
            operator,
            expected: "a scalar literal",
        })
    }
}

/// Translate a LIKE pattern into an anchored regular expression.
fn like_to_regex(pattern: &str, case_insensitive: bool) -> QueryResult<Regex> {
    let invalid = |reason: String| QueryError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => source.push_str(&regex::escape(&escaped.to_string())),
                None => return Err(invalid("trailing escape character".into())),
            },
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    RegexBuilder::new(&source)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| invalid(e.to_string()))
}
