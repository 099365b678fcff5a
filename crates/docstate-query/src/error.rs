use thiserror::Error;

/// Errors raised while preparing a query, before any state is scanned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid field path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid LIKE pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("operator {operator} expects {expected}")]
    InvalidOperand {
        operator: &'static str,
        expected: &'static str,
    },
}

/// Result alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
