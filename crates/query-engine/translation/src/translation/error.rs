//! Errors for query translation.

use thiserror::Error;

/// A type for translation errors. All of these are the requester's fault and
/// are reported as a bad request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("clause '{clause}' is required for {operation}")]
    MissingRequiredClause {
        clause: &'static str,
        operation: &'static str,
    },

    #[error("value '{value}' for clause '{clause}' is not a non-negative integer")]
    InvalidClauseNumber { clause: &'static str, value: String },

    #[error("value expression '{0}' is missing '='")]
    MalformedValueExpression(String),

    #[error("filter expression '{0}' does not match the operator grammar")]
    UnparsableFilter(String),

    #[error("aggregate function '{0}' is not supported")]
    UnsupportedAggregateFunction(String),
}
