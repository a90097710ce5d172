//! Error types for filterql-core.
//!
//! Every translation failure is synchronous and final: it describes a mistake in
//! the query text (or in the values bound to it), never a transient fault.

use std::fmt;

use thiserror::Error;

/// Where in the query a failure was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Unparsed input starting at the offending token
    pub remainder: String,
    /// The complete query being translated
    pub query: String,
}

impl Position {
    pub fn new(remainder: &str, query: &str) -> Self {
        Self {
            remainder: remainder.to_string(),
            query: query.to_string(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at '{}', in '{}'", self.remainder, self.query)
    }
}

/// Query translation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Missing space after {after} {at}")]
    MissingSpace { after: &'static str, at: Position },

    #[error("Unsupported operator {at}")]
    UnsupportedOperator { at: Position },

    #[error("Unsupported operator after {after} {at}")]
    UnsupportedQualifier { after: &'static str, at: Position },

    #[error("Unsupported parameter number {at}")]
    MalformedParameter { at: Position },

    #[error("Missing parameter number {index} ({available} supplied) {at}")]
    ParameterOutOfRange {
        index: usize,
        available: usize,
        at: Position,
    },

    #[error("Unterminated string value {at}")]
    UnterminatedString { at: Position },

    #[error("Unsupported number value {at}")]
    MalformedNumber { at: Position },

    #[error("Unbalanced brackets {at}")]
    UnbalancedParentheses { at: Position },

    #[error("Brackets needed to mix AND and OR operators {at}")]
    MixedLogic { at: Position },

    #[error("Missing logical operator {at}")]
    MissingLogic { at: Position },

    #[error("Expected a condition {at}")]
    ExpectedCondition { at: Position },

    #[error("Brackets nested deeper than {limit} levels {at}")]
    NestingTooDeep { limit: usize, at: Position },

    #[error("Not enough values for the keys provided: {keys} keys, {values} values")]
    InsufficientValues { keys: usize, values: usize },

    #[error("Malformed key list '{input}': {reason}")]
    MalformedKeyList { input: String, reason: &'static str },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Discriminant of [`QueryError`], for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    MissingSpace,
    UnsupportedOperator,
    UnsupportedQualifier,
    MalformedParameter,
    ParameterOutOfRange,
    UnterminatedString,
    MalformedNumber,
    UnbalancedParentheses,
    MixedLogic,
    MissingLogic,
    ExpectedCondition,
    NestingTooDeep,
    InsufficientValues,
    MalformedKeyList,
    InvalidPattern,
}

impl QueryError {
    pub fn kind(&self) -> QueryErrorKind {
        match self {
            QueryError::MissingSpace { .. } => QueryErrorKind::MissingSpace,
            QueryError::UnsupportedOperator { .. } => QueryErrorKind::UnsupportedOperator,
            QueryError::UnsupportedQualifier { .. } => QueryErrorKind::UnsupportedQualifier,
            QueryError::MalformedParameter { .. } => QueryErrorKind::MalformedParameter,
            QueryError::ParameterOutOfRange { .. } => QueryErrorKind::ParameterOutOfRange,
            QueryError::UnterminatedString { .. } => QueryErrorKind::UnterminatedString,
            QueryError::MalformedNumber { .. } => QueryErrorKind::MalformedNumber,
            QueryError::UnbalancedParentheses { .. } => QueryErrorKind::UnbalancedParentheses,
            QueryError::MixedLogic { .. } => QueryErrorKind::MixedLogic,
            QueryError::MissingLogic { .. } => QueryErrorKind::MissingLogic,
            QueryError::ExpectedCondition { .. } => QueryErrorKind::ExpectedCondition,
            QueryError::NestingTooDeep { .. } => QueryErrorKind::NestingTooDeep,
            QueryError::InsufficientValues { .. } => QueryErrorKind::InsufficientValues,
            QueryError::MalformedKeyList { .. } => QueryErrorKind::MalformedKeyList,
            QueryError::InvalidPattern { .. } => QueryErrorKind::InvalidPattern,
        }
    }

    /// Location of the failure, for errors raised while scanning a query.
    pub fn position(&self) -> Option<&Position> {
        match self {
            QueryError::MissingSpace { at, .. }
            | QueryError::UnsupportedOperator { at }
            | QueryError::UnsupportedQualifier { at, .. }
            | QueryError::MalformedParameter { at }
            | QueryError::ParameterOutOfRange { at, .. }
            | QueryError::UnterminatedString { at }
            | QueryError::MalformedNumber { at }
            | QueryError::UnbalancedParentheses { at }
            | QueryError::MixedLogic { at }
            | QueryError::MissingLogic { at }
            | QueryError::ExpectedCondition { at }
            | QueryError::NestingTooDeep { at, .. } => Some(at),
            QueryError::InsufficientValues { .. }
            | QueryError::MalformedKeyList { .. }
            | QueryError::InvalidPattern { .. } => None,
        }
    }
}

/// Result type for query translation
pub type QueryResult<T> = Result<T, QueryError>;

impl serde::Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
