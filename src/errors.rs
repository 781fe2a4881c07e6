use thiserror::Error;

use crate::filter::ColumnType;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("field is empty")]
    EmptyField,

    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    #[error("rule value can not be null")]
    NilValue,

    #[error("rule field {0} is not declared in the expression option")]
    UndeclaredField(String),

    #[error("invalid {field}'s value, should be a {expected} value")]
    TypeMismatch { field: String, expected: ColumnType },

    #[error("invalid {field}'s value: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{operator} operator's value has too many elements, at most {limit}")]
    TooManyValues { operator: String, limit: usize },

    #[error("combined rules shouldn't be empty")]
    EmptyRules,

    #[error("rules elements number is overhead, it at most have {0} rules")]
    TooManyRules(usize),

    #[error("expression rules depth exceeds maximum")]
    DepthExceeded,

    #[error("invalid expression, no field is found to query")]
    NoQueryableField,

    #[error("expression rules field({0}) is not supported")]
    UnknownFieldInPolicy(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("rule nesting exceeds the decode depth limit of {0}")]
    DecodeDepthExceeded(usize),

    #[error("parent is empty")]
    InvalidParentContext,

    #[error("filter array index {0} is invalid")]
    InvalidArrayIndex(String),

    #[error("parent type {0} is invalid")]
    UnsupportedParentType(ColumnType),

    #[error("unexpected condition {0}")]
    UnsupportedCondition(String),

    // child text is carried in the message, not in `source()`
    #[error("rules[{index}] is invalid, {cause}")]
    Rule { index: usize, cause: Box<FilterError> },

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl FilterError {
    /// Tags this error with the position of the child rule it came from.
    #[must_use]
    pub fn at_rule(self, index: usize) -> Self {
        Self::Rule { index, cause: Box::new(self) }
    }

    /// Strips every positional wrapper and returns the failure that started it.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut cur = self;
        while let Self::Rule { cause, .. } = cur {
            cur = cause;
        }
        cur
    }

    /// Child positions from the outermost combined rule down to the failing one.
    #[must_use]
    pub fn rule_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cur = self;
        while let Self::Rule { index, cause } = cur {
            path.push(*index);
            cur = cause;
        }
        path
    }
}

impl From<std::io::Error> for FilterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
