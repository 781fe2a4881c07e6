//! Operator and logic catalogs: per-operator value contracts and compilation to query documents.

use bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::{AND_KEY, ColumnType, ExprOption, OR_KEY, RuleOption};
use super::value::Value;
use crate::errors::FilterError;
use crate::utils::num::f64_to_i64_exact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equal,
    NotEqual,
    In,
    NotIn,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    DatetimeLess,
    DatetimeLessOrEqual,
    DatetimeGreater,
    DatetimeGreaterOrEqual,
    BeginsWith,
    NotBeginsWith,
    Contains,
    NotContains,
    EndsWith,
    NotEndsWith,
    Exist,
    Size,
    FilterObject,
    FilterArray,
}

impl Operator {
    pub const ALL: [Self; 22] = [
        Self::Equal,
        Self::NotEqual,
        Self::In,
        Self::NotIn,
        Self::Less,
        Self::LessOrEqual,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::DatetimeLess,
        Self::DatetimeLessOrEqual,
        Self::DatetimeGreater,
        Self::DatetimeGreaterOrEqual,
        Self::BeginsWith,
        Self::NotBeginsWith,
        Self::Contains,
        Self::NotContains,
        Self::EndsWith,
        Self::NotEndsWith,
        Self::Exist,
        Self::Size,
        Self::FilterObject,
        Self::FilterArray,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Less => "less",
            Self::LessOrEqual => "less_or_equal",
            Self::Greater => "greater",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::DatetimeLess => "datetime_less",
            Self::DatetimeLessOrEqual => "datetime_less_or_equal",
            Self::DatetimeGreater => "datetime_greater",
            Self::DatetimeGreaterOrEqual => "datetime_greater_or_equal",
            Self::BeginsWith => "begins_with",
            Self::NotBeginsWith => "not_begins_with",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::EndsWith => "ends_with",
            Self::NotEndsWith => "not_ends_with",
            Self::Exist => "exist",
            Self::Size => "size",
            Self::FilterObject => "filter_object",
            Self::FilterArray => "filter_array",
        }
    }

    /// Operators whose value is a nested rule instead of a scalar.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::FilterObject | Self::FilterArray)
    }

    /// Parent type the nested rule of a structural operator is compiled under.
    #[must_use]
    pub const fn parent_type(self) -> Option<ColumnType> {
        match self {
            Self::FilterObject => Some(ColumnType::Object),
            Self::FilterArray => Some(ColumnType::Array),
            _ => None,
        }
    }

    const fn comparison_key(self) -> Option<&'static str> {
        match self {
            Self::Equal => Some("$eq"),
            Self::NotEqual => Some("$ne"),
            Self::Less | Self::DatetimeLess => Some("$lt"),
            Self::LessOrEqual | Self::DatetimeLessOrEqual => Some("$lte"),
            Self::Greater | Self::DatetimeGreater => Some("$gt"),
            Self::GreaterOrEqual | Self::DatetimeGreaterOrEqual => Some("$gte"),
            _ => None,
        }
    }

    /// Checks the operator-specific shape of `value`. The field name only labels errors.
    ///
    /// # Errors
    /// Returns `InvalidValue` for a value of the wrong shape and `TooManyValues` when an
    /// `in`/`not_in` list exceeds the policy limit.
    pub fn validate_value(self, field: &str, value: &Value, opt: &ExprOption) -> Result<(), FilterError> {
        let invalid = |reason: &str| FilterError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} operator's value {reason}", self.as_str()),
        };
        match self {
            Self::Equal | Self::NotEqual => {
                if !value.is_scalar() {
                    return Err(invalid("should be a basic type"));
                }
            }
            Self::In | Self::NotIn => {
                let Value::Seq(items) = value else {
                    return Err(invalid("should be an array"));
                };
                if items.is_empty() {
                    return Err(invalid("can not be empty"));
                }
                let limit = if self == Self::In {
                    opt.effective_max_in_limit()
                } else {
                    opt.effective_max_not_in_limit()
                };
                if items.len() > limit {
                    return Err(FilterError::TooManyValues { operator: self.as_str().to_string(), limit });
                }
                if items.iter().any(|v| !v.is_scalar()) {
                    return Err(invalid("elements should be basic types"));
                }
            }
            Self::Less | Self::LessOrEqual | Self::Greater | Self::GreaterOrEqual => {
                if !value.is_numeric() {
                    return Err(invalid("should be a numeric"));
                }
            }
            Self::DatetimeLess
            | Self::DatetimeLessOrEqual
            | Self::DatetimeGreater
            | Self::DatetimeGreaterOrEqual => {
                if value.as_datetime().is_none() {
                    return Err(invalid("should be a datetime"));
                }
            }
            Self::BeginsWith
            | Self::NotBeginsWith
            | Self::Contains
            | Self::NotContains
            | Self::EndsWith
            | Self::NotEndsWith => match value.as_str() {
                Some(s) if !s.is_empty() => {}
                _ => return Err(invalid("should be a non-empty string")),
            },
            Self::Exist => {
                if !matches!(value, Value::Bool(_)) {
                    return Err(invalid("should be a boolean"));
                }
            }
            Self::Size => {
                if size_operand(value).is_none() {
                    return Err(invalid("should be a non-negative integer"));
                }
            }
            Self::FilterObject | Self::FilterArray => {
                if value.as_rule().is_none() {
                    return Err(invalid("should be a rule"));
                }
            }
        }
        Ok(())
    }

    /// Compiles `field <op> value` into a query-document fragment.
    ///
    /// # Errors
    /// Returns `InvalidValue` when the value cannot be expressed for this operator, or the
    /// nested rule's compile error for structural operators.
    pub fn compile(self, field: &str, value: &Value) -> Result<Document, FilterError> {
        let invalid = |reason: &str| FilterError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} operator's value {reason}", self.as_str()),
        };
        let cond: Bson = match self {
            Self::Equal | Self::NotEqual | Self::Less | Self::LessOrEqual | Self::Greater | Self::GreaterOrEqual => {
                let key = self.comparison_key().unwrap_or("$eq");
                Bson::Document(doc! { key: value.to_bson() })
            }
            Self::DatetimeLess
            | Self::DatetimeLessOrEqual
            | Self::DatetimeGreater
            | Self::DatetimeGreaterOrEqual => {
                let at = value.as_datetime().ok_or_else(|| invalid("should be a datetime"))?;
                let key = self.comparison_key().unwrap_or("$eq");
                Bson::Document(doc! { key: Value::Time(at).to_bson() })
            }
            Self::In | Self::NotIn => {
                if !matches!(value, Value::Seq(_)) {
                    return Err(invalid("should be an array"));
                }
                let key = if self == Self::In { "$in" } else { "$nin" };
                Bson::Document(doc! { key: value.to_bson() })
            }
            Self::BeginsWith | Self::NotBeginsWith => {
                let s = value.as_str().ok_or_else(|| invalid("should be a string"))?;
                negate(self == Self::NotBeginsWith, doc! { "$regex": format!("^{}", regex::escape(s)) })
            }
            Self::EndsWith | Self::NotEndsWith => {
                let s = value.as_str().ok_or_else(|| invalid("should be a string"))?;
                negate(self == Self::NotEndsWith, doc! { "$regex": format!("{}$", regex::escape(s)) })
            }
            Self::Contains | Self::NotContains => {
                let s = value.as_str().ok_or_else(|| invalid("should be a string"))?;
                negate(self == Self::NotContains, doc! { "$regex": regex::escape(s), "$options": "i" })
            }
            Self::Exist => match value {
                Value::Bool(b) => Bson::Document(doc! { "$exists": *b }),
                _ => return Err(invalid("should be a boolean")),
            },
            Self::Size => {
                let n = size_operand(value).ok_or_else(|| invalid("should be a non-negative integer"))?;
                Bson::Document(doc! { "$size": Value::Int(n).to_bson() })
            }
            Self::FilterObject | Self::FilterArray => {
                let rule = value.as_rule().ok_or_else(|| invalid("should be a rule"))?;
                let parent_type = self.parent_type().unwrap_or(ColumnType::Object);
                return rule.compile(Some(&RuleOption::new(field, parent_type)));
            }
        };
        let mut out = Document::new();
        out.insert(field, cond);
        Ok(out)
    }
}

fn negate(not: bool, cond: Document) -> Bson {
    if not { Bson::Document(doc! { "$not": cond }) } else { Bson::Document(cond) }
}

fn size_operand(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) if *n >= 0 => Some(*n),
        Value::Float(f) => f64_to_i64_exact(*f).filter(|n| *n >= 0),
        _ => None,
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FilterError::InvalidOperator(s.to_string()))
    }
}

/// Logical connective of a combined rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Key the compiled fragments are grouped under.
    #[must_use]
    pub const fn query_key(self) -> &'static str {
        match self {
            Self::And => AND_KEY,
            Self::Or => OR_KEY,
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(FilterError::UnsupportedCondition(other.to_string())),
        }
    }
}
