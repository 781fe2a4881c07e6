use bson::Bson;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

use super::rule::Rule;
use super::types::ColumnType;
use crate::utils::num::i64_to_i32;

/// A rule value, typed at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Time(DateTime<Utc>),
    Seq(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Nested rule held by a structural operator (filter_object / filter_array).
    Rule(Box<Rule>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Bool, number, string or time.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Time(_))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Rule(r) => Some(r),
            _ => None,
        }
    }

    /// Time values, or strings in one of the accepted datetime layouts.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Time(t) => Some(*t),
            Self::Str(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Whether a single (non-sequence) value satisfies a declared column type.
    #[must_use]
    pub fn matches_type(&self, typ: ColumnType) -> bool {
        match typ {
            ColumnType::String => matches!(self, Self::Str(_)),
            ColumnType::Numeric => self.is_numeric(),
            ColumnType::Boolean => matches!(self, Self::Bool(_)),
            ColumnType::Time => self.as_datetime().is_some(),
            ColumnType::Object => matches!(self, Self::Rule(_) | Self::Map(_)),
            ColumnType::Array => matches!(self, Self::Rule(_)),
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "numeric",
            Self::Str(_) => "string",
            Self::Time(_) => "time",
            Self::Seq(_) => "array",
            Self::Map(_) => "object",
            Self::Rule(_) => "rule",
        }
    }

    /// Converts to the BSON value used in compiled query documents.
    ///
    /// Integers are narrowed to Int32 when they fit; nested rules become their wire document.
    #[must_use]
    pub fn to_bson(&self) -> Bson {
        match self {
            Self::Null => Bson::Null,
            Self::Bool(b) => Bson::Boolean(*b),
            Self::Int(i) => i64_to_i32(*i).map_or(Bson::Int64(*i), Bson::Int32),
            Self::Float(f) => Bson::Double(*f),
            Self::Str(s) => Bson::String(s.clone()),
            Self::Time(t) => Bson::DateTime(bson::DateTime::from_millis(t.timestamp_millis())),
            Self::Seq(items) => Bson::Array(items.iter().map(Self::to_bson).collect()),
            Self::Map(map) => {
                let mut doc = bson::Document::new();
                for (k, v) in map {
                    doc.insert(k.clone(), v.to_bson());
                }
                Bson::Document(doc)
            }
            Self::Rule(rule) => Bson::Document(rule.to_bson_document()),
        }
    }

    /// Converts to the text (JSON) encoding. Times are written as extended JSON `$date`
    /// objects so they decode back to times.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Self::Null => J::Null,
            Self::Bool(b) => J::Bool(*b),
            Self::Int(i) => J::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(J::Null, J::Number),
            Self::Str(s) => J::String(s.clone()),
            Self::Time(t) => Bson::DateTime(bson::DateTime::from_millis(t.timestamp_millis())).into_relaxed_extjson(),
            Self::Seq(items) => J::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => J::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
            Self::Rule(rule) => rule.to_json_value(),
        }
    }
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339 into a UTC instant.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Time(t)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<Rule> for Value {
    fn from(rule: Rule) -> Self {
        Self::Rule(Box::new(rule))
    }
}
