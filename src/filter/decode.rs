//! Reconstruction of rule trees from the text (JSON) and binary (BSON) encodings.
//!
//! The wire shape carries no type tag: an object holding both `condition` and `rules`
//! is a combined rule, anything else is read as an atom rule. The value of an atom is
//! decoded according to its operator, so the operator tag is resolved first.

use bson::Document;
use bson::raw::{RawBsonRef, RawDocument};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::operator::{LogicOperator, Operator};
use super::rule::{AtomRule, CombinedRule, Rule};
use super::types::DEFAULT_MAX_DECODE_DEPTH;
use super::value::Value;
use crate::errors::FilterError;
use crate::utils::num::u64_to_f64_lossy;

#[derive(Debug, Deserialize)]
struct JsonAtomBroker {
    field: String,
    operator: String,
    #[serde(default)]
    value: JsonValue,
}

#[derive(Debug, Deserialize)]
struct JsonCombinedBroker {
    condition: String,
    rules: Vec<JsonValue>,
}

/// Decoder with an explicit recursion ceiling, checked before any validation runs.
///
/// Rule nesting (combined children and structural operator values) and value nesting
/// (arrays / objects inside a value) are each limited to `max_depth` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDecoder {
    max_depth: usize,
}

impl Default for RuleDecoder {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DECODE_DEPTH }
    }
}

impl RuleDecoder {
    /// A zero depth falls back to the default ceiling.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth: if max_depth == 0 { DEFAULT_MAX_DECODE_DEPTH } else { max_depth } }
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// # Errors
    /// Returns an error on malformed JSON, an unknown operator or condition, a value that does
    /// not fit its operator, or nesting beyond the depth ceiling.
    pub fn from_json_str(&self, raw: &str) -> Result<Rule, FilterError> {
        let raw: JsonValue = serde_json::from_str(raw)?;
        self.from_json_value(raw)
    }

    /// # Errors
    /// See [`RuleDecoder::from_json_str`].
    pub fn from_json_slice(&self, raw: &[u8]) -> Result<Rule, FilterError> {
        let raw: JsonValue = serde_json::from_slice(raw)?;
        self.from_json_value(raw)
    }

    /// # Errors
    /// See [`RuleDecoder::from_json_str`].
    pub fn from_json_value(&self, raw: JsonValue) -> Result<Rule, FilterError> {
        self.json_rule(raw, 1)
    }

    /// # Errors
    /// Returns `Bson` when the bytes are not a BSON document, otherwise see
    /// [`RuleDecoder::from_json_str`].
    pub fn from_bson_slice(&self, raw: &[u8]) -> Result<Rule, FilterError> {
        let doc = RawDocument::from_bytes(raw).map_err(bson_err)?;
        self.bson_rule(doc, 1)
    }

    /// # Errors
    /// Returns `Bson` if the document cannot be serialized, otherwise see
    /// [`RuleDecoder::from_json_str`].
    pub fn from_bson_document(&self, raw: &Document) -> Result<Rule, FilterError> {
        let bytes = raw.to_vec().map_err(bson_err)?;
        self.from_bson_slice(&bytes)
    }

    fn enter(&self, depth: usize) -> Result<(), FilterError> {
        if depth > self.max_depth {
            log::warn!("rule decode stopped at depth {depth}, limit is {}", self.max_depth);
            return Err(FilterError::DecodeDepthExceeded(self.max_depth));
        }
        Ok(())
    }

    fn json_rule(&self, raw: JsonValue, depth: usize) -> Result<Rule, FilterError> {
        self.enter(depth)?;
        let map = match raw {
            JsonValue::Object(map) => map,
            other => {
                return Err(FilterError::Decode(format!("rule should be an object, got {}", json_kind(&other))));
            }
        };

        if map.contains_key("condition") && map.contains_key("rules") {
            let broker: JsonCombinedBroker = serde_json::from_value(JsonValue::Object(map))?;
            let condition: LogicOperator = broker.condition.parse()?;
            let rules = broker
                .rules
                .into_iter()
                .enumerate()
                .map(|(index, raw)| self.json_rule(raw, depth + 1).map_err(|e| e.at_rule(index)))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(CombinedRule::new(condition, rules).into());
        }

        let broker: JsonAtomBroker = serde_json::from_value(JsonValue::Object(map))?;
        let operator: Operator = broker.operator.parse()?;
        let value = match (operator, broker.value) {
            (_, JsonValue::Null) => Value::Null,
            (Operator::In | Operator::NotIn, JsonValue::Array(items)) => Value::Seq(
                items.into_iter().map(|v| self.json_value(v, 1)).collect::<Result<_, _>>()?,
            ),
            (Operator::In | Operator::NotIn, _) => {
                return Err(FilterError::Decode(format!("{operator} operator's value should be an array")));
            }
            (Operator::FilterObject | Operator::FilterArray, raw) => {
                Value::Rule(Box::new(self.json_rule(raw, depth + 1)?))
            }
            (_, raw) => self.json_value(raw, 1)?,
        };
        Ok(AtomRule { field: broker.field, operator, value }.into())
    }

    fn json_value(&self, raw: JsonValue, depth: usize) -> Result<Value, FilterError> {
        self.enter(depth)?;
        Ok(match raw {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Float(u64_to_f64_lossy(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::Str(s),
            JsonValue::Array(items) => Value::Seq(
                items.into_iter().map(|v| self.json_value(v, depth + 1)).collect::<Result<_, _>>()?,
            ),
            JsonValue::Object(map) if map.len() == 1 && map.contains_key("$date") => {
                match bson::Bson::try_from(JsonValue::Object(map)).map_err(bson_err)? {
                    bson::Bson::DateTime(dt) => time_from_bson(dt)?,
                    other => {
                        return Err(FilterError::Decode(format!("$date should hold a datetime, got {other}")));
                    }
                }
            }
            JsonValue::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| Ok((k, self.json_value(v, depth + 1)?)))
                    .collect::<Result<_, FilterError>>()?,
            ),
        })
    }

    fn bson_rule(&self, raw: &RawDocument, depth: usize) -> Result<Rule, FilterError> {
        self.enter(depth)?;

        let rules = raw.get("rules").map_err(bson_err)?;
        if let Some(rules) = rules
            && raw.get("condition").map_err(bson_err)?.is_some()
        {
            let condition: LogicOperator = bson_str(raw, "condition")?.parse()?;
            let RawBsonRef::Array(items) = rules else {
                return Err(FilterError::Decode("rules should be an array".into()));
            };
            let rules = items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    match item.map_err(bson_err)? {
                        RawBsonRef::Document(doc) => self.bson_rule(doc, depth + 1),
                        other => Err(FilterError::Decode(format!(
                            "rule should be a document, got {:?}",
                            other.element_type()
                        ))),
                    }
                    .map_err(|e| e.at_rule(index))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(CombinedRule::new(condition, rules).into());
        }

        let field = bson_str(raw, "field")?.to_string();
        let operator: Operator = bson_str(raw, "operator")?.parse()?;
        let value = match (operator, raw.get("value").map_err(bson_err)?.unwrap_or(RawBsonRef::Null)) {
            (_, RawBsonRef::Null) => Value::Null,
            (Operator::In | Operator::NotIn, RawBsonRef::Array(items)) => Value::Seq(
                items
                    .into_iter()
                    .map(|v| self.bson_value(v.map_err(bson_err)?, 1))
                    .collect::<Result<_, _>>()?,
            ),
            (Operator::In | Operator::NotIn, _) => {
                return Err(FilterError::Decode(format!("{operator} operator's value should be an array")));
            }
            (Operator::FilterObject | Operator::FilterArray, RawBsonRef::Document(doc)) => {
                Value::Rule(Box::new(self.bson_rule(doc, depth + 1)?))
            }
            (Operator::FilterObject | Operator::FilterArray, _) => {
                return Err(FilterError::Decode(format!("{operator} operator's value should be a document")));
            }
            (_, raw) => self.bson_value(raw, 1)?,
        };
        Ok(AtomRule { field, operator, value }.into())
    }

    // Nested documents are read one level per call, so the ceiling trips before the
    // remaining bytes are looked at.
    fn bson_value(&self, raw: RawBsonRef<'_>, depth: usize) -> Result<Value, FilterError> {
        self.enter(depth)?;
        Ok(match raw {
            RawBsonRef::Null | RawBsonRef::Undefined => Value::Null,
            RawBsonRef::Boolean(b) => Value::Bool(b),
            RawBsonRef::Int32(i) => Value::Int(i64::from(i)),
            RawBsonRef::Int64(i) => Value::Int(i),
            RawBsonRef::Double(f) => Value::Float(f),
            RawBsonRef::Decimal128(d) => d
                .to_string()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| FilterError::Decode(format!("decimal {d} is not representable")))?,
            RawBsonRef::String(s) => Value::Str(s.to_string()),
            RawBsonRef::DateTime(dt) => time_from_bson(dt)?,
            RawBsonRef::Array(items) => Value::Seq(
                items
                    .into_iter()
                    .map(|v| self.bson_value(v.map_err(bson_err)?, depth + 1))
                    .collect::<Result<_, _>>()?,
            ),
            RawBsonRef::Document(doc) => Value::Map(
                doc.into_iter()
                    .map(|item| {
                        let (k, v) = item.map_err(bson_err)?;
                        Ok((k.as_str().to_string(), self.bson_value(v, depth + 1)?))
                    })
                    .collect::<Result<_, FilterError>>()?,
            ),
            other => {
                return Err(FilterError::Decode(format!(
                    "unsupported bson value type {:?}",
                    other.element_type()
                )));
            }
        })
    }
}

fn time_from_bson(dt: bson::DateTime) -> Result<Value, FilterError> {
    chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
        .map(Value::Time)
        .ok_or_else(|| FilterError::Decode(format!("datetime {dt} is out of range")))
}

fn bson_err(e: impl std::fmt::Display) -> FilterError {
    FilterError::Bson(e.to_string())
}

fn bson_str<'a>(doc: &'a RawDocument, key: &str) -> Result<&'a str, FilterError> {
    match doc.get(key).map_err(bson_err)? {
        Some(RawBsonRef::String(s)) => Ok(s),
        Some(other) => Err(FilterError::Decode(format!("{key} should be a string, got {:?}", other.element_type()))),
        None => Err(FilterError::Decode(format!("missing field `{key}`"))),
    }
}

const fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Decodes a JSON rule with the default depth ceiling.
///
/// # Errors
/// See [`RuleDecoder::from_json_str`].
pub fn parse_rule_json(raw: &str) -> Result<Rule, FilterError> {
    RuleDecoder::default().from_json_str(raw)
}

/// Decodes a BSON rule with the default depth ceiling.
///
/// # Errors
/// See [`RuleDecoder::from_bson_slice`].
pub fn parse_rule_bson(raw: &[u8]) -> Result<Rule, FilterError> {
    RuleDecoder::default().from_bson_slice(raw)
}
