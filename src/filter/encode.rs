use bson::{Bson, Document};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;

use super::decode::RuleDecoder;
use super::rule::{AtomRule, CombinedRule, Rule};
use crate::errors::FilterError;

impl Rule {
    /// Text encoding: `{field, operator, value}` or `{condition, rules}`.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Atom(a) => a.to_json_value(),
            Self::Combined(c) => c.to_json_value(),
        }
    }

    /// # Errors
    /// Returns `Json` if serialization fails.
    pub fn to_json_string(&self) -> Result<String, FilterError> {
        Ok(serde_json::to_string(&self.to_json_value())?)
    }

    /// Binary-document encoding with the same shape as the text encoding.
    #[must_use]
    pub fn to_bson_document(&self) -> Document {
        match self {
            Self::Atom(a) => a.to_bson_document(),
            Self::Combined(c) => c.to_bson_document(),
        }
    }

    /// # Errors
    /// Returns `Bson` if the document cannot be written.
    pub fn to_bson_bytes(&self) -> Result<Vec<u8>, FilterError> {
        let mut buf = Vec::new();
        self.to_bson_document()
            .to_writer(&mut buf)
            .map_err(|e| FilterError::Bson(e.to_string()))?;
        Ok(buf)
    }
}

impl AtomRule {
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        json!({
            "field": self.field,
            "operator": self.operator.as_str(),
            "value": self.value.to_json(),
        })
    }

    #[must_use]
    pub fn to_bson_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("field", self.field.as_str());
        doc.insert("operator", self.operator.as_str());
        doc.insert("value", self.value.to_bson());
        doc
    }
}

impl CombinedRule {
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let rules: Vec<serde_json::Value> = self.rules.iter().map(Rule::to_json_value).collect();
        json!({ "condition": self.condition.as_str(), "rules": rules })
    }

    #[must_use]
    pub fn to_bson_document(&self) -> Document {
        let rules: Vec<Bson> = self.rules.iter().map(|r| Bson::Document(r.to_bson_document())).collect();
        let mut doc = Document::new();
        doc.insert("condition", self.condition.as_str());
        doc.insert("rules", rules);
        doc
    }
}

/// Encodes an optional rule; an absent rule is an explicit BSON null.
#[must_use]
pub fn encode_bson(rule: Option<&Rule>) -> Bson {
    rule.map_or(Bson::Null, |r| Bson::Document(r.to_bson_document()))
}

/// Encodes an optional rule; an absent rule is JSON `null`.
#[must_use]
pub fn encode_json(rule: Option<&Rule>) -> serde_json::Value {
    rule.map_or(serde_json::Value::Null, Rule::to_json_value)
}

// Serde goes through the text encoding so a Rule can sit inside request structs.
impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        RuleDecoder::default().from_json_value(raw).map_err(serde::de::Error::custom)
    }
}
