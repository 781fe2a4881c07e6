use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::FilterError;

// Policy defaults applied when an ExprOption leaves a limit at zero
pub const DEFAULT_MAX_RULES_LIMIT: usize = 20;
pub const DEFAULT_MAX_IN_LIMIT: usize = 500;
pub const DEFAULT_MAX_NOT_IN_LIMIT: usize = 500;
pub const DEFAULT_MAX_DECODE_DEPTH: usize = 32;

/// Field name that addresses "any element" of an array parent.
pub const FILTER_ARRAY_ELEMENT: &str = "element";

/// Connective keys of the compiled query document.
pub const AND_KEY: &str = "$and";
pub const OR_KEY: &str = "$or";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleType {
    #[serde(rename = "AtomRule")]
    Atom,
    #[serde(rename = "CombinedRule")]
    Combined,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom => f.write_str("AtomRule"),
            Self::Combined => f.write_str("CombinedRule"),
        }
    }
}

/// Declared semantic type of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Numeric,
    Boolean,
    Time,
    Object,
    Array,
}

impl ColumnType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Time => "time",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ColumnType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "numeric" => Ok(Self::Numeric),
            "boolean" => Ok(Self::Boolean),
            "time" => Ok(Self::Time),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            other => Err(FilterError::Config(format!("unknown column type: {other}"))),
        }
    }
}

/// Validation policy. Zero limits and an empty field map mean "unrestricted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExprOption {
    pub rule_fields: BTreeMap<String, ColumnType>,
    pub max_rules_limit: usize,
    pub max_rules_depth: usize,
    pub max_in_limit: usize,
    pub max_not_in_limit: usize,
}

impl ExprOption {
    #[must_use]
    pub fn with_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, ColumnType)>,
        K: Into<String>,
    {
        Self {
            rule_fields: fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn effective_max_rules_limit(&self) -> usize {
        if self.max_rules_limit > 0 { self.max_rules_limit } else { DEFAULT_MAX_RULES_LIMIT }
    }

    #[must_use]
    pub const fn effective_max_in_limit(&self) -> usize {
        if self.max_in_limit > 0 { self.max_in_limit } else { DEFAULT_MAX_IN_LIMIT }
    }

    #[must_use]
    pub const fn effective_max_not_in_limit(&self) -> usize {
        if self.max_not_in_limit > 0 { self.max_not_in_limit } else { DEFAULT_MAX_NOT_IN_LIMIT }
    }

    /// Options for the next nesting level: same policy, one less depth.
    ///
    /// # Errors
    /// Returns `DepthExceeded` when the depth budget is already used up at this level.
    pub fn descend(&self) -> Result<Self, FilterError> {
        let max_rules_depth = match self.max_rules_depth {
            0 => 0,
            1 => return Err(FilterError::DepthExceeded),
            n => n - 1,
        };
        Ok(Self { max_rules_depth, ..self.clone() })
    }

    /// Options for a rule nested under `parent` by a structural operator.
    ///
    /// Declared paths below `parent` are re-rooted (`addr.city` becomes `city`)
    /// and one depth level is consumed.
    ///
    /// # Errors
    /// Returns `DepthExceeded` when the depth budget is already used up.
    pub fn nested(&self, parent: &str) -> Result<Self, FilterError> {
        let mut child = self.descend()?;
        child.rule_fields = self
            .rule_fields
            .iter()
            .filter_map(|(path, typ)| {
                path.strip_prefix(parent)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), *typ))
            })
            .collect();
        Ok(child)
    }
}

/// Path context for compiling a rule nested inside an object or array field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOption {
    pub parent: String,
    pub parent_type: ColumnType,
}

impl RuleOption {
    #[must_use]
    pub fn new(parent: impl Into<String>, parent_type: ColumnType) -> Self {
        Self { parent: parent.into(), parent_type }
    }
}
