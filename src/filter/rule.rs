use super::operator::{LogicOperator, Operator};
use super::types::RuleType;
use super::value::Value;

/// A node of a filter expression tree.
///
/// Trees are built fresh by the decoder (or by hand), validated once and compiled once.
/// A rule owns its children exclusively; nesting happens through combined rules and
/// through the value slot of structural operators.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Atom(AtomRule),
    Combined(CombinedRule),
}

/// Leaf predicate: one field, one operator, one value.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRule {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// A logical connective over an ordered list of child rules.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRule {
    pub condition: LogicOperator,
    pub rules: Vec<Rule>,
}

impl Rule {
    #[must_use]
    pub const fn kind(&self) -> RuleType {
        match self {
            Self::Atom(_) => RuleType::Atom,
            Self::Combined(_) => RuleType::Combined,
        }
    }

    /// Field paths referenced by this rule, in traversal order. Duplicates are kept.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        match self {
            Self::Atom(a) => a.fields(),
            Self::Combined(c) => c.fields(),
        }
    }
}

impl AtomRule {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self { field: field.into(), operator, value: value.into() }
    }

    /// Structural operators report their nested rule's paths prefixed with `field.`.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        if !self.operator.is_structural() {
            return vec![self.field.clone()];
        }
        let Some(sub) = self.value.as_rule() else {
            log::error!(
                "{} operator's value ({}) is not a rule type",
                self.operator,
                self.value.type_name()
            );
            return vec![self.field.clone()];
        };
        sub.fields().into_iter().map(|f| format!("{}.{f}", self.field)).collect()
    }
}

impl CombinedRule {
    #[must_use]
    pub const fn new(condition: LogicOperator, rules: Vec<Rule>) -> Self {
        Self { condition, rules }
    }

    #[must_use]
    pub fn and(rules: Vec<Rule>) -> Self {
        Self::new(LogicOperator::And, rules)
    }

    #[must_use]
    pub fn or(rules: Vec<Rule>) -> Self {
        Self::new(LogicOperator::Or, rules)
    }

    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.rules.iter().flat_map(Rule::fields).collect()
    }
}

impl From<AtomRule> for Rule {
    fn from(a: AtomRule) -> Self {
        Self::Atom(a)
    }
}

impl From<CombinedRule> for Rule {
    fn from(c: CombinedRule) -> Self {
        Self::Combined(c)
    }
}
