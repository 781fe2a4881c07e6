use bson::{Bson, Document};

use super::rule::{AtomRule, CombinedRule, Rule};
use super::types::{ColumnType, FILTER_ARRAY_ELEMENT, RuleOption};
use crate::errors::FilterError;

impl Rule {
    /// Compiles the tree into a query document. `opt` carries the parent path when this
    /// rule sits inside an object or array field.
    ///
    /// # Errors
    /// Returns the first compile failure; failures below a combined rule carry the child index.
    pub fn compile(&self, opt: Option<&RuleOption>) -> Result<Document, FilterError> {
        match self {
            Self::Atom(a) => a.compile(opt),
            Self::Combined(c) => c.compile(opt),
        }
    }
}

impl AtomRule {
    /// # Errors
    /// See [`Rule::compile`].
    pub fn compile(&self, opt: Option<&RuleOption>) -> Result<Document, FilterError> {
        let Some(opt) = opt else {
            return self.operator.compile(&self.field, &self.value);
        };
        if opt.parent.is_empty() {
            return Err(FilterError::InvalidParentContext);
        }

        match opt.parent_type {
            ColumnType::Object => {
                self.operator.compile(&format!("{}.{}", opt.parent, self.field), &self.value)
            }
            ColumnType::Array if self.field == FILTER_ARRAY_ELEMENT => {
                // any element matching is enough
                self.operator.compile(&opt.parent, &self.value)
            }
            ColumnType::Array => {
                match self.field.parse::<i64>() {
                    Ok(index) if index > 0 => {}
                    _ => return Err(FilterError::InvalidArrayIndex(self.field.clone())),
                }
                self.operator.compile(&format!("{}.{}", opt.parent, self.field), &self.value)
            }
            other => Err(FilterError::UnsupportedParentType(other)),
        }
    }
}

impl CombinedRule {
    /// # Errors
    /// See [`Rule::compile`].
    pub fn compile(&self, opt: Option<&RuleOption>) -> Result<Document, FilterError> {
        if self.rules.is_empty() {
            return Err(FilterError::EmptyRules);
        }

        let mut filters = Vec::with_capacity(self.rules.len());
        for (index, rule) in self.rules.iter().enumerate() {
            let filter = rule.compile(opt).map_err(|e| e.at_rule(index))?;
            filters.push(Bson::Document(filter));
        }

        let mut out = Document::new();
        out.insert(self.condition.query_key(), Bson::Array(filters));
        Ok(out)
    }
}
