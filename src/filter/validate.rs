use std::collections::HashSet;

use super::rule::{AtomRule, CombinedRule, Rule};
use super::types::{ColumnType, ExprOption};
use super::value::Value;
use crate::errors::FilterError;

impl Rule {
    /// Checks the tree against `opt`, depth-first and left to right, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first failure; failures below a combined rule are wrapped with the child index.
    pub fn validate(&self, opt: &ExprOption) -> Result<(), FilterError> {
        let res = match self {
            Self::Atom(a) => a.validate(opt),
            Self::Combined(c) => c.validate(opt),
        };
        if let Err(e) = &res {
            log::debug!("{} rejected: {e}", self.kind());
        }
        res
    }
}

impl AtomRule {
    /// # Errors
    /// See [`Rule::validate`].
    pub fn validate(&self, opt: &ExprOption) -> Result<(), FilterError> {
        if self.field.is_empty() {
            return Err(FilterError::EmptyField);
        }
        // the operator tag is a closed enum, so an unknown tag never reaches this point
        if self.value.is_null() {
            return Err(FilterError::NilValue);
        }

        if !opt.rule_fields.is_empty() {
            let typ = opt
                .rule_fields
                .get(&self.field)
                .ok_or_else(|| FilterError::UndeclaredField(self.field.clone()))?;
            validate_field_value(&self.field, &self.value, *typ)?;
            if let Some(parent) = self.operator.parent_type()
                && parent != *typ
            {
                return Err(FilterError::TypeMismatch { field: self.field.clone(), expected: *typ });
            }
        }

        self.operator.validate_value(&self.field, &self.value, opt)?;

        if let Some(sub) = self.value.as_rule() {
            if !opt.rule_fields.is_empty()
                && let Some(path) = self.fields().into_iter().find(|p| !opt.rule_fields.contains_key(p))
            {
                return Err(FilterError::UnknownFieldInPolicy(path));
            }
            sub.validate(&opt.nested(&self.field)?)?;
        }
        Ok(())
    }
}

/// Sequences are checked element by element; every element must satisfy `typ` on its own.
fn validate_field_value(field: &str, value: &Value, typ: ColumnType) -> Result<(), FilterError> {
    if let Value::Seq(items) = value {
        return items.iter().try_for_each(|v| validate_field_value(field, v, typ));
    }
    if value.matches_type(typ) {
        Ok(())
    } else {
        Err(FilterError::TypeMismatch { field: field.to_string(), expected: typ })
    }
}

impl CombinedRule {
    /// # Errors
    /// See [`Rule::validate`].
    pub fn validate(&self, opt: &ExprOption) -> Result<(), FilterError> {
        if self.rules.is_empty() {
            return Err(FilterError::EmptyRules);
        }

        let max_rules = opt.effective_max_rules_limit();
        if self.rules.len() > max_rules {
            return Err(FilterError::TooManyRules(max_rules));
        }

        let fields = self.fields();
        let mut seen = HashSet::with_capacity(fields.len());
        let unique: Vec<&String> = fields.iter().filter(|f| seen.insert(f.as_str())).collect();
        if unique.is_empty() {
            return Err(FilterError::NoQueryableField);
        }

        if !opt.rule_fields.is_empty()
            && let Some(unknown) = unique.iter().find(|f| !opt.rule_fields.contains_key(f.as_str()))
        {
            return Err(FilterError::UnknownFieldInPolicy((*unknown).clone()));
        }

        let child_opt = opt.descend()?;
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate(&child_opt).map_err(|e| e.at_rule(index))?;
        }
        Ok(())
    }
}
