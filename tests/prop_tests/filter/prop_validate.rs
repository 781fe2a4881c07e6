use filterkit::errors::FilterError;
use filterkit::filter::{ExprOption, Rule, Value};
use proptest::prelude::*;

use super::roundtrip_props::rule_tree;

/// Depth budget a tree needs: every combined rule and structural operator costs one level.
fn depth_cost(rule: &Rule) -> usize {
    match rule {
        Rule::Combined(c) => 1 + c.rules.iter().map(depth_cost).max().unwrap_or(0),
        Rule::Atom(a) => match &a.value {
            Value::Rule(sub) => 1 + depth_cost(sub),
            _ => 0,
        },
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 64,
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_well_formed_trees_pass_default_policy(rule in rule_tree()) {
        prop_assert!(rule.validate(&ExprOption::default()).is_ok());
    }

    #[test]
    fn prop_depth_limit_matches_tree_depth(rule in rule_tree(), depth in 1usize..6) {
        let opt = ExprOption { max_rules_depth: depth, ..ExprOption::default() };
        let res = rule.validate(&opt);
        if depth_cost(&rule) < depth {
            prop_assert!(res.is_ok());
        } else {
            let err = res.unwrap_err();
            prop_assert!(matches!(err.root_cause(), FilterError::DepthExceeded));
        }
    }

    #[test]
    fn prop_validation_is_repeatable(rule in rule_tree()) {
        let opt = ExprOption { max_rules_limit: 2, ..ExprOption::default() };
        let first = rule.validate(&opt).map_err(|e| e.to_string());
        let second = rule.validate(&opt).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }
}
