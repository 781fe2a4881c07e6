use bson::{Bson, doc};
use filterkit::errors::FilterError;
use filterkit::filter::{AtomRule, ColumnType, CombinedRule, Operator, Rule, RuleOption, Value, parse_rule_json};

fn atom(field: &str, op: Operator, value: impl Into<Value>) -> Rule {
    AtomRule::new(field, op, value).into()
}

#[test]
fn or_rule_compiles_end_to_end() {
    let raw = r#"{"condition":"OR","rules":[
        {"field":"age","operator":"greater","value":18},
        {"field":"name","operator":"equal","value":"Al"}
    ]}"#;
    let out = parse_rule_json(raw).unwrap().compile(None).unwrap();
    assert_eq!(out, doc! { "$or": [ { "age": { "$gt": 18 } }, { "name": { "$eq": "Al" } } ] });
}

#[test]
fn combined_emits_one_fragment_per_child_in_order() {
    let rules: Vec<Rule> = (0..5).map(|i| atom(&format!("f{i}"), Operator::NotEqual, i)).collect();
    let out = Rule::from(CombinedRule::and(rules)).compile(None).unwrap();
    let Some(Bson::Array(parts)) = out.get("$and") else { panic!("expected $and array") };
    assert_eq!(parts.len(), 5);
    for (i, part) in parts.iter().enumerate() {
        let Bson::Document(d) = part else { panic!("expected document") };
        assert!(d.contains_key(format!("f{i}")));
    }
}

#[test]
fn comparison_and_membership_operators() {
    let cases = [
        (atom("a", Operator::LessOrEqual, 3), doc! { "a": { "$lte": 3 } }),
        (atom("a", Operator::GreaterOrEqual, 2.5), doc! { "a": { "$gte": 2.5 } }),
        (atom("a", Operator::In, vec![1, 2]), doc! { "a": { "$in": [1, 2] } }),
        (atom("a", Operator::NotIn, vec!["x"]), doc! { "a": { "$nin": ["x"] } }),
        (atom("a", Operator::Exist, false), doc! { "a": { "$exists": false } }),
        (atom("a", Operator::Size, 3), doc! { "a": { "$size": 3 } }),
    ];
    for (rule, want) in cases {
        assert_eq!(rule.compile(None).unwrap(), want);
    }
}

#[test]
fn large_ints_stay_int64() {
    let big = i64::from(i32::MAX) + 1;
    let out = atom("n", Operator::Equal, big).compile(None).unwrap();
    assert_eq!(out, doc! { "n": { "$eq": big } });
}

#[test]
fn string_matchers_escape_and_negate() {
    assert_eq!(
        atom("f", Operator::BeginsWith, "a.b").compile(None).unwrap(),
        doc! { "f": { "$regex": "^a\\.b" } }
    );
    assert_eq!(
        atom("f", Operator::EndsWith, "x+").compile(None).unwrap(),
        doc! { "f": { "$regex": "x\\+$" } }
    );
    assert_eq!(
        atom("f", Operator::NotContains, "ab").compile(None).unwrap(),
        doc! { "f": { "$not": { "$regex": "ab", "$options": "i" } } }
    );
    assert_eq!(
        atom("f", Operator::NotBeginsWith, "q").compile(None).unwrap(),
        doc! { "f": { "$not": { "$regex": "^q" } } }
    );
}

#[test]
fn datetime_strings_compile_to_bson_datetimes() {
    let out = atom("created", Operator::DatetimeGreater, "2024-01-02").compile(None).unwrap();
    assert_eq!(out, doc! { "created": { "$gt": bson::DateTime::from_millis(1_704_153_600_000) } });
}

#[test]
fn object_parent_nests_paths() {
    let rule = atom("addr", Operator::FilterObject, atom("city", Operator::Equal, "Oslo"));
    assert_eq!(rule.compile(None).unwrap(), doc! { "addr.city": { "$eq": "Oslo" } });

    let deeper = atom("b", Operator::FilterObject, atom("c", Operator::Equal, 1));
    let opt = RuleOption::new("a", ColumnType::Object);
    assert_eq!(deeper.compile(Some(&opt)).unwrap(), doc! { "a.b.c": { "$eq": 1 } });
}

#[test]
fn array_parent_uses_index_or_element() {
    let inner: Rule = CombinedRule::and(vec![
        atom("element", Operator::Equal, "x"),
        atom("1", Operator::Equal, "y"),
    ])
    .into();
    let rule = atom("tags", Operator::FilterArray, inner);
    assert_eq!(
        rule.compile(None).unwrap(),
        doc! { "$and": [ { "tags": { "$eq": "x" } }, { "tags.1": { "$eq": "y" } } ] }
    );
}

#[test]
fn array_index_must_be_positive_integer() {
    let opt = RuleOption::new("tags", ColumnType::Array);
    for bad in ["0", "-1", "first", ""] {
        let err = atom(bad, Operator::Equal, 1).compile(Some(&opt)).unwrap_err();
        assert!(matches!(err, FilterError::InvalidArrayIndex(ref f) if f == bad), "{bad}: {err}");
    }
}

#[test]
fn bad_parent_context_fails() {
    let rule = atom("a", Operator::Equal, 1);
    let empty = RuleOption::new("", ColumnType::Object);
    assert!(matches!(rule.compile(Some(&empty)).unwrap_err(), FilterError::InvalidParentContext));
    let scalar = RuleOption::new("p", ColumnType::String);
    assert!(matches!(
        rule.compile(Some(&scalar)).unwrap_err(),
        FilterError::UnsupportedParentType(ColumnType::String)
    ));
}

#[test]
fn combined_compile_rechecks_children() {
    let empty: Rule = CombinedRule::or(vec![]).into();
    assert!(matches!(empty.compile(None).unwrap_err(), FilterError::EmptyRules));

    let opt = RuleOption::new("tags", ColumnType::Array);
    let rule: Rule = CombinedRule::or(vec![atom("1", Operator::Equal, 1), atom("0", Operator::Equal, 1)]).into();
    let err = rule.compile(Some(&opt)).unwrap_err();
    assert_eq!(err.rule_path(), vec![1]);
    assert!(matches!(err.root_cause(), FilterError::InvalidArrayIndex(_)));
}
