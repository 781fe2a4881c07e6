use bson::Bson;
use filterkit::filter::{AtomRule, CombinedRule, Operator, Rule, Value, encode_bson, encode_json, parse_rule_bson, parse_rule_json};

fn sample() -> Rule {
    CombinedRule::and(vec![
        AtomRule::new("name", Operator::BeginsWith, "Al").into(),
        AtomRule::new("age", Operator::In, vec![18, 21]).into(),
        CombinedRule::or(vec![
            AtomRule::new("active", Operator::Exist, true).into(),
            AtomRule::new("score", Operator::Less, 9.5).into(),
        ])
        .into(),
    ])
    .into()
}

#[test]
fn text_and_binary_encodings_round_trip() {
    let rule = sample();
    let from_json = parse_rule_json(&rule.to_json_string().unwrap()).unwrap();
    let from_bson = parse_rule_bson(&rule.to_bson_bytes().unwrap()).unwrap();
    assert_eq!(from_json, rule);
    assert_eq!(from_bson, rule);
    assert_eq!(from_json.compile(None).unwrap(), from_bson.compile(None).unwrap());
}

#[test]
fn time_values_survive_both_encodings() {
    let at = chrono::DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
    let rule: Rule = AtomRule::new("created", Operator::DatetimeLess, at).into();
    assert_eq!(parse_rule_bson(&rule.to_bson_bytes().unwrap()).unwrap(), rule);

    let text = rule.to_json_string().unwrap();
    assert!(text.contains("$date"));
    let Rule::Atom(a) = parse_rule_json(&text).unwrap() else { panic!("expected atom") };
    assert_eq!(a.value, Value::Time(at));
}

#[test]
fn equality_on_a_time_compiles_the_same_after_json() {
    let raw = bson::doc! {
        "condition": "OR",
        "rules": [
            { "field": "created", "operator": "equal", "value": bson::DateTime::from_millis(1_700_000_000_000) },
            { "field": "created", "operator": "in", "value": [bson::DateTime::from_millis(-86_400_000)] },
        ],
    };
    let rule = parse_rule_bson(&raw.to_vec().unwrap()).unwrap();
    let before = rule.compile(None).unwrap();
    let after = parse_rule_json(&rule.to_json_string().unwrap()).unwrap().compile(None).unwrap();
    assert_eq!(after, before);
    let first = before.get_array("$or").unwrap()[0].as_document().unwrap();
    assert!(matches!(first.get_document("created").unwrap().get("$eq"), Some(Bson::DateTime(_))));
}

#[test]
fn date_objects_with_extra_keys_stay_maps() {
    let rule = parse_rule_json(r#"{"field":"meta","operator":"equal","value":{"$date":"2024-01-01T00:00:00Z","x":1}}"#).unwrap();
    let Rule::Atom(a) = rule else { panic!("expected atom") };
    assert!(matches!(a.value, Value::Map(_)));
}

#[test]
fn malformed_date_object_is_rejected() {
    assert!(parse_rule_json(r#"{"field":"t","operator":"equal","value":{"$date":"not a date"}}"#).is_err());
}

#[test]
fn absent_rules_encode_to_null() {
    assert_eq!(encode_bson(None), Bson::Null);
    assert!(encode_json(None).is_null());
    assert_eq!(encode_json(Some(&sample())), sample().to_json_value());
}
