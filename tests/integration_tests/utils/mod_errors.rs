use filterkit::errors::FilterError;
use filterkit::filter::ColumnType;
use std::error::Error as _;

#[test]
fn messages_name_the_offender() {
    let e = FilterError::TypeMismatch { field: "age".into(), expected: ColumnType::Numeric };
    assert_eq!(e.to_string(), "invalid age's value, should be a numeric value");
    assert_eq!(FilterError::TooManyRules(2).to_string(), "rules elements number is overhead, it at most have 2 rules");
    assert_eq!(FilterError::InvalidArrayIndex("0".into()).to_string(), "filter array index 0 is invalid");
}

#[test]
fn rule_wrapping_builds_a_path() {
    let e = FilterError::EmptyField.at_rule(3).at_rule(0);
    assert_eq!(e.rule_path(), vec![0, 3]);
    assert!(matches!(e.root_cause(), FilterError::EmptyField));
    assert_eq!(e.to_string(), "rules[0] is invalid, rules[3] is invalid, field is empty");
}

#[test]
fn chained_report_names_the_child_once() {
    let e = FilterError::NilValue.at_rule(2).at_rule(1);
    let mut report = e.to_string();
    let mut cur = e.source();
    while let Some(inner) = cur {
        report.push_str(": ");
        report.push_str(&inner.to_string());
        cur = inner.source();
    }
    assert_eq!(report.matches("rule value can not be null").count(), 1);
    assert_eq!(report.matches("rules[2]").count(), 1);
}

#[test]
fn unwrapped_error_has_empty_path() {
    let e = FilterError::NilValue;
    assert!(e.rule_path().is_empty());
    assert!(matches!(e.root_cause(), FilterError::NilValue));
}

#[test]
fn io_and_json_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(FilterError::from(io), FilterError::Io(msg) if msg.contains("gone")));
    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(FilterError::from(json).to_string().starts_with("Serde JSON:"));
}
