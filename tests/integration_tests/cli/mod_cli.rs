use filterkit::FilterConfig;
use filterkit::cli::{Command, OutputMode, RuleSource, run_with_format};
use filterkit::errors::FilterError;
use filterkit::filter::{ColumnType, ExprOption, RuleOption, WireFormat, parse_rule_bson};
use std::fs;
use tempfile::tempdir;

const RULE: &str = r#"{"condition":"AND","rules":[{"field":"age","operator":"greater","value":18},{"field":"name","operator":"contains","value":"al"}]}"#;

fn run(cfg: &FilterConfig, cmd: Command, mode: OutputMode) -> Result<String, FilterError> {
    let mut buf = Vec::new();
    run_with_format(cfg, cmd, mode, &mut buf)?;
    Ok(String::from_utf8(buf).unwrap())
}

#[test]
fn validate_reports_kind_and_fields() {
    let cfg = FilterConfig::default();
    let out = run(&cfg, Command::Validate { source: RuleSource::Inline(RULE.into()) }, OutputMode::Json).unwrap();
    let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(v["valid"], true);
    assert_eq!(v["kind"], "CombinedRule");
    assert_eq!(v["fields"], serde_json::json!(["age", "name"]));

    let out = run(&cfg, Command::Validate { source: RuleSource::Inline(RULE.into()) }, OutputMode::Human).unwrap();
    assert_eq!(out, "valid CombinedRule fields=age,name\n");
}

#[test]
fn validate_applies_configured_policy() {
    let cfg = FilterConfig {
        policy: ExprOption::with_fields([("age", ColumnType::Numeric)]),
        ..FilterConfig::default()
    };
    let err = run(&cfg, Command::Validate { source: RuleSource::Inline(RULE.into()) }, OutputMode::Plain).unwrap_err();
    assert!(matches!(err, FilterError::UnknownFieldInPolicy(f) if f == "name"));
}

#[test]
fn compile_prints_extended_json() {
    let cfg = FilterConfig::default();
    let out = run(&cfg, Command::Compile { source: RuleSource::Inline(RULE.into()), parent: None }, OutputMode::Plain).unwrap();
    let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(v["$and"][0]["age"]["$gt"], 18);
    assert_eq!(v["$and"][1]["name"]["$options"], "i");
}

#[test]
fn compile_with_parent_context() {
    let cfg = FilterConfig::default();
    let cmd = Command::Compile {
        source: RuleSource::Inline(r#"{"field":"2","operator":"equal","value":"b"}"#.into()),
        parent: Some(RuleOption::new("tags", ColumnType::Array)),
    };
    let out = run(&cfg, cmd, OutputMode::Json).unwrap();
    assert_eq!(out.trim(), r#"{"tags.2":{"$eq":"b"}}"#);
}

#[test]
fn convert_json_file_to_bson_and_back() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("rule.json");
    let bson_path = dir.path().join("rule.bson");
    fs::write(&json_path, RULE).unwrap();
    let cfg = FilterConfig::default();

    let cmd = Command::Convert { input: json_path.clone(), from: None, to: WireFormat::Bson, out: Some(bson_path.clone()) };
    let out = run(&cfg, cmd, OutputMode::Plain).unwrap();
    assert_eq!(out.trim(), bson_path.display().to_string());
    let rule = parse_rule_bson(&fs::read(&bson_path).unwrap()).unwrap();
    assert_eq!(rule.fields(), vec!["age".to_string(), "name".to_string()]);

    // format inferred from the extension
    let fields = run(&cfg, Command::Fields { source: RuleSource::File { path: bson_path.clone(), format: None } }, OutputMode::Json).unwrap();
    assert_eq!(fields.trim(), r#"["age","name"]"#);

    let cmd = Command::Convert { input: bson_path, from: None, to: WireFormat::Json, out: None };
    let text = run(&cfg, cmd, OutputMode::Human).unwrap();
    let v: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
    let orig: serde_json::Value = serde_json::from_str(RULE).unwrap();
    assert_eq!(v, orig);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let cmd = Command::Fields { source: RuleSource::File { path: dir.path().join("absent.json"), format: None } };
    assert!(matches!(run(&FilterConfig::default(), cmd, OutputMode::Plain).unwrap_err(), FilterError::Io(_)));
}

#[test]
fn config_decode_depth_reaches_the_cli() {
    let cfg = FilterConfig { max_decode_depth: 1, ..FilterConfig::default() };
    let err = run(&cfg, Command::Fields { source: RuleSource::Inline(RULE.into()) }, OutputMode::Plain).unwrap_err();
    assert!(matches!(err.root_cause(), FilterError::DecodeDepthExceeded(1)));
}
