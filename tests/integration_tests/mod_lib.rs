use filterkit::filter::{ColumnType, ExprOption, parse_rule_json};

#[test]
fn library_surface_decodes_validates_compiles() {
    let rule = parse_rule_json(r#"{"field":"age","operator":"not_equal","value":0}"#).unwrap();
    rule.validate(&ExprOption::with_fields([("age", ColumnType::Numeric)])).unwrap();
    assert_eq!(rule.compile(None).unwrap(), bson::doc! { "age": { "$ne": 0 } });
}
