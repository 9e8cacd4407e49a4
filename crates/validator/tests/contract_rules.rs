//! Integration tests: validating whole field sets the way a contract does.

use axn_validator::prelude::*;
use pretty_assertions::assert_eq;
use regex::Regex;
use serde_json::{Map, Value, json};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn numeric() -> Rule {
    Rule::Type([ValueType::Numeric].into_iter().collect())
}

fn string() -> Rule {
    Rule::Type([ValueType::String].into_iter().collect())
}

// ============================================================================
// DECLARATION ORDER AND SENTENCE RENDERING
// ============================================================================

#[test]
fn every_violation_in_declaration_order() {
    let rules = vec![
        FieldRules::new("foo")
            .rule(numeric())
            .rule(Rule::Numericality(Numericality::new().greater_than(10))),
        FieldRules::new("bar").rule(string()),
        FieldRules::new("qux"),
    ];
    let input = object(json!({"foo": 9, "bar": 1}));

    let errors = validate_fields(&rules, |f| input.get(f)).unwrap_err();
    assert_eq!(
        errors.full_messages(),
        vec![
            "Foo must be greater than 10",
            "Bar is not a String",
            "Qux can't be blank",
        ]
    );
    assert_eq!(
        errors.to_string(),
        "Foo must be greater than 10, Bar is not a String, and Qux can't be blank"
    );
}

#[test]
fn valid_input_passes() {
    let rules = vec![
        FieldRules::new("foo")
            .rule(numeric())
            .rule(Rule::Numericality(Numericality::new().greater_than(10))),
        FieldRules::new("bar").rule(string()),
    ];
    let input = object(json!({"foo": 11, "bar": "ok"}));
    assert!(validate_fields(&rules, |f| input.get(f)).is_ok());
}

// ============================================================================
// OPTIONAL AND BOOLEAN FIELDS
// ============================================================================

#[test]
fn optional_field_accepts_absence_but_checks_present_values() {
    let rules = vec![
        FieldRules::new("email")
            .allow_blank(true)
            .rule(Rule::Format(Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid regex"))),
    ];

    let absent = object(json!({}));
    assert!(validate_fields(&rules, |f| absent.get(f)).is_ok());

    let bad = object(json!({"email": "nope"}));
    let errors = validate_fields(&rules, |f| bad.get(f)).unwrap_err();
    assert_eq!(errors.to_string(), "Email is invalid");
}

#[test]
fn boolean_field_accepts_false() {
    let rules = vec![FieldRules::new("active").rule(Rule::Boolean)];
    let input = object(json!({"active": false}));
    assert!(validate_fields(&rules, |f| input.get(f)).is_ok());

    let missing = object(json!({}));
    let errors = validate_fields(&rules, |f| missing.get(f)).unwrap_err();
    assert_eq!(errors.to_string(), "Active must be true or false");
}

#[test]
fn errors_are_queryable_per_field() {
    let rules = vec![
        FieldRules::new("code")
            .rule(string())
            .rule(Rule::Length(Length::new().is(3))),
        FieldRules::new("owner_id").rule(numeric()),
    ];
    let input = object(json!({"code": "ab", "owner_id": "x"}));

    let errors = validate_fields(&rules, |f| input.get(f)).unwrap_err();
    let codes: Vec<&str> = errors.for_field("code").map(|e| e.code.as_ref()).collect();
    assert_eq!(codes, vec!["wrong_length"]);
    assert_eq!(
        errors
            .for_field("owner_id")
            .next()
            .map(ValidationError::full_message),
        Some("Owner is not a Numeric".to_string())
    );
}
