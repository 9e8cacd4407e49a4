//! Property-based tests for axn-validator.

use axn_validator::prelude::*;
use axn_validator::{humanize, to_sentence};
use proptest::prelude::*;
use serde_json::{Value, json};

// ============================================================================
// IDEMPOTENCY: check(x) == check(x)
// ============================================================================

proptest! {
    #[test]
    fn field_check_idempotent(s in ".{0,40}") {
        let rules = FieldRules::new("name")
            .rule(Rule::Length(Length::new().minimum(3).maximum(10)));
        let value = Value::String(s);
        prop_assert_eq!(rules.check(&value), rules.check(&value));
    }

    #[test]
    fn numericality_idempotent(n in any::<i64>()) {
        let rule = Numericality::new().greater_than(0).less_than(100);
        prop_assert_eq!(rule.check(&json!(n)), rule.check(&json!(n)));
    }
}

// ============================================================================
// PRESENCE LAWS
// ============================================================================

proptest! {
    #[test]
    fn whitespace_strings_are_blank(s in "[ \t\n]{0,20}") {
        prop_assert!(is_blank(&Value::String(s)));
    }

    #[test]
    fn strings_with_content_are_not_blank(s in "[ ]{0,5}[a-z0-9]{1,10}[ ]{0,5}") {
        prop_assert!(!is_blank(&Value::String(s)));
    }

    #[test]
    fn numbers_never_blank(n in -1.0e9f64..1.0e9) {
        prop_assert!(!is_blank(&json!(n)));
    }

    #[test]
    fn allow_blank_accepts_every_blank(s in "[ \t]{0,10}") {
        let rules = FieldRules::new("note")
            .allow_blank(true)
            .rule(Rule::Length(Length::new().minimum(5)));
        prop_assert!(rules.check(&Value::String(s)).is_empty());
    }
}

// ============================================================================
// NUMERIC LAWS: greater_than(b) passes iff n > b
// ============================================================================

proptest! {
    #[test]
    fn greater_than_matches_comparison(n in -1000i64..1000, bound in -1000i64..1000) {
        let rule = Numericality::new().greater_than(bound as f64);
        prop_assert_eq!(rule.check(&json!(n)).is_empty(), n > bound);
    }

    #[test]
    fn numeric_strings_behave_like_numbers(n in -1000i64..1000) {
        let rule = Numericality::new().less_than_or_equal_to(0);
        prop_assert_eq!(
            rule.check(&json!(n)).is_empty(),
            rule.check(&json!(n.to_string())).is_empty()
        );
    }
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

proptest! {
    #[test]
    fn humanize_has_no_underscores(s in "[a-z][a-z_]{0,20}") {
        prop_assert!(!humanize(&s).contains('_'));
    }

    #[test]
    fn humanize_is_stable_on_labels(s in "[a-z][a-z ]{0,20}") {
        let once = humanize(&s);
        prop_assert_eq!(humanize(&once), once);
    }

    #[test]
    fn sentence_contains_every_item(items in proptest::collection::vec("[a-z]{1,8}", 0..6)) {
        let sentence = to_sentence(&items);
        for item in &items {
            prop_assert!(sentence.contains(item.as_str()));
        }
    }
}
