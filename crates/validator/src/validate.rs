//! Whole-direction validation
//!
//! Runs every field's rules in declaration order and collects every
//! violation before failing (not fail-fast).

use serde_json::Value;

use crate::error::ValidationErrors;
use crate::rule::FieldRules;

static NULL: Value = Value::Null;

/// Validates each rule set against the value `lookup` returns for its field.
///
/// A field `lookup` cannot find is validated as `null`.
///
/// ```
/// use axn_validator::{FieldRules, validate_fields};
/// use serde_json::json;
///
/// let fields = json!({"name": "Ada"});
/// let rules = [FieldRules::new("name"), FieldRules::new("email")];
///
/// let errors = validate_fields(&rules, |f| fields.get(f)).unwrap_err();
/// assert_eq!(errors.to_string(), "Email can't be blank");
/// ```
pub fn validate_fields<'v, 'r, I, F>(rules: I, lookup: F) -> Result<(), ValidationErrors>
where
    I: IntoIterator<Item = &'r FieldRules>,
    F: Fn(&str) -> Option<&'v Value>,
{
    let mut errors = ValidationErrors::new();
    for field_rules in rules {
        let value = lookup(field_rules.field()).unwrap_or(&NULL);
        errors.extend(field_rules.check(value));
    }
    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Numericality;
    use crate::rule::Rule;
    use serde_json::json;

    #[test]
    fn passes_when_all_fields_valid() {
        let data = json!({"a": 1, "b": "x"});
        let rules = [FieldRules::new("a"), FieldRules::new("b")];
        assert!(validate_fields(&rules, |f| data.get(f)).is_ok());
    }

    #[test]
    fn not_fail_fast() {
        let data = json!({"count": 3});
        let rules = [
            FieldRules::new("missing"),
            FieldRules::new("count").rule(Rule::Numericality(Numericality::new().greater_than(5))),
        ];
        let errors = validate_fields(&rules, |f| data.get(f)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "Missing can't be blank and Count must be greater than 5"
        );
    }

    #[test]
    fn empty_rule_list_is_ok() {
        let rules: [FieldRules; 0] = [];
        assert!(validate_fields(&rules, |_| None).is_ok());
    }
}
