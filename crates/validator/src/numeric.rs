//! Numeric comparison and length rules

use serde_json::Value;

use crate::error::ValidationError;
use crate::value::format_number;

/// Numeric comparisons applied to a field value.
///
/// Numbers and numeric strings (`"12"`, `" 3.5 "`) are accepted; anything
/// else fails with `is not a number`. Each configured comparison reports its
/// own violation, so `greater_than(10).less_than(5)` can produce two.
///
/// ```
/// use axn_validator::Numericality;
/// use serde_json::json;
///
/// let rule = Numericality::new().greater_than(10);
/// assert!(rule.check(&json!(11)).is_empty());
/// assert_eq!(rule.check(&json!(9))[0].message, "must be greater than 10");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Numericality {
    only_integer: bool,
    greater_than: Option<f64>,
    greater_than_or_equal_to: Option<f64>,
    less_than: Option<f64>,
    less_than_or_equal_to: Option<f64>,
    equal_to: Option<f64>,
    other_than: Option<f64>,
}

impl Numericality {
    /// A rule that only requires the value to be numeric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an integral value.
    pub fn only_integer(mut self) -> Self {
        self.only_integer = true;
        self
    }

    /// Require `value > bound`.
    pub fn greater_than(mut self, bound: impl Into<f64>) -> Self {
        self.greater_than = Some(bound.into());
        self
    }

    /// Require `value >= bound`.
    pub fn greater_than_or_equal_to(mut self, bound: impl Into<f64>) -> Self {
        self.greater_than_or_equal_to = Some(bound.into());
        self
    }

    /// Require `value < bound`.
    pub fn less_than(mut self, bound: impl Into<f64>) -> Self {
        self.less_than = Some(bound.into());
        self
    }

    /// Require `value <= bound`.
    pub fn less_than_or_equal_to(mut self, bound: impl Into<f64>) -> Self {
        self.less_than_or_equal_to = Some(bound.into());
        self
    }

    /// Require `value == bound`.
    pub fn equal_to(mut self, bound: impl Into<f64>) -> Self {
        self.equal_to = Some(bound.into());
        self
    }

    /// Require `value != bound`.
    pub fn other_than(mut self, bound: impl Into<f64>) -> Self {
        self.other_than = Some(bound.into());
        self
    }

    /// Checks `value`, returning one error per failed comparison.
    ///
    /// Returned errors carry no field; the caller attaches it.
    pub fn check(&self, value: &Value) -> Vec<ValidationError> {
        let Some((number, integral)) = parse_number(value) else {
            return vec![ValidationError::new("not_a_number", "is not a number")];
        };

        if self.only_integer && !integral {
            return vec![ValidationError::new("not_an_integer", "must be an integer")];
        }

        let comparisons: [(Option<f64>, &'static str, &'static str, fn(f64, f64) -> bool); 6] = [
            (self.greater_than, "greater_than", "must be greater than", |v, b| v > b),
            (
                self.greater_than_or_equal_to,
                "greater_than_or_equal_to",
                "must be greater than or equal to",
                |v, b| v >= b,
            ),
            (self.less_than, "less_than", "must be less than", |v, b| v < b),
            (
                self.less_than_or_equal_to,
                "less_than_or_equal_to",
                "must be less than or equal to",
                |v, b| v <= b,
            ),
            (self.equal_to, "equal_to", "must be equal to", |v, b| v == b),
            (self.other_than, "other_than", "must be other than", |v, b| v != b),
        ];

        comparisons
            .into_iter()
            .filter_map(|(bound, code, phrase, holds)| {
                let bound = bound?;
                if holds(number, bound) {
                    return None;
                }
                let shown = format_number(bound);
                Some(
                    ValidationError::new(code, format!("{phrase} {shown}"))
                        .with_param("count", shown),
                )
            })
            .collect()
    }
}

fn parse_number(value: &Value) -> Option<(f64, bool)> {
    match value {
        Value::Number(n) => {
            let integral = n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0);
            n.as_f64().map(|f| (f, integral))
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some((i as f64, true));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| (f, f.fract() == 0.0))
        }
        _ => None,
    }
}

/// Length bounds for strings (in characters) and arrays (in elements).
///
/// Values of other types are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Length {
    minimum: Option<usize>,
    maximum: Option<usize>,
    exact: Option<usize>,
}

impl Length {
    /// No bounds yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require at least `n`.
    pub fn minimum(mut self, n: usize) -> Self {
        self.minimum = Some(n);
        self
    }

    /// Require at most `n`.
    pub fn maximum(mut self, n: usize) -> Self {
        self.maximum = Some(n);
        self
    }

    /// Require exactly `n`.
    pub fn is(mut self, n: usize) -> Self {
        self.exact = Some(n);
        self
    }

    /// Checks `value`, returning one error per failed bound.
    pub fn check(&self, value: &Value) -> Vec<ValidationError> {
        let len = match value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            _ => return Vec::new(),
        };

        let mut errors = Vec::new();
        if let Some(exact) = self.exact.filter(|&n| len != n) {
            errors.push(length_error(
                "wrong_length",
                "is the wrong length (should be",
                exact,
            ));
        }
        if let Some(min) = self.minimum.filter(|&n| len < n) {
            errors.push(length_error("too_short", "is too short (minimum is", min));
        }
        if let Some(max) = self.maximum.filter(|&n| len > n) {
            errors.push(length_error("too_long", "is too long (maximum is", max));
        }
        errors
    }
}

fn length_error(code: &'static str, phrase: &str, count: usize) -> ValidationError {
    let unit = if count == 1 { "character" } else { "characters" };
    ValidationError::new(code, format!("{phrase} {count} {unit})"))
        .with_param("count", count.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn messages(errors: Vec<ValidationError>) -> Vec<String> {
        errors.into_iter().map(|e| e.message.into_owned()).collect()
    }

    #[test]
    fn not_a_number() {
        let rule = Numericality::new();
        assert_eq!(messages(rule.check(&json!("abc"))), vec!["is not a number"]);
        assert_eq!(messages(rule.check(&json!([1]))), vec!["is not a number"]);
        assert!(rule.check(&json!("12")).is_empty());
        assert!(rule.check(&json!(3.5)).is_empty());
    }

    #[test]
    fn only_integer() {
        let rule = Numericality::new().only_integer().greater_than(100);
        assert_eq!(messages(rule.check(&json!(1.5))), vec!["must be an integer"]);
        assert_eq!(messages(rule.check(&json!("2.5"))), vec!["must be an integer"]);
        assert_eq!(messages(rule.check(&json!(2))), vec!["must be greater than 100"]);
    }

    #[rstest]
    #[case(Numericality::new().greater_than(10), json!(10), Some("must be greater than 10"))]
    #[case(Numericality::new().greater_than(10), json!(10.5), None)]
    #[case(Numericality::new().greater_than_or_equal_to(10), json!(10), None)]
    #[case(Numericality::new().greater_than_or_equal_to(10), json!(9), Some("must be greater than or equal to 10"))]
    #[case(Numericality::new().less_than(2.5), json!(3), Some("must be less than 2.5"))]
    #[case(Numericality::new().less_than_or_equal_to(3), json!(3), None)]
    #[case(Numericality::new().equal_to(4), json!("4"), None)]
    #[case(Numericality::new().equal_to(4), json!(5), Some("must be equal to 4"))]
    #[case(Numericality::new().other_than(0), json!(0), Some("must be other than 0"))]
    fn comparisons(
        #[case] rule: Numericality,
        #[case] value: Value,
        #[case] expected: Option<&str>,
    ) {
        let found = messages(rule.check(&value));
        match expected {
            Some(msg) => assert_eq!(found, vec![msg.to_string()]),
            None => assert!(found.is_empty(), "unexpected errors: {found:?}"),
        }
    }

    #[test]
    fn every_failed_comparison_is_reported() {
        let rule = Numericality::new().greater_than(10).less_than(5);
        assert_eq!(
            messages(rule.check(&json!(7))),
            vec!["must be greater than 10", "must be less than 5"]
        );
    }

    #[test]
    fn length_bounds() {
        let rule = Length::new().minimum(2).maximum(4);
        assert!(rule.check(&json!("abc")).is_empty());
        assert_eq!(
            messages(rule.check(&json!("a"))),
            vec!["is too short (minimum is 2 characters)"]
        );
        assert_eq!(
            messages(rule.check(&json!([1, 2, 3, 4, 5]))),
            vec!["is too long (maximum is 4 characters)"]
        );
        assert!(rule.check(&json!(12345)).is_empty());
    }

    #[test]
    fn exact_length_singular() {
        let rule = Length::new().is(1);
        assert_eq!(
            messages(rule.check(&json!("ab"))),
            vec!["is the wrong length (should be 1 character)"]
        );
        assert!(rule.check(&json!("é")).is_empty());
    }
}
