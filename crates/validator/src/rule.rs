//! Rule kinds and per-field rule sets
//!
//! A [`FieldRules`] is the ordered list of [`Rule`]s declared for one field.
//! It applies the declaration shorthand: unless the field allows blank values
//! or carries a [`Rule::Boolean`], an implicit presence rule runs first.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::ValidationError;
use crate::humanize::to_sentence;
use crate::numeric::{Length, Numericality};
use crate::value::{ValueType, is_blank};

/// Boxed error type returned by user-supplied closures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Signature of a custom rule: `Ok(Some(message))` reports a violation.
pub type CustomCheck = dyn Fn(&Value) -> Result<Option<String>, BoxError> + Send + Sync;

/// One validation rule.
#[derive(Clone)]
#[non_exhaustive]
pub enum Rule {
    /// Value must not be blank.
    Presence,
    /// Value must match one of the listed types (blank values pass).
    Type(SmallVec<[ValueType; 2]>),
    /// Value must be literally `true` or `false`.
    Boolean,
    /// Numeric comparisons (null passes).
    Numericality(Numericality),
    /// Value must equal one of the listed values (null passes).
    Inclusion(Vec<Value>),
    /// Value must not equal any listed value (null passes).
    Exclusion(Vec<Value>),
    /// Length bounds on strings and arrays (null passes).
    Length(Length),
    /// String must match the pattern (null passes, non-strings fail).
    Format(Regex),
    /// Caller-supplied check over the raw value.
    Custom(Arc<CustomCheck>),
}

impl Rule {
    /// Short name of the rule kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Type(_) => "type",
            Self::Boolean => "boolean",
            Self::Numericality(_) => "numericality",
            Self::Inclusion(_) => "inclusion",
            Self::Exclusion(_) => "exclusion",
            Self::Length(_) => "length",
            Self::Format(_) => "format",
            Self::Custom(_) => "custom",
        }
    }

    /// Checks `value` against this rule.
    ///
    /// Errors carry no field; [`FieldRules`] attaches it.
    pub fn check(&self, field: &str, value: &Value) -> Vec<ValidationError> {
        match self {
            Self::Presence => {
                if is_blank(value) {
                    vec![ValidationError::new("blank", "can't be blank")]
                } else {
                    Vec::new()
                }
            }
            Self::Type(types) => {
                if is_blank(value) || types.iter().any(|t| t.matches(value)) {
                    return Vec::new();
                }
                let message = match types.as_slice() {
                    [single] => format!("is not a {single}"),
                    many => {
                        let names: Vec<&str> = many.iter().map(|t| t.name()).collect();
                        format!("is not one of {}", names.join(", "))
                    }
                };
                vec![ValidationError::new("type", message)]
            }
            Self::Boolean => {
                if value.is_boolean() {
                    Vec::new()
                } else {
                    vec![ValidationError::new("boolean", "must be true or false")]
                }
            }
            Self::Numericality(rule) if !value.is_null() => rule.check(value),
            Self::Inclusion(allowed) if !value.is_null() && !allowed.contains(value) => {
                vec![ValidationError::new("inclusion", "is not included in the list")]
            }
            Self::Exclusion(reserved) if !value.is_null() && reserved.contains(value) => {
                vec![ValidationError::new("exclusion", "is reserved")]
            }
            Self::Length(rule) if !value.is_null() => rule.check(value),
            Self::Format(pattern) if !value.is_null() => match value.as_str() {
                Some(s) if pattern.is_match(s) => Vec::new(),
                _ => vec![ValidationError::new("invalid", "is invalid")],
            },
            Self::Custom(check) => match check(value) {
                Ok(Some(message)) if !message.trim().is_empty() => {
                    vec![ValidationError::new("custom", message)]
                }
                Ok(_) => Vec::new(),
                Err(err) => {
                    tracing::warn!(
                        target: "axn",
                        field,
                        error = %err,
                        "Custom validation on field '{field}' raised: {err}"
                    );
                    vec![ValidationError::new(
                        "custom",
                        format!("failed validation: {err}"),
                    )]
                }
            },
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence => f.write_str("Presence"),
            Self::Type(types) => f.debug_tuple("Type").field(types).finish(),
            Self::Boolean => f.write_str("Boolean"),
            Self::Numericality(rule) => f.debug_tuple("Numericality").field(rule).finish(),
            Self::Inclusion(values) => f.debug_tuple("Inclusion").field(values).finish(),
            Self::Exclusion(values) => f.debug_tuple("Exclusion").field(values).finish(),
            Self::Length(rule) => f.debug_tuple("Length").field(rule).finish(),
            Self::Format(pattern) => f.debug_tuple("Format").field(&pattern.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A rule plus its per-field options.
#[derive(Debug, Clone)]
pub struct DeclaredRule {
    rule: Rule,
    message: Option<Cow<'static, str>>,
}

impl DeclaredRule {
    /// The underlying rule.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Message override, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// The ordered rules declared for one field.
///
/// ```
/// use axn_validator::{FieldRules, Numericality, Rule, ValueType};
/// use serde_json::json;
///
/// let rules = FieldRules::new("foo")
///     .rule(Rule::Type([ValueType::Numeric].into_iter().collect()))
///     .rule(Rule::Numericality(Numericality::new().greater_than(10)));
///
/// let errors = rules.check(&json!(9));
/// assert_eq!(errors[0].full_message(), "Foo must be greater than 10");
/// assert_eq!(rules.check(&json!(null))[0].full_message(), "Foo can't be blank");
/// ```
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: Cow<'static, str>,
    rules: Vec<DeclaredRule>,
    allow_blank: bool,
}

impl FieldRules {
    /// An empty rule set for `field`.
    pub fn new(field: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field: field.into(),
            rules: Vec::new(),
            allow_blank: false,
        }
    }

    /// Appends a rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(DeclaredRule {
            rule,
            message: None,
        });
        self
    }

    /// Appends a rule with a message override.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule_with_message(
        mut self,
        rule: Rule,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.rules.push(DeclaredRule {
            rule,
            message: Some(message.into()),
        });
        self
    }

    /// Drops the implicit presence rule and skips every rule on blank values.
    #[must_use = "builder methods must be chained or built"]
    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    /// A copy of these rules declared on another field.
    #[must_use]
    pub fn renamed(&self, field: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field: field.into(),
            ..self.clone()
        }
    }

    /// Field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Declared rules, excluding the implicit presence rule.
    pub fn rules(&self) -> &[DeclaredRule] {
        &self.rules
    }

    /// Whether blank values skip every rule.
    pub fn allows_blank(&self) -> bool {
        self.allow_blank
    }

    /// Whether an implicit presence check runs before the declared rules.
    pub fn requires_presence(&self) -> bool {
        !self.allow_blank && !self.rules.iter().any(|r| matches!(r.rule, Rule::Boolean))
    }

    /// Checks `value` against every rule, collecting all violations.
    pub fn check(&self, value: &Value) -> Vec<ValidationError> {
        let blank = is_blank(value);
        if self.allow_blank && blank {
            return Vec::new();
        }

        let mut errors = Vec::new();
        if self.requires_presence() && blank {
            errors.push(ValidationError::blank(self.field.clone()));
        }

        for declared in &self.rules {
            if matches!(declared.rule, Rule::Presence) && self.requires_presence() {
                continue;
            }
            errors.extend(
                declared
                    .rule
                    .check(&self.field, value)
                    .into_iter()
                    .map(|e| {
                        let e = e.with_field(self.field.clone());
                        match &declared.message {
                            Some(message) => e.with_message(message.clone()),
                            None => e,
                        }
                    }),
            );
        }
        errors
    }

    /// Short human description of the rule set, used in logs.
    pub fn describe(&self) -> String {
        let mut kinds: Vec<&str> = Vec::new();
        if self.requires_presence() {
            kinds.push("presence");
        }
        kinds.extend(self.rules.iter().map(|r| r.rule.kind()));
        format!("{}: {}", self.field, to_sentence(&kinds))
    }
}
