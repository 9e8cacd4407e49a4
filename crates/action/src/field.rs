//! Field declarations: rules, defaults, preprocessing and sensitivity.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axn_validator::{BoxError, FieldRules, Length, Numericality, Rule, ValueType};
use regex::Regex;
use serde_json::Value;

/// Signature of an inbound preprocessor.
pub type Preprocessor = dyn Fn(Value) -> Result<Value, BoxError> + Send + Sync;

/// Signature of a default producer, evaluated on every invocation.
pub type DefaultProducer = dyn Fn() -> Value + Send + Sync;

/// Which side of a contract a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Declared with `expects`; read by the logic body.
    Inbound,
    /// Declared with `exposes`; set by the logic body and read by callers.
    Outbound,
}

impl Direction {
    /// The declaration keyword for this direction.
    pub fn declaration(self) -> &'static str {
        match self {
            Self::Inbound => "expects",
            Self::Outbound => "exposes",
        }
    }

    /// Name of the facade reading fields of this direction.
    pub fn facade(self) -> &'static str {
        match self {
            Self::Inbound => "InboundFacade",
            Self::Outbound => "ActionResult",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        })
    }
}

/// A field's default: a fixed value or a producer closure.
#[derive(Clone)]
pub enum DefaultValue {
    /// Cloned into the context when needed.
    Static(Value),
    /// Called on every invocation that needs it.
    Produced(Arc<DefaultProducer>),
}

impl DefaultValue {
    /// The value to apply.
    pub fn resolve(&self) -> Value {
        match self {
            Self::Static(value) => value.clone(),
            Self::Produced(produce) => produce(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Produced(_) => f.write_str("Produced(..)"),
        }
    }
}

/// One declared field.
///
/// Unless [`allow_blank`](Self::allow_blank) or [`boolean`](Self::boolean)
/// is used, the field is required to be present.
///
/// ```
/// use axn::{Field, Numericality, ValueType};
///
/// let foo = Field::new("foo")
///     .type_of(ValueType::Numeric)
///     .numericality(Numericality::new().greater_than(10));
/// assert_eq!(foo.name(), "foo");
/// assert!(foo.rules().requires_presence());
/// ```
#[derive(Clone)]
pub struct Field {
    rules: FieldRules,
    default: Option<DefaultValue>,
    preprocessor: Option<Arc<Preprocessor>>,
    sensitive: bool,
}

impl Field {
    /// A required field with no further rules.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            rules: FieldRules::new(name),
            default: None,
            preprocessor: None,
            sensitive: false,
        }
    }

    /// Require a value of `ty`.
    pub fn type_of(self, ty: ValueType) -> Self {
        self.rule(Rule::Type(std::iter::once(ty).collect()))
    }

    /// Require a value of any of `types`.
    pub fn one_of_types(self, types: impl IntoIterator<Item = ValueType>) -> Self {
        self.rule(Rule::Type(types.into_iter().collect()))
    }

    /// Require literal `true` or `false`, replacing the presence check.
    pub fn boolean(self) -> Self {
        self.rule(Rule::Boolean)
    }

    /// Numeric comparisons.
    pub fn numericality(self, numericality: Numericality) -> Self {
        self.rule(Rule::Numericality(numericality))
    }

    /// Require one of `values`.
    pub fn inclusion<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rule(Rule::Inclusion(values.into_iter().map(Into::into).collect()))
    }

    /// Reject each of `values`.
    pub fn exclusion<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rule(Rule::Exclusion(values.into_iter().map(Into::into).collect()))
    }

    /// Length bounds.
    pub fn length(self, length: Length) -> Self {
        self.rule(Rule::Length(length))
    }

    /// Require a string matching `pattern`.
    pub fn format(self, pattern: Regex) -> Self {
        self.rule(Rule::Format(pattern))
    }

    /// Custom rule: `Ok(Some(message))` reports a violation.
    pub fn validate_with<F>(self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<Option<String>, BoxError> + Send + Sync + 'static,
    {
        self.rule(Rule::Custom(Arc::new(check)))
    }

    /// Append any rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules = self.rules.rule(rule);
        self
    }

    /// Append a rule whose violations use `message`.
    pub fn rule_with_message(mut self, rule: Rule, message: impl Into<Cow<'static, str>>) -> Self {
        self.rules = self.rules.rule_with_message(rule, message);
        self
    }

    /// Make the field optional; blank values skip every rule.
    pub fn allow_blank(mut self) -> Self {
        self.rules = self.rules.allow_blank(true);
        self
    }

    /// Value applied when the field is null or false.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Static(value.into()));
        self
    }

    /// Producer applied when the field is null or false.
    pub fn default_with<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Produced(Arc::new(produce)));
        self
    }

    /// Transform the raw inbound value before defaults and validation.
    pub fn preprocess<F>(mut self, preprocess: F) -> Self
    where
        F: Fn(Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.preprocessor = Some(Arc::new(preprocess));
        self
    }

    /// Replace the value with `[FILTERED]` in logs, hooks and `inspect`.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// A copy of this declaration under another name.
    pub(crate) fn renamed(&self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            rules: self.rules.renamed(name),
            ..self.clone()
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        self.rules.field()
    }

    /// Validation rules.
    pub fn rules(&self) -> &FieldRules {
        &self.rules
    }

    /// Declared default.
    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Declared preprocessor.
    pub fn preprocessor(&self) -> Option<&Preprocessor> {
        self.preprocessor.as_deref()
    }

    /// Whether the value is filtered from logs.
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("rules", &self.rules.describe())
            .field("default", &self.default)
            .field("preprocess", &self.preprocessor.is_some())
            .field("sensitive", &self.sensitive)
            .finish()
    }
}
