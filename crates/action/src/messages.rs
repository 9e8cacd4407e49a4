//! Success and error message resolution.
//!
//! Error messages resolve in this order, first non-blank wins:
//!
//! 1. the message passed to `fail_with` (handled by the result)
//! 2. a rescue matching the captured exception
//! 3. the contract's error template
//! 4. the contract's default error template
//! 5. `"Something went wrong"`
//!
//! Success messages use the success template, then the default success
//! template, then `"Action completed successfully"`. Nothing is memoized:
//! dynamic templates run on every access.

use std::any::type_name;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axn_validator::BoxError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::contract::Contract;
use crate::error::{ContractViolation, Exception};
use crate::facade::InboundFacade;
use crate::logging::ContractLog;

/// Fallback error message.
pub const DEFAULT_ERROR: &str = "Something went wrong";

/// Fallback success message.
pub const DEFAULT_SUCCESS: &str = "Action completed successfully";

/// Signature of a dynamic message template.
pub type MessageFn = dyn Fn(&MessageScope<'_>) -> Result<String, BoxError> + Send + Sync;

// ============================================================================
// SCOPE
// ============================================================================

/// What a dynamic template can see: declared fields and the exception.
#[derive(Debug, Clone, Copy)]
pub struct MessageScope<'a> {
    facade: InboundFacade<'a>,
    exception: Option<&'a Exception>,
}

impl<'a> MessageScope<'a> {
    pub(crate) fn new(facade: InboundFacade<'a>, exception: Option<&'a Exception>) -> Self {
        Self { facade, exception }
    }

    /// A declared field (inbound or outbound).
    pub fn get(&self, field: &str) -> Result<&'a Value, ContractViolation> {
        self.facade.get(field)
    }

    /// A declared field, deserialized.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<T, ContractViolation> {
        self.facade.get_as(field)
    }

    /// The captured exception, when rendering an error for one.
    pub fn exception(&self) -> Option<&'a Exception> {
        self.exception
    }

    /// Name of the contract being rendered for.
    pub fn contract_name(&self) -> &'a str {
        self.facade.contract_name()
    }
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// A static message or a closure producing one.
#[derive(Clone)]
pub enum MessageTemplate {
    /// Used as is.
    Static(Cow<'static, str>),
    /// Evaluated on every access.
    Dynamic(Arc<MessageFn>),
}

impl MessageTemplate {
    /// A template computed from the scope.
    ///
    /// An `Err` is logged as a warning and the template is skipped.
    pub fn dynamic<F>(render: F) -> Self
    where
        F: Fn(&MessageScope<'_>) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(render))
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Static(s) if s.trim().is_empty())
    }

    /// Renders the template; blank output and closure errors yield `None`.
    pub(crate) fn render(&self, scope: &MessageScope<'_>, log: &ContractLog<'_>) -> Option<String> {
        let rendered = match self {
            Self::Static(message) => message.to_string(),
            Self::Dynamic(render) => match render(scope) {
                Ok(message) => message,
                Err(err) => {
                    log.warn(&format!(
                        "Ignoring error raised while determining message: {err}"
                    ));
                    return None;
                }
            },
        };
        (!rendered.trim().is_empty()).then_some(rendered)
    }
}

impl From<&'static str> for MessageTemplate {
    fn from(message: &'static str) -> Self {
        Self::Static(Cow::Borrowed(message))
    }
}

impl From<String> for MessageTemplate {
    fn from(message: String) -> Self {
        Self::Static(Cow::Owned(message))
    }
}

impl fmt::Debug for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(message) => f.debug_tuple("Static").field(message).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Message templates declared on a contract.
///
/// Blank static templates are ignored.
///
/// ```
/// use axn::Messages;
///
/// let messages = Messages::new()
///     .success("Saved")
///     .error_with(|scope| Ok(format!("Could not save {}", scope.get("name")?)))
///     .fail_prefix("Save failed:");
/// assert_eq!(messages.prefix(), Some("Save failed:"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Messages {
    success: Option<MessageTemplate>,
    default_success: Option<MessageTemplate>,
    error: Option<MessageTemplate>,
    default_error: Option<MessageTemplate>,
    fail_prefix: Option<String>,
}

fn present(template: MessageTemplate) -> Option<MessageTemplate> {
    (!template.is_blank()).then_some(template)
}

impl Messages {
    /// No templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary success template.
    pub fn success(mut self, template: impl Into<MessageTemplate>) -> Self {
        self.success = present(template.into()).or(self.success);
        self
    }

    /// Dynamic primary success template.
    pub fn success_with<F>(self, render: F) -> Self
    where
        F: Fn(&MessageScope<'_>) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.success(MessageTemplate::dynamic(render))
    }

    /// Success template used when the primary one is absent or blank.
    pub fn default_success(mut self, template: impl Into<MessageTemplate>) -> Self {
        self.default_success = present(template.into()).or(self.default_success);
        self
    }

    /// Primary error template.
    pub fn error(mut self, template: impl Into<MessageTemplate>) -> Self {
        self.error = present(template.into()).or(self.error);
        self
    }

    /// Dynamic primary error template.
    pub fn error_with<F>(self, render: F) -> Self
    where
        F: Fn(&MessageScope<'_>) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.error(MessageTemplate::dynamic(render))
    }

    /// Error template used when the primary one is absent or blank.
    pub fn default_error(mut self, template: impl Into<MessageTemplate>) -> Self {
        self.default_error = present(template.into()).or(self.default_error);
        self
    }

    /// Prefix prepended to messages passed to `fail_with`.
    pub fn fail_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.trim().is_empty() {
            self.fail_prefix = Some(prefix);
        }
        self
    }

    /// The fail prefix, if set.
    pub fn prefix(&self) -> Option<&str> {
        self.fail_prefix.as_deref()
    }

    /// `self` with every template set in `other` replaced.
    pub(crate) fn merged(self, other: Self) -> Self {
        Self {
            success: other.success.or(self.success),
            default_success: other.default_success.or(self.default_success),
            error: other.error.or(self.error),
            default_error: other.default_error.or(self.default_error),
            fail_prefix: other.fail_prefix.or(self.fail_prefix),
        }
    }
}

// ============================================================================
// RESCUES
// ============================================================================

/// Error message for exceptions of one type.
#[derive(Clone)]
pub struct Rescue {
    matches: fn(&(dyn StdError + 'static)) -> bool,
    error_type: &'static str,
    message: MessageTemplate,
}

fn is_a<E: StdError + 'static>(error: &(dyn StdError + 'static)) -> bool {
    error.is::<E>()
}

impl Rescue {
    /// Rescue errors of type `E` with `message`.
    pub fn new<E: StdError + 'static>(message: impl Into<MessageTemplate>) -> Self {
        Self {
            matches: is_a::<E>,
            error_type: type_name::<E>(),
            message: message.into(),
        }
    }

    /// Whether `error` is of the rescued type.
    pub fn matches(&self, error: &(dyn StdError + 'static)) -> bool {
        (self.matches)(error)
    }

    /// The message template.
    pub fn message(&self) -> &MessageTemplate {
        &self.message
    }
}

impl fmt::Debug for Rescue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rescue")
            .field("error_type", &self.error_type)
            .field("message", &self.message)
            .finish()
    }
}

/// The rescue for `exception`: a match on the error itself beats a match in
/// its source chain, and later declarations beat earlier ones.
pub(crate) fn find_rescue<'r>(rescues: &'r [Rescue], exception: &Exception) -> Option<&'r Rescue> {
    let latest_match = |error: &(dyn StdError + 'static)| rescues.iter().rev().find(|r| r.matches(error));

    let top: &(dyn StdError + 'static) = exception.as_error();
    latest_match(top).or_else(|| exception.sources().find_map(latest_match))
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Error message from rescues and templates (no user message).
pub(crate) fn resolve_error(
    contract: &Contract,
    scope: &MessageScope<'_>,
    log: &ContractLog<'_>,
) -> String {
    let messages = contract.messages();
    scope
        .exception()
        .and_then(|exception| find_rescue(contract.rescues(), exception))
        .and_then(|rescue| rescue.message().render(scope, log))
        .or_else(|| messages.error.as_ref()?.render(scope, log))
        .or_else(|| messages.default_error.as_ref()?.render(scope, log))
        .unwrap_or_else(|| DEFAULT_ERROR.to_owned())
}

/// Success message from templates.
pub(crate) fn resolve_success(
    contract: &Contract,
    scope: &MessageScope<'_>,
    log: &ContractLog<'_>,
) -> String {
    let messages = contract.messages();
    messages
        .success
        .as_ref()
        .and_then(|template| template.render(scope, log))
        .or_else(|| messages.default_success.as_ref()?.render(scope, log))
        .unwrap_or_else(|| DEFAULT_SUCCESS.to_owned())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped")]
    struct Wrapper {
        #[source]
        inner: io::Error,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("other")]
    struct Other;

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct Request {
        #[source]
        cause: Wrapper,
    }

    #[test]
    fn blank_static_templates_are_ignored() {
        let messages = Messages::new().success("Done").success("  ");
        assert!(matches!(&messages.success, Some(MessageTemplate::Static(s)) if s == "Done"));
    }

    #[test]
    fn merged_prefers_newer_values() {
        let parent = Messages::new().success("parent").error("parent error");
        let child = Messages::new().success("child");
        let merged = parent.merged(child);

        assert!(matches!(&merged.success, Some(MessageTemplate::Static(s)) if s == "child"));
        assert!(matches!(&merged.error, Some(MessageTemplate::Static(s)) if s == "parent error"));
    }

    #[test]
    fn rescue_prefers_top_level_match() {
        let rescues = vec![
            Rescue::new::<Wrapper>("top"),
            Rescue::new::<io::Error>("inner"),
        ];
        let exception = Exception::new(Wrapper {
            inner: io::Error::other("x"),
        });

        let found = find_rescue(&rescues, &exception).expect("rescue found");
        assert!(matches!(found.message(), MessageTemplate::Static(s) if s == "top"));
    }

    #[test]
    fn rescue_falls_back_to_source_chain() {
        let rescues = vec![Rescue::new::<io::Error>("inner"), Rescue::new::<Other>("other")];
        let exception = Exception::new(Wrapper {
            inner: io::Error::other("x"),
        });

        let found = find_rescue(&rescues, &exception).expect("rescue found");
        assert!(matches!(found.message(), MessageTemplate::Static(s) if s == "inner"));
    }

    #[test]
    fn rescue_matches_deeply_nested_source() {
        let rescues = vec![Rescue::new::<Other>("other"), Rescue::new::<io::Error>("network")];
        let exception = Exception::new(Request {
            cause: Wrapper {
                inner: io::Error::other("reset"),
            },
        });

        assert_eq!(exception.sources().count(), 2);
        let found = find_rescue(&rescues, &exception).expect("rescue found");
        assert!(matches!(found.message(), MessageTemplate::Static(s) if s == "network"));
    }

    #[test]
    fn later_rescue_wins() {
        let rescues = vec![
            Rescue::new::<io::Error>("first"),
            Rescue::new::<io::Error>("second"),
        ];
        let exception = Exception::new(io::Error::other("x"));

        let found = find_rescue(&rescues, &exception).expect("rescue found");
        assert!(matches!(found.message(), MessageTemplate::Static(s) if s == "second"));
    }

    #[test]
    fn no_rescue_for_unrelated_error() {
        let rescues = vec![Rescue::new::<Other>("other")];
        let exception = Exception::new(io::Error::other("x"));
        assert!(find_rescue(&rescues, &exception).is_none());
    }
}
