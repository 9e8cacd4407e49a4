use std::fmt;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Exception;

/// Raw field values keyed by name.
pub type Fields = Map<String, Value>;

static NULL: Value = Value::Null;

/// Identity of one invocation.
///
/// Freshly generated for every call; used to tell an invocation's own
/// controlled failures from ones propagated out of nested invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generate a new random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The private record of one invocation: field values plus outcome state.
///
/// Created from the caller's fields, mutated by the pipeline and the logic
/// body, then moved into the returned [`ActionResult`](crate::ActionResult).
#[derive(Debug, Clone)]
pub struct Context {
    id: InvocationId,
    fields: Fields,
    success: bool,
    error_from_user: Option<String>,
    error_prefix: Option<String>,
    exception: Option<Exception>,
}

impl Context {
    pub(crate) fn new(fields: Fields) -> Self {
        Self {
            id: InvocationId::new(),
            fields,
            success: true,
            error_from_user: None,
            error_prefix: None,
            exception: None,
        }
    }

    /// Invocation id.
    pub fn id(&self) -> InvocationId {
        self.id
    }

    /// Value of `field`, `null` when absent.
    ///
    /// Unrestricted; facades are the declared-field views.
    pub(crate) fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub(crate) fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_owned(), value);
    }

    pub(crate) fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Whether the invocation is still successful.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Message passed to `fail_with`, if any.
    pub fn error_from_user(&self) -> Option<&str> {
        self.error_from_user.as_deref()
    }

    /// Prefix stored alongside a user message.
    pub fn error_prefix(&self) -> Option<&str> {
        self.error_prefix.as_deref()
    }

    /// Captured exception, if any.
    pub fn exception(&self) -> Option<&Exception> {
        self.exception.as_ref()
    }

    /// Mark the invocation failed.
    ///
    /// The prefix is only kept together with a non-blank message.
    pub(crate) fn fail(&mut self, message: Option<String>, prefix: Option<String>) {
        self.success = false;
        if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
            self.error_from_user = Some(message);
            self.error_prefix = prefix.filter(|p| !p.trim().is_empty());
        }
    }

    pub(crate) fn attach_exception(&mut self, exception: Exception) {
        self.exception = Some(exception);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_ids() {
        assert_ne!(InvocationId::new(), InvocationId::new());
        let a = Context::new(Fields::new());
        let b = Context::new(Fields::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn absent_fields_read_as_null() {
        let mut ctx = Context::new(Fields::new());
        assert_eq!(ctx.get("missing"), &Value::Null);
        ctx.set("x", json!(1));
        assert_eq!(ctx.get("x"), &json!(1));
    }

    #[test]
    fn fail_records_message_and_prefix() {
        let mut ctx = Context::new(Fields::new());
        assert!(ctx.is_success());

        ctx.fail(Some("bad".into()), Some("Oops:".into()));
        assert!(!ctx.is_success());
        assert_eq!(ctx.error_from_user(), Some("bad"));
        assert_eq!(ctx.error_prefix(), Some("Oops:"));
    }

    #[test]
    fn prefix_needs_a_message() {
        let mut ctx = Context::new(Fields::new());
        ctx.fail(Some(" ".into()), Some("Oops:".into()));
        assert!(!ctx.is_success());
        assert_eq!(ctx.error_from_user(), None);
        assert_eq!(ctx.error_prefix(), None);
    }
}
