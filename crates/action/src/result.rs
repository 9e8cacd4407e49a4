use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::context::{Context, Fields, InvocationId};
use crate::contract::Contract;
use crate::error::{ContractViolation, Exception};
use crate::facade::{self, InboundFacade};
use crate::field::Direction;
use crate::logging::ContractLog;
use crate::messages::{self, MessageScope};
use crate::snapshot;

/// Anything with a success indicator and an error message.
///
/// [`hoist_errors`](crate::Execution::hoist_errors) and
/// [`depends_on`](crate::Execution::depends_on) require their closure to
/// produce one, so wrapping a block that yields some unrelated value does
/// not compile.
pub trait Outcome {
    /// Whether the outcome is a success.
    fn is_ok(&self) -> bool;

    /// Error message when failed.
    fn error(&self) -> Option<String>;
}

/// What a caller gets back from [`call`](crate::ActionExt::call).
///
/// Fields are read through the outbound allow-list. Messages are resolved on
/// every access, so dynamic templates see the final field values.
#[derive(Clone)]
pub struct ActionResult {
    contract: Arc<Contract>,
    config: Arc<Config>,
    context: Context,
}

impl ActionResult {
    pub(crate) fn new(contract: Arc<Contract>, config: Arc<Config>, context: Context) -> Self {
        Self {
            contract,
            config,
            context,
        }
    }

    /// Whether the invocation succeeded.
    pub fn is_ok(&self) -> bool {
        self.context.is_success()
    }

    /// Alias of [`is_ok`](Self::is_ok).
    pub fn is_success(&self) -> bool {
        self.is_ok()
    }

    /// Whether the invocation failed.
    pub fn is_failure(&self) -> bool {
        !self.is_ok()
    }

    /// Id of the invocation that produced this result.
    pub fn invocation_id(&self) -> InvocationId {
        self.context.id()
    }

    /// The contract that was run.
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// The exception captured while running, if any.
    pub fn exception(&self) -> Option<&Exception> {
        self.context.exception()
    }

    /// A declared outbound field; `null` when unset.
    pub fn get(&self, name: &str) -> Result<&Value, ContractViolation> {
        facade::read(&self.contract, Direction::Outbound, self.context.fields(), name)
    }

    /// A declared outbound field, deserialized.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ContractViolation> {
        facade::read_as(&self.contract, Direction::Outbound, self.context.fields(), name)
    }

    /// Every declared outbound field, unset ones as `null`.
    pub fn exposed(&self) -> Fields {
        snapshot::declared(&self.contract, Direction::Outbound, self.context.fields())
    }

    fn scope(&self) -> MessageScope<'_> {
        MessageScope::new(
            InboundFacade::new(&self.contract, self.context.fields()),
            self.context.exception(),
        )
    }

    fn log(&self) -> ContractLog<'_> {
        ContractLog::new(self.contract.name(), &self.config)
    }

    /// Error message; `None` when successful.
    ///
    /// The message given to `fail_with` wins, then a rescue matching the
    /// exception, then the error templates. A stored fail prefix is
    /// prepended.
    pub fn error(&self) -> Option<String> {
        if self.is_ok() {
            return None;
        }
        let message = match self.context.error_from_user() {
            Some(message) => message.to_owned(),
            None => messages::resolve_error(&self.contract, &self.scope(), &self.log()),
        };
        let message = match self.context.error_prefix() {
            Some(prefix) => format!("{prefix} {message}"),
            None => message,
        };
        Some(squeeze_spaces(&message))
    }

    /// Success message; `None` when failed.
    pub fn success(&self) -> Option<String> {
        self.is_ok()
            .then(|| messages::resolve_success(&self.contract, &self.scope(), &self.log()))
    }

    /// The error when failed, the success message otherwise.
    pub fn message(&self) -> String {
        self.error().or_else(|| self.success()).unwrap_or_default()
    }

    /// `#<ActionResult [status] name: value, ...>` with sensitive values
    /// filtered.
    pub fn inspect(&self) -> String {
        let status = if self.is_ok() {
            "[OK]".to_owned()
        } else if let Some(exception) = self.exception() {
            format!("[failed with {}: '{exception}']", exception.short_type_name())
        } else {
            format!("[failed with '{}']", self.error().unwrap_or_default())
        };
        snapshot::inspect(
            "ActionResult",
            Some(&status),
            &self.contract,
            Direction::Outbound,
            self.context.fields(),
        )
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }
}

impl Outcome for ActionResult {
    fn is_ok(&self) -> bool {
        Self::is_ok(self)
    }

    fn error(&self) -> Option<String> {
        Self::error(self)
    }
}

impl fmt::Debug for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

/// Collapse runs of spaces into one.
fn squeeze_spaces(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        if c == ' ' && out.ends_with(' ') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::messages::Messages;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn contract(messages: Messages) -> Arc<Contract> {
        Contract::builder("Report")
            .expects(Field::new("name"))
            .and_then(|b| b.exposes(Field::new("bar")))
            .and_then(|b| b.exposes(Field::new("phone").sensitive()))
            .expect("valid contract")
            .messages(messages)
            .build()
    }

    fn result(messages: Messages, fill: impl FnOnce(&mut Context)) -> ActionResult {
        let mut fields = Fields::new();
        fields.insert("name".into(), json!("Ada"));
        let mut context = Context::new(fields);
        fill(&mut context);
        ActionResult::new(contract(messages), Arc::new(Config::new()), context)
    }

    #[test]
    fn squeeze_collapses_runs() {
        assert_eq!(squeeze_spaces("Oops:   bad  thing"), "Oops: bad thing");
    }

    #[test]
    fn success_messages() {
        let ok = result(Messages::new(), |_| {});
        assert_eq!(ok.success().as_deref(), Some("Action completed successfully"));
        assert_eq!(ok.error(), None);
        assert_eq!(ok.message(), "Action completed successfully");

        let custom = result(Messages::new().default_success("Fine").success("Great"), |_| {});
        assert_eq!(custom.message(), "Great");
    }

    #[test]
    fn user_message_with_prefix() {
        let failed = result(Messages::new(), |ctx| {
            ctx.fail(Some("bad  input".into()), Some("Oops:".into()));
        });
        assert_eq!(failed.error().as_deref(), Some("Oops: bad input"));
        assert_eq!(failed.success(), None);
    }

    #[test]
    fn templates_fall_through_when_blank() {
        let messages = Messages::new()
            .error_with(|_| Ok(String::new()))
            .default_error("Default failure");
        let failed = result(messages, |ctx| ctx.fail(None, None));
        assert_eq!(failed.error().as_deref(), Some("Default failure"));
    }

    #[test]
    fn dynamic_templates_read_fields() {
        let messages = Messages::new().error_with(|scope| Ok(format!("Could not greet {}", scope.get("name")?)));
        let failed = result(messages, |ctx| ctx.fail(None, None));
        assert_eq!(failed.error().as_deref(), Some("Could not greet \"Ada\""));
        assert_eq!(failed.error(), failed.error());
    }

    #[test]
    fn outbound_reads_only() {
        let ok = result(Messages::new(), |ctx| ctx.set("bar", json!(110)));
        assert_eq!(ok.get("bar"), Ok(&json!(110)));
        assert!(matches!(ok.get("name"), Err(ContractViolation::MethodNotAllowed { .. })));
        assert_eq!(Value::Object(ok.exposed()), json!({ "bar": 110, "phone": null }));
    }

    #[test]
    fn inspect_shows_status_and_filters() {
        let ok = result(Messages::new(), |ctx| {
            ctx.set("bar", json!(110));
            ctx.set("phone", json!("555-0100"));
        });
        assert_eq!(ok.inspect(), "#<ActionResult [OK] bar: 110, phone: [FILTERED]>");

        let failed = result(Messages::new(), |ctx| ctx.fail(Some("nope".into()), None));
        assert_eq!(failed.inspect(), "#<ActionResult [failed with 'nope'] bar: null, phone: null>");
        assert_eq!(format!("{failed:?}"), failed.inspect());
    }
}
