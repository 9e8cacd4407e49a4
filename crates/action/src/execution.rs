//! The logic body's handle on one invocation.

use std::error::Error as StdError;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::context::{Context, Fields, InvocationId};
use crate::contract::Contract;
use crate::error::{ContractViolation, Exception, Failure, Halt};
use crate::facade::{self, InboundFacade};
use crate::field::Direction;
use crate::logging::ContractLog;
use crate::messages::{self, MessageScope};
use crate::pipeline;
use crate::provider::LogLevel;
use crate::result::Outcome;

/// Passed to [`Action::run`](crate::Action::run).
///
/// Reads go through the inbound facade, writes are limited to declared
/// outbound fields, and failures are raised by returning the [`Halt`] that
/// [`fail_with`](Self::fail_with) produces.
pub struct Execution<'a> {
    contract: &'a Contract,
    config: &'a Config,
    context: &'a mut Context,
}

impl<'a> Execution<'a> {
    pub(crate) fn new(contract: &'a Contract, config: &'a Config, context: &'a mut Context) -> Self {
        Self {
            contract,
            config,
            context,
        }
    }

    /// Id of the running invocation.
    pub fn id(&self) -> InvocationId {
        self.context.id()
    }

    /// The contract being run.
    pub fn contract(&self) -> &Contract {
        self.contract
    }

    /// A declared field; `null` when unset.
    pub fn get(&self, name: &str) -> Result<&Value, ContractViolation> {
        facade::read(self.contract, Direction::Inbound, self.context.fields(), name)
    }

    /// A declared field, deserialized.
    ///
    /// ```
    /// use axn::{ActionExt, Contract, Field, fields, from_fn};
    ///
    /// let contract = Contract::builder("Double")
    ///     .expects(Field::new("n"))?
    ///     .exposes(Field::new("twice"))?
    ///     .build();
    /// let double = from_fn(contract, |ctx| {
    ///     let n: i64 = ctx.get_as("n")?;
    ///     ctx.expose("twice", n * 2)?;
    ///     Ok(())
    /// });
    ///
    /// let result = double.call(fields! { "n": 21 })?;
    /// assert_eq!(result.get_as::<i64>("twice")?, 42);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ContractViolation> {
        facade::read_as(self.contract, Direction::Inbound, self.context.fields(), name)
    }

    /// The inbound facade.
    pub fn inbound(&self) -> InboundFacade<'_> {
        InboundFacade::new(self.contract, self.context.fields())
    }

    /// Set a declared outbound field.
    pub fn expose(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ContractViolation> {
        if !self.contract.declares(Direction::Outbound, name) {
            return Err(ContractViolation::InvalidExposure {
                field: name.to_owned(),
            });
        }
        self.context.set(name, value.into());
        Ok(())
    }

    /// Set several declared outbound fields; stops at the first undeclared one.
    pub fn expose_all<K, V>(&mut self, values: impl IntoIterator<Item = (K, V)>) -> Result<(), ContractViolation>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .try_for_each(|(name, value)| self.expose(name.as_ref(), value))
    }

    /// Every field of the invocation, declared or not.
    pub(crate) fn raw_fields(&self) -> &Fields {
        self.context.fields()
    }

    /// Whether nothing has failed the invocation yet.
    pub fn is_success(&self) -> bool {
        self.context.is_success()
    }

    // ------------------------------------------------------------------------
    // Logging
    // ------------------------------------------------------------------------

    fn log_handle(&self) -> ContractLog<'_> {
        ContractLog::new(self.contract.name(), self.config)
    }

    /// Log a line prefixed with the contract name.
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.log_handle().log(level, message.as_ref());
    }

    /// Debug line; promoted to info for debug targets.
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log_handle().debug(message.as_ref());
    }

    /// Info line.
    pub fn info(&self, message: impl AsRef<str>) {
        self.log_handle().info(message.as_ref());
    }

    /// Warning line.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log_handle().warn(message.as_ref());
    }

    // ------------------------------------------------------------------------
    // Failing
    // ------------------------------------------------------------------------

    /// Fail the invocation with `message`.
    ///
    /// The contract's fail prefix, if any, is stored with the message. Return
    /// the result from the logic body: `return Err(ctx.fail_with("nope"))`.
    pub fn fail_with(&mut self, message: impl Into<String>) -> Halt {
        let prefix = self.contract.messages().prefix().map(str::to_owned);
        self.halt(Some(message.into()), prefix)
    }

    /// Fail the invocation without a message; the error comes from templates.
    pub fn fail(&mut self) -> Halt {
        self.halt(None, None)
    }

    fn halt(&mut self, message: Option<String>, prefix: Option<String>) -> Halt {
        self.context.fail(message.clone(), prefix);
        Halt::Failure(Failure::new(self.id(), message))
    }

    fn error_message_for(&self, exception: &Exception) -> String {
        let scope = MessageScope::new(self.inbound(), Some(exception));
        messages::resolve_error(self.contract, &scope, &self.log_handle())
    }

    // ------------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------------

    /// Run `f`, failing this invocation if it errs or returns a failed outcome.
    ///
    /// A failed outcome fails with `"<prefix>: <its error>"`. An error is
    /// logged, attached as this invocation's exception and failed with
    /// `"<prefix>: <message resolved for it>"`. The contract's fail prefix is
    /// not applied. Only the closure's final value is checked.
    pub fn hoist_errors<R, E, F>(&mut self, prefix: Option<&str>, f: F) -> Result<R, Halt>
    where
        R: Outcome,
        E: StdError + Send + Sync + 'static,
        F: FnOnce(&Self) -> Result<R, E>,
    {
        match f(self) {
            Ok(outcome) if outcome.is_ok() => Ok(outcome),
            Ok(outcome) => Err(self.halt(prefixed(prefix, outcome.error()), None)),
            Err(err) => {
                self.warn(format!("hoist_errors block swallowed an exception: {err}"));
                let exception = Exception::new(err);
                if let Some(failure) = exception.as_failure() {
                    let message = failure.message().to_owned();
                    return Err(self.halt(prefixed(prefix, Some(message)), None));
                }
                let message = self.error_message_for(&exception);
                self.context.attach_exception(exception);
                Err(self.halt(prefixed(prefix, Some(message)), None))
            }
        }
    }

    /// Like [`hoist_errors`](Self::hoist_errors), but an error is not
    /// attached to this invocation and the failure goes through
    /// [`fail_with`](Self::fail_with).
    pub fn depends_on<R, E, F>(&mut self, prefix: Option<&str>, f: F) -> Result<R, Halt>
    where
        R: Outcome,
        E: StdError + Send + Sync + 'static,
        F: FnOnce(&Self) -> Result<R, E>,
    {
        let message = match f(self) {
            Ok(outcome) if outcome.is_ok() => return Ok(outcome),
            Ok(outcome) => outcome.error(),
            Err(err) => {
                self.warn(format!("depends_on block raised an exception: {err}"));
                let exception = Exception::new(err);
                Some(match exception.as_failure() {
                    Some(failure) => failure.message().to_owned(),
                    None => self.error_message_for(&exception),
                })
            }
        };
        let prefixed = prefixed(prefix, message).unwrap_or_default();
        Err(self.fail_with(prefixed))
    }

    /// Run `f`, reporting and swallowing any error other than a failure.
    ///
    /// Controlled failures (this invocation's or a nested one's) still
    /// propagate. Returns `Ok(None)` when an error was swallowed.
    pub fn attempt<T, F>(&mut self, f: F) -> Result<Option<T>, Halt>
    where
        F: FnOnce(&mut Self) -> Result<T, Halt>,
    {
        match f(self) {
            Ok(value) => Ok(Some(value)),
            Err(Halt::Error(exception)) if exception.as_failure().is_none() => {
                pipeline::report_exception(self.contract, self.config, self.context, &exception);
                Ok(None)
            }
            Err(halt) => Err(halt),
        }
    }
}

impl std::fmt::Debug for Execution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Execution")
            .field("contract", &self.contract.name())
            .field("id", &self.id())
            .field("success", &self.context.is_success())
            .finish()
    }
}

fn prefixed(prefix: Option<&str>, message: Option<String>) -> Option<String> {
    match (prefix.filter(|p| !p.trim().is_empty()), message) {
        (Some(prefix), Some(message)) => Some(format!("{prefix}: {message}")),
        (Some(prefix), None) => Some(prefix.to_owned()),
        (None, message) => message,
    }
}
