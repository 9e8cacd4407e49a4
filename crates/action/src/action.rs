use std::fmt;
use std::sync::Arc;

use crate::context::Fields;
use crate::contract::Contract;
use crate::enqueue::{self, JobQueue};
use crate::error::{ActionError, Failure, Halt};
use crate::execution::Execution;
use crate::pipeline;
use crate::result::ActionResult;

/// A unit of business logic wrapped in a declared contract.
///
/// Implementors provide the contract and the logic body; invoking goes
/// through [`ActionExt`], which every `Action` gets for free.
///
/// # Object Safety
///
/// This trait is object-safe. Organizers and registries store actions as
/// `Arc<dyn Action>`.
///
/// ```
/// use std::sync::{Arc, LazyLock};
///
/// use axn::{Action, ActionExt, Contract, Execution, Field, Halt, fields};
///
/// static GREET: LazyLock<Arc<Contract>> = LazyLock::new(|| {
///     Contract::builder("Greet")
///         .expects(Field::new("name"))
///         .and_then(|b| b.exposes(Field::new("greeting")))
///         .expect("valid contract")
///         .build()
/// });
///
/// struct Greet;
///
/// impl Action for Greet {
///     fn contract(&self) -> Arc<Contract> {
///         GREET.clone()
///     }
///
///     fn run(&self, ctx: &mut Execution<'_>) -> Result<(), Halt> {
///         let name: String = ctx.get_as("name")?;
///         ctx.expose("greeting", format!("Hello, {name}"))?;
///         Ok(())
///     }
/// }
///
/// let result = Greet.call(fields! { "name": "Ada" })?;
/// assert_eq!(result.get_as::<String>("greeting")?, "Hello, Ada");
///
/// let result = Greet.call(fields! {})?;
/// assert!(result.is_failure());
/// assert_eq!(result.error().as_deref(), Some("Something went wrong"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Action: Send + Sync + 'static {
    /// The declared contract.
    fn contract(&self) -> Arc<Contract>;

    /// The logic body.
    ///
    /// Return `Err(ctx.fail_with(..))` for a controlled failure; any other
    /// error converts into [`Halt`] with `?` and is captured as the
    /// invocation's exception.
    fn run(&self, ctx: &mut Execution<'_>) -> Result<(), Halt>;
}

/// Entry points available on every [`Action`].
pub trait ActionExt: Action {
    /// Run the action.
    ///
    /// Controlled failures and uncaught errors come back as a failed
    /// [`ActionResult`]. `Err` is reserved for preprocessing errors and
    /// failures propagated out of nested invocations.
    fn call(&self, fields: Fields) -> Result<ActionResult, ActionError> {
        pipeline::invoke(self, fields)
    }

    /// Run the action, turning a failed result into `Err`.
    ///
    /// A captured exception is returned as is; a controlled failure becomes
    /// [`ActionError::Failure`] carrying the resolved error message.
    fn call_strict(&self, fields: Fields) -> Result<ActionResult, ActionError> {
        let result = self.call(fields)?;
        if result.is_ok() {
            return Ok(result);
        }
        if let Some(exception) = result.exception() {
            return Err(ActionError::Exception(exception.clone()));
        }
        Err(ActionError::Failure(Failure::new(
            result.invocation_id(),
            result.error(),
        )))
    }

    /// Hand the declared inbound fields to `queue` for a later `call`.
    fn enqueue(&self, queue: &dyn JobQueue, fields: Fields) -> Result<(), ActionError> {
        enqueue::push(queue, &self.contract(), fields, false)
    }

    /// Hand the declared inbound fields to `queue` for a later `call_strict`.
    fn enqueue_strict(&self, queue: &dyn JobQueue, fields: Fields) -> Result<(), ActionError> {
        enqueue::push(queue, &self.contract(), fields, true)
    }
}

impl<A: Action + ?Sized> ActionExt for A {}

/// An [`Action`] whose logic body is a closure.
///
/// Built with [`from_fn`].
pub struct FnAction<F> {
    contract: Arc<Contract>,
    body: F,
}

impl<F> Action for FnAction<F>
where
    F: Fn(&mut Execution<'_>) -> Result<(), Halt> + Send + Sync + 'static,
{
    fn contract(&self) -> Arc<Contract> {
        Arc::clone(&self.contract)
    }

    fn run(&self, ctx: &mut Execution<'_>) -> Result<(), Halt> {
        (self.body)(ctx)
    }
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("contract", &self.contract.name())
            .finish_non_exhaustive()
    }
}

/// Pair a contract with a closure body.
pub fn from_fn<F>(contract: Arc<Contract>, body: F) -> FnAction<F>
where
    F: Fn(&mut Execution<'_>) -> Result<(), Halt> + Send + Sync + 'static,
{
    FnAction { contract, body }
}
