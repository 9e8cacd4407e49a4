//! The per-invocation pipeline.
//!
//! ```text
//! preprocess -> inbound defaults -> validate inbound -> run
//!            -> outbound defaults -> validate outbound
//! ```
//!
//! Preprocessing errors abort the invocation. Everything after it is
//! contained: failures raised by this invocation and uncaught errors end up
//! in the returned [`ActionResult`], failures raised by a nested invocation
//! propagate.

use std::sync::Arc;
use std::time::Instant;

use axn_validator::validate_fields;

use crate::action::Action;
use crate::config::Config;
use crate::context::{Context, Fields};
use crate::contract::Contract;
use crate::error::{ActionError, ContractViolation, Exception, Halt};
use crate::execution::Execution;
use crate::field::{Direction, Field};
use crate::logging::ContractLog;
use crate::result::ActionResult;
use crate::snapshot;

/// Run `action` once over `fields`.
pub(crate) fn invoke<A>(action: &A, fields: Fields) -> Result<ActionResult, ActionError>
where
    A: Action + ?Sized,
{
    let contract = action.contract();
    let config = contract.config();
    let mut context = Context::new(fields);

    execute(action, &contract, &config, &mut context)?;
    Ok(ActionResult::new(contract, config, context))
}

fn execute<A>(action: &A, contract: &Arc<Contract>, config: &Config, context: &mut Context) -> Result<(), ActionError>
where
    A: Action + ?Sized,
{
    let log = ContractLog::new(contract.name(), config);
    let inbound = snapshot::filtered(contract, Some(Direction::Inbound), context.fields());
    log.debug(&with_snapshot("About to execute", " with: ", &inbound));

    let started = Instant::now();
    let mut outcome = Ok(());
    {
        let mut run = || outcome = run_contract(action, contract, config, context);
        match config.around() {
            Some(around) => around(contract.name(), &mut run),
            None => run(),
        }
    }
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    let label = match &outcome {
        Err(_) => "exception",
        Ok(()) if context.is_success() => "success",
        Ok(()) if context.exception().is_some() => "exception",
        Ok(()) => "failure",
    };
    let outbound = snapshot::filtered(contract, Some(Direction::Outbound), context.fields());
    log.debug(&with_snapshot(
        &format!("Execution completed (with outcome: {label}) in {elapsed:.3} milliseconds"),
        ". Set: ",
        &outbound,
    ));

    outcome
}

fn with_snapshot(message: &str, separator: &str, values: &Fields) -> String {
    match snapshot::render(values) {
        Some(rendered) => format!("{message}{separator}{rendered}"),
        None => message.to_owned(),
    }
}

/// Preprocess, then run the contained steps and sort out how they ended.
fn run_contract<A>(action: &A, contract: &Contract, config: &Config, context: &mut Context) -> Result<(), ActionError>
where
    A: Action + ?Sized,
{
    preprocess(contract, context)?;

    match contained(action, contract, config, context) {
        Ok(()) => Ok(()),
        Err(Halt::Failure(failure)) if failure.invocation() == context.id() => Ok(()),
        Err(Halt::Failure(failure)) => Err(ActionError::Failure(failure)),
        Err(Halt::Error(exception)) => match exception.as_failure() {
            Some(failure) if failure.invocation() != context.id() => Err(ActionError::Failure(failure.clone())),
            Some(_) => Ok(()),
            None => {
                report_exception(contract, config, context, &exception);
                context.attach_exception(exception);
                context.fail(None, None);
                Ok(())
            }
        },
    }
}

fn contained<A>(action: &A, contract: &Contract, config: &Config, context: &mut Context) -> Result<(), Halt>
where
    A: Action + ?Sized,
{
    apply_defaults(contract, Direction::Inbound, context);
    validate(contract, Direction::Inbound, context)?;

    action.run(&mut Execution::new(contract, config, context))?;
    if !context.is_success() {
        return Ok(());
    }

    apply_defaults(contract, Direction::Outbound, context);
    validate(contract, Direction::Outbound, context)?;
    Ok(())
}

fn preprocess(contract: &Contract, context: &mut Context) -> Result<(), ContractViolation> {
    for field in contract.inbound() {
        let Some(preprocessor) = field.preprocessor() else {
            continue;
        };
        let value = preprocessor(context.get(field.name()).clone()).map_err(|err| {
            ContractViolation::Preprocessing {
                field: field.name().to_owned(),
                message: err.to_string(),
            }
        })?;
        context.set(field.name(), value);
    }
    Ok(())
}

/// Fill falsy fields that have a default.
fn apply_defaults(contract: &Contract, direction: Direction, context: &mut Context) {
    for field in contract.fields(direction) {
        let Some(default) = field.default() else {
            continue;
        };
        if axn_validator::is_falsy(context.get(field.name())) {
            context.set(field.name(), default.resolve());
        }
    }
}

fn validate(contract: &Contract, direction: Direction, context: &Context) -> Result<(), ContractViolation> {
    validate_fields(contract.fields(direction).map(Field::rules), |name| context.fields().get(name))
        .map_err(|errors| ContractViolation::validation(direction, errors))
}

/// Hand `exception` and a filtered snapshot to the `on_exception` hook.
///
/// Hook errors are logged and dropped.
pub(crate) fn report_exception(contract: &Contract, config: &Config, context: &Context, exception: &Exception) {
    let Some(hook) = config.on_exception() else {
        return;
    };
    let fields = snapshot::filtered(contract, None, context.fields());
    if let Err(err) = hook(exception, &fields) {
        ContractLog::new(contract.name(), config).warn(&format!("Ignoring error in on_exception hook: {err}"));
    }
}
