//! # axn
//!
//! Contract-wrapped business actions.
//!
//! An action declares the fields it expects and the fields it exposes, and
//! every invocation runs through the same pipeline: preprocessing, defaults,
//! inbound validation, the logic body, outbound defaults and outbound
//! validation. Callers get back an [`ActionResult`] that is either ok or
//! failed, with a resolved user-facing message either way; uncaught errors
//! are captured rather than propagated.
//!
//! ## Core Types
//!
//! - [`Contract`] / [`Field`]: the declared shape of an action
//! - [`Action`]: contract plus logic body; [`ActionExt`] adds `call`,
//!   `call_strict` and `enqueue`
//! - [`Execution`]: the logic body's restricted view of one invocation
//! - [`ActionResult`]: the caller's restricted view of the outcome
//! - [`Messages`] / [`Rescue`]: success and error message templates
//! - [`Config`]: logger, exception hook and around hook
//! - [`Organizer`]: runs actions in sequence over shared fields
//!
//! ## Quick Start
//!
//! ```rust
//! use axn::{ActionExt, Contract, Field, Messages, Numericality, ValueType, fields, from_fn};
//!
//! let contract = Contract::builder("Charge")
//!     .expects(
//!         Field::new("amount")
//!             .type_of(ValueType::Numeric)
//!             .numericality(Numericality::new().greater_than(10)),
//!     )?
//!     .exposes(Field::new("receipt"))?
//!     .messages(Messages::new().success("Charged").error("Could not charge"))
//!     .build();
//!
//! let charge = from_fn(contract, |ctx| {
//!     let amount: f64 = ctx.get_as("amount")?;
//!     ctx.expose("receipt", format!("paid {amount}"))?;
//!     Ok(())
//! });
//!
//! let ok = charge.call(fields! { "amount": 20 })?;
//! assert_eq!(ok.message(), "Charged");
//!
//! let failed = charge.call(fields! { "amount": 9 })?;
//! assert_eq!(failed.error().as_deref(), Some("Could not charge"));
//! assert_eq!(
//!     failed.exception().map(ToString::to_string).as_deref(),
//!     Some("Amount must be greater than 10")
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Action trait, entry points and closure-backed actions.
pub mod action;
/// Global and per-contract runtime configuration.
pub mod config;
/// Per-invocation state.
pub mod context;
/// Contract declaration.
pub mod contract;
/// Background job port.
pub mod enqueue;
/// Error types for declaration and invocation.
pub mod error;
/// The logic body's handle on an invocation.
pub mod execution;
/// Restricted field views.
pub mod facade;
/// Field declarations.
pub mod field;
mod logging;
/// Message templates and rescues.
pub mod messages;
/// Sequential composition.
pub mod organizer;
mod pipeline;
/// Convenience re-exports for action authors.
pub mod prelude;
/// Logger port.
pub mod provider;
/// Action registry for replaying jobs.
pub mod registry;
/// Invocation results.
pub mod result;
/// Filtered field snapshots.
pub mod snapshot;

// ── Public re-exports ───────────────────────────────────────────────────────

pub use action::{Action, ActionExt, FnAction, from_fn};
pub use config::{AroundHook, Config, DEBUG_TARGETS_ENV, ExceptionHook, config, configure};
pub use context::{Context, Fields, InvocationId};
pub use contract::{Contract, ContractBuilder};
pub use enqueue::{Job, JobQueue, MemoryQueue};
pub use error::{ActionError, ConfigurationError, ContractViolation, Exception, Failure, Halt};
pub use execution::Execution;
pub use facade::InboundFacade;
pub use field::{DefaultValue, Direction, Field};
pub use messages::{DEFAULT_ERROR, DEFAULT_SUCCESS, MessageScope, MessageTemplate, Messages, Rescue};
pub use organizer::Organizer;
pub use provider::{CaptureLogger, LogLevel, Logger, TracingLogger};
pub use registry::ActionRegistry;
pub use result::{ActionResult, Outcome};
pub use snapshot::FILTERED;

// Rule types, so contracts can be declared without depending on
// `axn-validator` directly.
pub use axn_validator::{Length, Numericality, ValidationError, ValidationErrors, ValueType};

/// Build a [`Fields`] map from JSON-style `"key": value` pairs.
///
/// ```
/// let fields = axn::fields! { "name": "Ada", "tags": ["x"], "owner": null };
/// assert_eq!(fields.len(), 3);
/// assert!(axn::fields! {}.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($body:tt)+) => {
        $crate::__private::into_fields($crate::__private::json!({ $($body)+ }))
    };
}

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;

    use serde_json::Value;

    use crate::Fields;

    pub fn into_fields(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            _ => Fields::new(),
        }
    }
}
