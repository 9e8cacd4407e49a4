//! Error taxonomy for action declaration and invocation.
//!
//! | type | raised when | absorbed by `call`? |
//! |---|---|---|
//! | [`ConfigurationError`] | declaring a contract | n/a (build time) |
//! | [`ContractViolation`] | a declared-field rule is broken | preprocessing: no; others: yes |
//! | [`Failure`] | the logic body calls `fail_with` | own: yes; foreign: no |
//! | [`Exception`] | anything else escapes the logic body | yes |
//!
//! [`Halt`] is what the logic body returns to stop early; [`ActionError`] is
//! what `call`/`call_strict` return to their caller.

use std::any::{Any, type_name};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axn_validator::{BoxError, ValidationErrors};

use crate::context::InvocationId;
use crate::field::Direction;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// A mistake in a contract declaration, reported when the contract is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// A field name was declared twice in one direction.
    #[error("Duplicate field declared in {contract}: '{field}' is already {direction}")]
    DuplicateField {
        /// Contract being declared.
        contract: String,
        /// Direction the name was already declared in.
        direction: Direction,
        /// The duplicated name.
        field: String,
    },

    /// An option was used where it is not supported.
    #[error("{0}")]
    InvalidDsl(String),

    /// A job names an action nobody registered.
    #[error("No action registered under '{action}'")]
    UnknownAction {
        /// Name carried by the job.
        action: String,
    },
}

impl ConfigurationError {
    /// Create an invalid-DSL error.
    pub fn invalid_dsl(msg: impl Into<String>) -> Self {
        Self::InvalidDsl(msg.into())
    }
}

// ============================================================================
// CONTRACT VIOLATIONS
// ============================================================================

/// A declared-field contract was broken during an invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ContractViolation {
    /// A facade was asked for a field outside its declared set.
    #[error(
        "Field '{field}' is not available on {facade}: {contract} may be missing a line like `{declaration} {field}`"
    )]
    MethodNotAllowed {
        /// Facade that refused the read (`InboundFacade` or `ActionResult`).
        facade: &'static str,
        /// Requested field.
        field: String,
        /// Declaration that would allow the read (`expects` or `exposes`).
        declaration: &'static str,
        /// Contract name.
        contract: String,
    },

    /// The logic body exposed a field that was never declared outbound.
    #[error("Attempted to expose unknown key '{field}': be sure to declare it with `exposes {field}`")]
    InvalidExposure {
        /// The undeclared field.
        field: String,
    },

    /// A preprocessor returned an error.
    #[error("Error preprocessing field '{field}': {message}")]
    Preprocessing {
        /// Field whose preprocessor failed.
        field: String,
        /// The preprocessor's error message.
        message: String,
    },

    /// A declared field could not be read as the requested type.
    #[error("Field '{field}' could not be read as {expected}: {message}")]
    UnreadableField {
        /// Field being read.
        field: String,
        /// Requested Rust type.
        expected: &'static str,
        /// Deserialization error.
        message: String,
    },

    /// Inbound fields failed validation.
    #[error("{0}")]
    InboundValidation(ValidationErrors),

    /// Outbound fields failed validation.
    #[error("{0}")]
    OutboundValidation(ValidationErrors),
}

impl ContractViolation {
    pub(crate) fn not_allowed(direction: Direction, field: &str, contract: &str) -> Self {
        Self::MethodNotAllowed {
            facade: direction.facade(),
            field: field.to_owned(),
            declaration: direction.declaration(),
            contract: contract.to_owned(),
        }
    }

    pub(crate) fn validation(direction: Direction, errors: ValidationErrors) -> Self {
        match direction {
            Direction::Inbound => Self::InboundValidation(errors),
            Direction::Outbound => Self::OutboundValidation(errors),
        }
    }

    /// Validation errors carried by a validation violation.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::InboundValidation(errors) | Self::OutboundValidation(errors) => Some(errors),
            _ => None,
        }
    }
}

// ============================================================================
// FAILURE
// ============================================================================

/// A controlled failure raised by [`fail_with`](crate::Execution::fail_with).
///
/// Carries the id of the invocation that raised it so the run wrapper can
/// tell its own failures from ones propagated out of nested invocations.
/// Intentionally not a [`std::error::Error`]: converting one into a
/// [`Halt`] keeps it a failure rather than an exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    invocation: InvocationId,
    message: Option<String>,
}

impl Failure {
    pub(crate) fn new(invocation: InvocationId, message: Option<String>) -> Self {
        Self {
            invocation,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Invocation that raised the failure.
    pub fn invocation(&self) -> InvocationId {
        self.invocation
    }

    /// Failure message, or a generic one when none was given.
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or("Execution was intentionally stopped")
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ============================================================================
// EXCEPTION
// ============================================================================

/// An uncontrolled error captured by the pipeline.
///
/// Cheap to clone. Keeps the concrete type so callers can
/// [`downcast_ref`](Self::downcast_ref) back to the original error.
#[derive(Clone)]
pub struct Exception {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
    type_name: &'static str,
}

impl Exception {
    /// Wrap an error.
    ///
    /// Wrapping an `Exception`, or an [`ActionError::Exception`] coming out of
    /// a nested `call_strict`, yields the original exception rather than a
    /// second layer.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let any: &dyn Any = &error;
        if let Some(existing) = any.downcast_ref::<Self>() {
            return existing.clone();
        }
        if let Some(ActionError::Exception(inner)) = any.downcast_ref::<ActionError>() {
            return inner.clone();
        }
        Self {
            inner: Arc::new(error),
            type_name: type_name::<E>(),
        }
    }

    /// Wrap a boxed error, such as one returned by a user closure.
    pub fn from_boxed(error: BoxError) -> Self {
        Self {
            inner: Arc::from(error),
            type_name: "dyn Error",
        }
    }

    /// Fully qualified type name of the wrapped error.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without module path or generics.
    pub fn short_type_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// The wrapped error.
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Downcast to the original error type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.as_ref().downcast_ref::<E>()
    }

    /// Whether the wrapped error is an `E`.
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.inner.as_ref().is::<E>()
    }

    /// Errors in the `source()` chain below the wrapped error.
    pub fn sources(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(self.inner.source(), |&err| err.source())
    }

    /// The wrapped error followed by its `source()` chain.
    pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        let top: &(dyn StdError + 'static) = self.inner.as_ref();
        std::iter::once(top).chain(self.sources())
    }

    /// A [`Failure`] propagated out of a nested `call_strict`, if that is
    /// what this exception wraps.
    pub(crate) fn as_failure(&self) -> Option<&Failure> {
        match self.downcast_ref::<ActionError>() {
            Some(ActionError::Failure(failure)) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exception")
            .field("type", &self.type_name)
            .field("error", &self.inner)
            .finish()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Exception {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

// ============================================================================
// HALT
// ============================================================================

/// Why a logic body stopped early.
///
/// Any `std::error::Error` converts into `Halt::Error` with `?`;
/// [`fail_with`](crate::Execution::fail_with) produces `Halt::Failure`.
#[derive(Debug, Clone)]
pub enum Halt {
    /// Controlled failure.
    Failure(Failure),
    /// Uncontrolled error.
    Error(Exception),
}

impl Halt {
    /// Returns `true` for a controlled failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl<E> From<E> for Halt
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::Error(Exception::new(error))
    }
}

impl From<Failure> for Halt {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

// ============================================================================
// ACTION ERROR
// ============================================================================

/// Error returned by [`call`](crate::ActionExt::call) and
/// [`call_strict`](crate::ActionExt::call_strict).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ActionError {
    /// The contract declaration is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A contract violation that is never absorbed into a result.
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    /// A controlled failure: foreign to `call`, any failure for `call_strict`.
    #[error("{0}")]
    Failure(Failure),

    /// The original exception, re-raised by `call_strict`.
    #[error(transparent)]
    Exception(Exception),
}

impl ActionError {
    /// Returns `true` for a controlled failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The controlled failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// The captured exception, if any.
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            Self::Exception(exception) => Some(exception),
            _ => None,
        }
    }

    /// Downcast a re-raised exception to its original type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.exception().and_then(Exception::downcast_ref)
    }
}

impl From<Exception> for ActionError {
    fn from(exception: Exception) -> Self {
        Self::Exception(exception)
    }
}
