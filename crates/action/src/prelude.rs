//! Convenience re-exports for action authors.
//!
//! ```rust
//! use axn::prelude::*;
//! ```

pub use crate::action::{Action, ActionExt, from_fn};
pub use crate::context::Fields;
pub use crate::contract::Contract;
pub use crate::error::{ActionError, ConfigurationError, ContractViolation, Halt};
pub use crate::execution::Execution;
pub use crate::field::{Direction, Field};
pub use crate::fields;
pub use crate::messages::{MessageTemplate, Messages};
pub use crate::organizer::Organizer;
pub use crate::result::{ActionResult, Outcome};

pub use axn_validator::{Length, Numericality, ValueType};
