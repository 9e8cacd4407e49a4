//! Prelude module for convenient imports.
//!
//! ```rust
//! use axn_validator::prelude::*;
//! ```

pub use crate::error::{ValidationError, ValidationErrors};
pub use crate::numeric::{Length, Numericality};
pub use crate::rule::{FieldRules, Rule};
pub use crate::validate::validate_fields;
pub use crate::value::{ValueType, is_blank, is_falsy};
