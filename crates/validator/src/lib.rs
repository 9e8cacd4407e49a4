//! # axn-validator
//!
//! Declared-field validation for axn action contracts.
//!
//! A contract declares, per field, an ordered list of [`Rule`]s. Validation
//! runs every field in declaration order, collects every violation and
//! renders them as one sentence of full messages:
//!
//! ```rust
//! use axn_validator::prelude::*;
//! use serde_json::json;
//!
//! let rules = [
//!     FieldRules::new("foo")
//!         .rule(Rule::Type([ValueType::Numeric].into_iter().collect()))
//!         .rule(Rule::Numericality(Numericality::new().greater_than(10))),
//!     FieldRules::new("bar").rule(Rule::Type([ValueType::String].into_iter().collect())),
//! ];
//! let input = json!({"foo": 9, "bar": 1});
//!
//! let errors = validate_fields(&rules, |f| input.get(f)).unwrap_err();
//! assert_eq!(errors.to_string(), "Foo must be greater than 10 and Bar is not a String");
//! ```
//!
//! ## Rule kinds
//!
//! - **Presence**: implicit unless the field allows blank or is boolean
//! - **Type**: [`ValueType`] membership (`is not a X` / `is not one of X, Y`)
//! - **Boolean**: literal `true`/`false`
//! - **Numericality**: [`Numericality`] comparisons
//! - **Inclusion / Exclusion**: set membership
//! - **Length**: [`Length`] bounds
//! - **Format**: regular expression
//! - **Custom**: closure returning an optional message

pub mod error;
mod humanize;
pub mod numeric;
pub mod prelude;
pub mod rule;
mod validate;
pub mod value;

pub use error::{ValidationError, ValidationErrors};
pub use humanize::{humanize, to_sentence};
pub use numeric::{Length, Numericality};
pub use rule::{BoxError, CustomCheck, DeclaredRule, FieldRules, Rule};
pub use validate::validate_fields;
pub use value::{ValueType, is_blank, is_falsy};
