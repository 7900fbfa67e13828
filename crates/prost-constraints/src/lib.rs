//! Runtime constraint validation for Protocol Buffer messages.
//!
//! Constraints are declared per field, message and oneof, either as
//! `prost.constraints.*` descriptor options or in an in-memory [`Catalog`].
//! The validator walks a `prost-reflect` message against them and reports
//! every violation as a [`ConstraintViolation`] tree: failures inside nested
//! messages and collection elements are attached as children of the field
//! that holds them.
//!
//! # Quick start
//!
//! For one-off validation, use the [`validate`] convenience function:
//!
//! ```rust,no_run
//! use prost_constraints::validate;
//! # fn example(msg: impl prost_reflect::ReflectMessage) {
//! match validate(&msg) {
//!     Ok(violations) if violations.is_empty() => { /* message is valid */ }
//!     Ok(violations) => {
//!         for v in &violations {
//!             eprintln!("{v}");
//!         }
//!     }
//!     Err(e) => eprintln!("validation could not run: {e}"),
//! }
//! # }
//! ```
//!
//! For repeated validations, construct a [`Validator`] once to cache compiled
//! constraints across calls:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prost_constraints::types::{FieldConstraints, PatternConstraint};
//! use prost_constraints::{Catalog, Validator, ValidatorOption};
//! # fn example(msg: impl prost_reflect::ReflectMessage) {
//! let catalog = Catalog::new().field(
//!     "acme.User.email",
//!     FieldConstraints {
//!         pattern: Some(PatternConstraint {
//!             regex: ".+@.+".to_string(),
//!             msg_format: None,
//!         }),
//!         ..Default::default()
//!     },
//! );
//! let validator = Validator::with_options(&[ValidatorOption::Constraints(Arc::new(catalog))]);
//! validator.check(&msg).expect("message should be valid");
//! # }
//! ```
//!
//! # Error types
//!
//! | Type | When |
//! |------|------|
//! | [`ValidationError`] | [`Validator::check`] found one or more violations |
//! | [`CompilationError`] | A constraint declaration or validation rule is malformed |
//! | [`RuntimeError`] | The call itself is invalid, or an `Any` payload cannot be read |
//!
//! All three are unified under [`Error`].
//!
//! # Re-exported types
//!
//! The [`types`] module re-exports [`prost-constraints-types`](https://crates.io/crates/prost-constraints-types)
//! so consumers do not need to depend on it directly.

#![warn(missing_docs)]

mod catalog;
mod config;
mod error;
mod field;
mod registry;
mod validator;
mod violation;

#[cfg(test)]
mod testing;

/// Re-export of [`prost-constraints-types`](https://crates.io/crates/prost-constraints-types)
/// for the catalog message types and the constraints descriptor pool.
pub use prost_constraints_types as types;

pub use catalog::{Catalog, ConstraintSource, OptionsSource};
pub use config::{Clock, FixedClock, SystemClock, ValidationOption, ValidatorOption};
pub use error::{CompilationError, Error, RuntimeError, ValidationError};
pub use field::{Cardinality, FieldCategory, FieldContext, FieldValue, FieldValueChange};
pub use registry::{ValidationRule, ValidationRules};
pub use validator::{Validator, validate};
pub use violation::ConstraintViolation;
