use std::fmt;

use crate::violation::ConstraintViolation;

/// Top-level error type returned by validation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// One or more constraints were violated.
    ///
    /// Only produced by [`Validator::check`](crate::Validator::check); the
    /// `validate` family returns violations as plain values.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A constraint declaration or validation rule could not be compiled.
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// The validator was invoked incorrectly or a payload could not be read.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Returned by [`Validator::check`](crate::Validator::check) when the message
/// violates one or more constraints.
#[derive(Debug)]
pub struct ValidationError {
    /// The violations found, in discovery order.
    pub violations: Vec<ConstraintViolation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.len() {
            0 => Ok(()),
            1 => write!(f, "validation error: {}", self.violations[0]),
            _ => {
                write!(f, "validation errors:")?;
                for v in &self.violations {
                    write!(f, "\n - {v}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub(crate) fn new(violations: Vec<ConstraintViolation>) -> Self {
        Self { violations }
    }

    /// Convert to the wire-compatible `prost.constraints.ConstraintViolations` message.
    #[must_use]
    pub fn to_proto(&self) -> prost_constraints_types::ConstraintViolations {
        prost_constraints_types::ConstraintViolations {
            violations: self
                .violations
                .iter()
                .map(ConstraintViolation::to_proto)
                .collect(),
        }
    }
}

/// Returned when a constraint declaration cannot be compiled from its
/// descriptor, or a validation rule does not resolve.
#[derive(Debug, Clone, thiserror::Error)]
#[error("compilation error: {cause}")]
pub struct CompilationError {
    /// Description of why the constraint failed to compile.
    pub cause: String,
}

impl CompilationError {
    pub(crate) fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// Returned when a validation call cannot be carried out.
#[derive(Debug, Clone, thiserror::Error)]
#[error("runtime error: {cause}")]
pub struct RuntimeError {
    /// Description of the failure.
    pub cause: String,
}

impl RuntimeError {
    pub(crate) fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}
