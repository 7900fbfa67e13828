pub(crate) mod any;
pub(crate) mod embedded;
pub(crate) mod field;
pub(crate) mod list;
pub(crate) mod map;
pub(crate) mod message;
pub(crate) mod oneof;
pub(crate) mod value;

use prost_reflect::{DynamicMessage, Value};

use crate::config::ValidationConfig;
use crate::error::Error;
use crate::violation::ConstraintViolation;

use super::builder::Builder;

/// State shared by every evaluator during one validation call.
pub(crate) struct EvalContext<'a> {
    pub config: &'a ValidationConfig,
    /// Resolves evaluators for message types only known at runtime (`Any` payloads).
    pub builder: &'a Builder,
}

/// Evaluator for a field's value: a single value, a list or a map.
pub(crate) trait Evaluator: Send + Sync {
    /// Returns true if this evaluator always succeeds (no-op).
    fn tautology(&self) -> bool;

    /// Evaluate a non-default value of the field at `field_path`.
    fn evaluate(
        &self,
        val: &Value,
        field_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error>;
}

/// Evaluator specialized for message validation.
pub(crate) trait MessageEvaluator: Send + Sync {
    /// Returns true if this evaluator always succeeds.
    fn tautology(&self) -> bool;

    /// Evaluate a message whose fields sit under `parent_path`.
    fn evaluate_message(
        &self,
        msg: &DynamicMessage,
        parent_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error>;
}
