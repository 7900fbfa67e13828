use std::sync::Arc;

use prost_reflect::Value;

use crate::error::Error;
use crate::violation::{self, ConstraintViolation};

use super::message::MessageEval;
use super::{EvalContext, Evaluator, MessageEvaluator};

/// Evaluator for an embedded (nested) message field.
/// Delegates validation to the nested message's evaluator.
pub(crate) struct EmbeddedMessageEval {
    /// The evaluator for the nested message type.
    pub message: Arc<MessageEval>,
    /// Replaces the default "invalid message" text.
    pub invalid_msg: Option<String>,
}

impl Evaluator for EmbeddedMessageEval {
    fn tautology(&self) -> bool {
        self.message.tautology()
    }

    fn evaluate(
        &self,
        val: &Value,
        field_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let Some(nested_msg) = val.as_message() else {
            return Ok(Vec::new());
        };

        let children = self.message.evaluate_message(nested_msg, &[], cx)?;
        Ok(wrap_nested(self.invalid_msg.as_deref(), field_path, children))
    }
}

/// Package the violations of a nested message as the children of one
/// violation on the enclosing field.
pub(crate) fn wrap_nested(
    invalid_msg: Option<&str>,
    field_path: &[String],
    children: Vec<ConstraintViolation>,
) -> Vec<ConstraintViolation> {
    if children.is_empty() {
        return Vec::new();
    }
    vec![
        ConstraintViolation::from_template(
            invalid_msg,
            violation::INVALID_MESSAGE,
            Vec::new(),
            field_path.to_vec(),
        )
        .with_children(children),
    ]
}
