use prost_reflect::{DynamicMessage, OneofDescriptor};

use crate::error::Error;
use crate::violation::{self, ConstraintViolation};

use super::{EvalContext, MessageEvaluator};

/// Evaluator for a oneof group. Checks that one member is set when
/// `required` is true.
pub(crate) struct OneofEval {
    pub descriptor: OneofDescriptor,
    pub required: bool,
}

impl MessageEvaluator for OneofEval {
    fn tautology(&self) -> bool {
        !self.required
    }

    fn evaluate_message(
        &self,
        msg: &DynamicMessage,
        parent_path: &[String],
        _cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        if !self.required || self.descriptor.fields().any(|field| msg.has_field(&field)) {
            return Ok(Vec::new());
        }

        let mut path = parent_path.to_vec();
        path.push(self.descriptor.name().to_string());
        Ok(vec![ConstraintViolation::new(
            violation::ONEOF_REQUIRED,
            vec![self.descriptor.name().to_string()],
            path,
        )])
    }
}
