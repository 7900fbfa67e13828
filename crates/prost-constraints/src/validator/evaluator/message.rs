use std::sync::{PoisonError, RwLock};

use prost_reflect::DynamicMessage;

use crate::error::{CompilationError, Error};
use crate::field::{FieldContext, FieldValue, FieldValueChange};
use crate::violation::ConstraintViolation;

use super::field::FieldEval;
use super::oneof::OneofEval;
use super::{EvalContext, MessageEvaluator};

#[derive(Default)]
struct MessageEvalState {
    err: Option<CompilationError>,
    oneofs: Vec<OneofEval>,
    fields: Vec<FieldEval>,
}

/// Compiled constraints of one message type.
///
/// Created empty and filled in by the builder, so recursive types can refer
/// to their own evaluator before it is complete.
pub(crate) struct MessageEval {
    state: RwLock<MessageEvalState>,
}

impl MessageEval {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MessageEvalState::default()),
        }
    }

    pub fn set_err(&self, err: CompilationError) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.err = Some(err);
    }

    pub fn compilation_error(&self) -> Option<CompilationError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.err.clone()
    }

    pub fn append_oneof(&self, eval: OneofEval) {
        if !eval.tautology() {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.oneofs.push(eval);
        }
    }

    pub fn append_field(&self, eval: FieldEval) {
        if !eval.tautology() {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.fields.push(eval);
        }
    }

    /// Validate a change of one field declared by this message type.
    pub fn evaluate_field_change(
        &self,
        change: &FieldValueChange,
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = &state.err {
            return Err(err.clone().into());
        }
        let number = change.context().field_number();
        match state.fields.iter().find(|f| f.descriptor.number() == number) {
            Some(field) => field.evaluate_change(change, cx),
            None => Ok(Vec::new()),
        }
    }
}

impl MessageEvaluator for MessageEval {
    fn tautology(&self) -> bool {
        // Always false to avoid recursion-induced tautology short-circuits.
        false
    }

    fn evaluate_message(
        &self,
        msg: &DynamicMessage,
        parent_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = &state.err {
            return Err(err.clone().into());
        }

        let mut violations = Vec::new();
        for oneof in &state.oneofs {
            violations.extend(oneof.evaluate_message(msg, parent_path, cx)?);
        }
        for field in &state.fields {
            if field.is_inactive_member(msg) {
                continue;
            }
            let context = FieldContext::new(parent_path.to_vec(), field.descriptor.clone());
            let value = FieldValue::from_message(msg, context)?;
            violations.extend(field.evaluate(&value, cx)?);
        }
        Ok(violations)
    }
}
