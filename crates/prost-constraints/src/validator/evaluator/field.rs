use prost_reflect::{DynamicMessage, FieldDescriptor};

use crate::error::Error;
use crate::field::{FieldValue, FieldValueChange};
use crate::violation::{self, ConstraintViolation};

use super::{EvalContext, Evaluator};

/// Entity-id policy applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum EntityId {
    /// Not the id field of an entity.
    #[default]
    None,
    /// The id field, of a category that can identify an entity.
    Permitted,
    /// The id field, of a category that cannot identify an entity.
    Forbidden,
}

/// Evaluator for a single message field.
/// Handles required, set-once and entity-id checks, and delegates to the
/// value evaluator for everything else.
pub(crate) struct FieldEval {
    pub descriptor: FieldDescriptor,
    /// Checks run on a non-default value.
    pub value: Box<dyn Evaluator>,
    /// Whether the field must hold a non-default value.
    pub required: bool,
    /// Replaces the default "missing value" text.
    pub missing_msg: Option<String>,
    /// Whether a non-default value must not change.
    pub set_once: bool,
    pub entity_id: EntityId,
    /// Whether the field is a member of a (non-synthetic) oneof.
    pub oneof_member: bool,
}

impl FieldEval {
    pub fn tautology(&self) -> bool {
        !self.required
            && !self.set_once
            && self.entity_id != EntityId::Forbidden
            && self.value.tautology()
    }

    /// Oneof members other than the one that is set are skipped entirely.
    pub fn is_inactive_member(&self, msg: &DynamicMessage) -> bool {
        self.oneof_member && !msg.has_field(&self.descriptor)
    }

    pub fn evaluate(
        &self,
        value: &FieldValue,
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let field_path = value.context().field_path();
        let mut violations = Vec::new();

        if self.entity_id == EntityId::Forbidden {
            violations.push(ConstraintViolation::new(
                violation::ENTITY_ID_CATEGORY,
                vec![self.descriptor.name().to_string()],
                field_path.clone(),
            ));
        }

        if value.is_default() {
            if self.required {
                violations.push(ConstraintViolation::from_template(
                    self.missing_msg.as_deref(),
                    violation::MISSING,
                    Vec::new(),
                    field_path,
                ));
            }
            return Ok(violations);
        }

        violations.extend(self.value.evaluate(value.value(), &field_path, cx)?);
        Ok(violations)
    }

    /// Set-once check on the change followed by the regular checks of the
    /// current value.
    pub fn evaluate_change(
        &self,
        change: &FieldValueChange,
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let mut violations = Vec::new();
        if self.set_once && !change.previous().is_default() && change.is_changed() {
            violations.push(ConstraintViolation::new(
                violation::SET_ONCE,
                vec![self.descriptor.name().to_string()],
                change.context().field_path(),
            ));
        }
        violations.extend(self.evaluate(change.current(), cx)?);
        Ok(violations)
    }
}
