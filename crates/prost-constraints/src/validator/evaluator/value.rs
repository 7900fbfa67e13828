use std::sync::Arc;

use prost_reflect::{FieldDescriptor, Value};

use prost_constraints_types::FieldConstraints;

use crate::error::{CompilationError, Error};
use crate::field::{Cardinality, FieldCategory};
use crate::validator::lookups;
use crate::validator::rules::number::NumberRuleEval;
use crate::validator::rules::string::PatternRuleEval;
use crate::validator::rules::timestamp::TimestampRuleEval;
use crate::violation::{self, ConstraintViolation};

use super::any::AnyEval;
use super::embedded::EmbeddedMessageEval;
use super::message::MessageEval;
use super::{EvalContext, Evaluator};

/// Validator for one value of a field, selected by the field's category.
///
/// Each variant carries only the checks meaningful for its category.
/// Required, set-once and entity-id checks live on the field itself.
pub(crate) enum FieldValidator {
    String(Option<PatternRuleEval>),
    Integer(NumberRuleEval),
    Long(NumberRuleEval),
    Float(NumberRuleEval),
    Double(NumberRuleEval),
    Bool,
    Bytes,
    Enum,
    Message(MessageFieldEval),
    Any(AnyEval),
}

/// Checks of a (non-`Any`) message value.
pub(crate) struct MessageFieldEval {
    pub temporal: Option<TimestampRuleEval>,
    pub embedded: Option<EmbeddedMessageEval>,
}

impl FieldValidator {
    /// Compile the value checks of `field`. `nested` is the evaluator of the
    /// field's message type, present when the field is marked `valid`.
    pub fn new(
        field: &FieldDescriptor,
        constraints: &FieldConstraints,
        nested: Option<Arc<MessageEval>>,
    ) -> Result<Self, CompilationError> {
        let category = FieldCategory::of(field);
        check_applicability(field, category, constraints)?;

        let validator = match category {
            FieldCategory::String => Self::String(
                constraints
                    .pattern
                    .as_ref()
                    .map(PatternRuleEval::new)
                    .transpose()?,
            ),
            FieldCategory::Integer => Self::Integer(NumberRuleEval::new(constraints)?),
            FieldCategory::Long => Self::Long(NumberRuleEval::new(constraints)?),
            FieldCategory::Float => Self::Float(NumberRuleEval::new(constraints)?),
            FieldCategory::Double => Self::Double(NumberRuleEval::new(constraints)?),
            FieldCategory::Bool => Self::Bool,
            FieldCategory::Bytes => Self::Bytes,
            FieldCategory::Enum => Self::Enum,
            FieldCategory::Message => Self::Message(MessageFieldEval {
                temporal: constraints
                    .when
                    .as_ref()
                    .map(TimestampRuleEval::new)
                    .transpose()?,
                embedded: nested.map(|message| EmbeddedMessageEval {
                    message,
                    invalid_msg: constraints.invalid_msg.clone(),
                }),
            }),
            FieldCategory::Any => Self::Any(AnyEval {
                unchecked: constraints.unchecked.unwrap_or(false),
                invalid_msg: constraints.invalid_msg.clone(),
            }),
        };
        Ok(validator)
    }
}

impl Evaluator for FieldValidator {
    fn tautology(&self) -> bool {
        match self {
            Self::String(pattern) => pattern.is_none(),
            Self::Integer(number) | Self::Long(number) | Self::Float(number) | Self::Double(number) => {
                number.tautology()
            }
            Self::Bool | Self::Bytes | Self::Enum => true,
            Self::Message(message) => {
                message.temporal.is_none()
                    && message.embedded.as_ref().is_none_or(Evaluator::tautology)
            }
            Self::Any(any) => any.tautology(),
        }
    }

    fn evaluate(
        &self,
        val: &Value,
        field_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        match self {
            Self::String(pattern) => Ok(pattern
                .iter()
                .filter_map(|p| p.evaluate(val, field_path))
                .collect()),
            Self::Integer(number) | Self::Long(number) | Self::Float(number) | Self::Double(number) => {
                Ok(number.evaluate(val, field_path))
            }
            Self::Bool | Self::Bytes | Self::Enum => Ok(Vec::new()),
            Self::Message(message) => {
                let mut violations = Vec::new();
                if let Some(temporal) = &message.temporal {
                    let now = cx.config.clock.now();
                    violations.extend(temporal.evaluate(val, field_path, &now));
                }
                if let Some(embedded) = &message.embedded {
                    violations.extend(embedded.evaluate(val, field_path, cx)?);
                }
                Ok(violations)
            }
            Self::Any(any) => any.evaluate(val, field_path, cx),
        }
    }
}

/// Reject constraints declared on fields they cannot apply to.
fn check_applicability(
    field: &FieldDescriptor,
    category: FieldCategory,
    constraints: &FieldConstraints,
) -> Result<(), CompilationError> {
    let misplaced = |constraint: &str, expected: &str| {
        Err(CompilationError::new(format!(
            "`{constraint}` on {} requires a {expected} field",
            field.full_name()
        )))
    };

    if constraints.pattern.is_some() && category != FieldCategory::String {
        return misplaced("pattern", "string");
    }
    let numeric = [
        ("min", constraints.min.is_some()),
        ("max", constraints.max.is_some()),
        ("digits", constraints.digits.is_some()),
    ];
    if let Some((name, _)) = numeric.iter().find(|(_, set)| *set) {
        if !category.is_numeric() {
            return misplaced(name, "numeric");
        }
    }
    if constraints.when.is_some() && !lookups::is_timestamp(field) {
        return misplaced("when", "google.protobuf.Timestamp");
    }
    if constraints.valid == Some(true)
        && !matches!(category, FieldCategory::Message | FieldCategory::Any)
    {
        return misplaced("valid", "message");
    }
    if constraints.unchecked == Some(true) && category != FieldCategory::Any {
        return misplaced("unchecked", "google.protobuf.Any");
    }
    if constraints.distinct == Some(true) && Cardinality::of(field) == Cardinality::Singular {
        return misplaced("distinct", "repeated or map");
    }
    violation::check_custom(
        constraints.missing_msg.as_deref(),
        violation::MISSING,
        &format!("`missing_msg` on {}", field.full_name()),
    )?;
    violation::check_custom(
        constraints.invalid_msg.as_deref(),
        violation::INVALID_MESSAGE,
        &format!("`invalid_msg` on {}", field.full_name()),
    )
}
