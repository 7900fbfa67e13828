use std::sync::{Arc, LazyLock};

use prost_reflect::{DynamicMessage, FieldDescriptor, MessageDescriptor, ReflectMessage};
use tracing::trace;

use crate::catalog::{ConstraintSource, OptionsSource};
use crate::config::{ValidationConfig, ValidationOption, ValidatorOption};
use crate::error::{Error, RuntimeError, ValidationError};
use crate::field::{FieldContext, FieldValue, FieldValueChange};
use crate::registry::ValidationRules;
use crate::violation::ConstraintViolation;

mod builder;
mod evaluator;
mod lookups;
mod rules;

use builder::Builder;
use evaluator::{EvalContext, MessageEvaluator};

/// Thread-safe validator for Protocol Buffer messages.
///
/// Validates messages against the constraints attached to their descriptors.
/// Evaluators are compiled lazily and cached for reuse.
pub struct Validator {
    builder: Builder,
    config: ValidationConfig,
}

impl Validator {
    /// Create a new `Validator` with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&[])
    }

    /// Create a new `Validator` with the given options.
    #[must_use]
    pub fn with_options(options: &[ValidatorOption]) -> Self {
        let mut disable_lazy = false;
        let mut config = ValidationConfig::default();
        let mut source: Arc<dyn ConstraintSource> = Arc::new(OptionsSource);
        let mut rules = ValidationRules::new();
        let mut message_descriptors = Vec::new();

        for opt in options {
            match opt {
                ValidatorOption::DisableLazy => disable_lazy = true,
                ValidatorOption::Clock(clock) => config.clock = Arc::clone(clock),
                ValidatorOption::Constraints(s) => source = Arc::clone(s),
                ValidatorOption::Rules(r) => {
                    for rule in r.iter() {
                        rules.add(rule.clone());
                    }
                }
                ValidatorOption::MessageDescriptors(descriptors) => {
                    message_descriptors.extend(descriptors.iter().cloned());
                }
            }
        }

        let builder = Builder::new(!disable_lazy, source, rules);
        for descriptor in &message_descriptors {
            builder.preload(descriptor);
        }

        Self { builder, config }
    }

    /// Validate a message against its constraints.
    ///
    /// Returns every violation found, in discovery order. An empty list means
    /// the message is valid.
    ///
    /// # Errors
    ///
    /// Returns a compilation error if a constraint or validation rule is
    /// malformed, or a runtime error if an `Any` payload cannot be unpacked.
    pub fn validate<M: ReflectMessage>(&self, msg: &M) -> Result<Vec<ConstraintViolation>, Error> {
        self.validate_with(msg, &[])
    }

    /// Validate a message with per-call validation options.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn validate_with<M: ReflectMessage>(
        &self,
        msg: &M,
        options: &[ValidationOption],
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let dynamic = msg.transcode_to_dynamic();
        let descriptor = dynamic.descriptor();
        self.builder.rules().verify(descriptor.parent_pool())?;

        let eval = self.builder.load_or_build(&descriptor);
        let config = self.config.with_options(options);
        let cx = EvalContext {
            config: &config,
            builder: &self.builder,
        };
        let violations = eval.evaluate_message(&dynamic, &[], &cx)?;
        trace!(
            message = descriptor.full_name(),
            violations = violations.len(),
            "validated message"
        );
        Ok(violations)
    }

    /// Validate a message, turning violations into an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the message violates a constraint,
    /// and the errors of [`Validator::validate`] otherwise.
    pub fn check<M: ReflectMessage>(&self, msg: &M) -> Result<(), Error> {
        let violations = self.validate(msg)?;
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations).into())
        }
    }

    /// Validate the transition of one field from `previous` to `current`.
    ///
    /// `field_path` names the field by dot-separated field names from the
    /// message root, e.g. `"inner.email"`. Set-once constraints are checked
    /// against the previous value, then every other constraint of the field
    /// against the current value.
    ///
    /// # Errors
    ///
    /// Returns a runtime error if the two messages are of different types or
    /// the path does not name a field reachable through singular message
    /// fields, and the errors of [`Validator::validate`] otherwise.
    pub fn validate_change<M: ReflectMessage>(
        &self,
        previous: &M,
        current: &M,
        field_path: &str,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let mut previous = previous.transcode_to_dynamic();
        let mut current = current.transcode_to_dynamic();
        let root = current.descriptor();
        if previous.descriptor().full_name() != root.full_name() {
            return Err(RuntimeError::new(format!(
                "cannot compare `{}` with `{}`",
                previous.descriptor().full_name(),
                root.full_name()
            ))
            .into());
        }
        self.builder.rules().verify(root.parent_pool())?;

        let names: Vec<&str> = field_path.split('.').collect();
        let Some((last, parents)) = names.split_last() else {
            return Err(RuntimeError::new("empty field path").into());
        };
        let mut parent_path = Vec::new();
        for name in parents {
            let field = resolve_field(&current, name, field_path)?;
            let singular = !field.is_list() && !field.is_map();
            let Some(nested) = field.kind().as_message().cloned().filter(|_| singular) else {
                return Err(RuntimeError::new(format!(
                    "`{name}` in `{field_path}` is not a singular message field"
                ))
                .into());
            };
            previous = nested_message(&previous, &field, &nested);
            current = nested_message(&current, &field, &nested);
            parent_path.push((*name).to_string());
        }

        let field = resolve_field(&current, last, field_path)?;
        let context = FieldContext::new(parent_path, field);
        let change = FieldValueChange::new(
            Some(FieldValue::from_message(&previous, context.clone())?),
            Some(FieldValue::from_message(&current, context)?),
        )?;

        let eval = self.builder.load_or_build(&current.descriptor());
        let cx = EvalContext {
            config: &self.config,
            builder: &self.builder,
        };
        let violations = eval.evaluate_field_change(&change, &cx)?;
        trace!(
            field = field_path,
            violations = violations.len(),
            "validated field change"
        );
        Ok(violations)
    }
}

fn resolve_field(
    msg: &DynamicMessage,
    name: &str,
    field_path: &str,
) -> Result<FieldDescriptor, RuntimeError> {
    msg.descriptor().get_field_by_name(name).ok_or_else(|| {
        RuntimeError::new(format!(
            "`{field_path}` does not resolve: `{}` has no field `{name}`",
            msg.descriptor().full_name()
        ))
    })
}

/// The message held by a singular message field, or its default when unset.
fn nested_message(
    msg: &DynamicMessage,
    field: &FieldDescriptor,
    descriptor: &MessageDescriptor,
) -> DynamicMessage {
    match msg.get_field(field).as_message() {
        Some(nested) => nested.clone(),
        None => DynamicMessage::new(descriptor.clone()),
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_VALIDATOR: LazyLock<Validator> = LazyLock::new(Validator::new);

/// Validate a message using a global `Validator` instance.
///
/// This is a convenience function that uses a shared, lazily-initialized
/// validator reading constraints from descriptor options. For custom options,
/// construct a [`Validator`] instead.
///
/// # Errors
///
/// See [`Validator::validate`].
pub fn validate<M: ReflectMessage>(msg: &M) -> Result<Vec<ConstraintViolation>, Error> {
    GLOBAL_VALIDATOR.validate(msg)
}
