//! Where constraint catalogs come from.

use std::collections::HashMap;

use prost_reflect::{FieldDescriptor, MessageDescriptor, OneofDescriptor};

use prost_constraints_types::{
    FieldConstraints, FieldConstraintsExt, MessageConstraints, MessageConstraintsExt,
    OneofConstraints, OneofConstraintsExt,
};

use crate::error::CompilationError;

/// Supplies the constraints declared on schema elements.
///
/// Implementations are consulted once per message type; the compiled result
/// is cached by the validator.
pub trait ConstraintSource: Send + Sync {
    /// Constraints declared on a field.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration cannot be read.
    fn field_constraints(
        &self,
        field: &FieldDescriptor,
    ) -> Result<Option<FieldConstraints>, CompilationError>;

    /// Constraints declared on a message type.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration cannot be read.
    fn message_constraints(
        &self,
        message: &MessageDescriptor,
    ) -> Result<Option<MessageConstraints>, CompilationError>;

    /// Constraints declared on a oneof group.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration cannot be read.
    fn oneof_constraints(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<OneofConstraints>, CompilationError>;
}

/// Reads constraints from the `prost.constraints.*` descriptor options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsSource;

impl ConstraintSource for OptionsSource {
    fn field_constraints(
        &self,
        field: &FieldDescriptor,
    ) -> Result<Option<FieldConstraints>, CompilationError> {
        field.field_constraints().map_err(|err| {
            CompilationError::new(format!(
                "failed to read constraints of {}: {err}",
                field.full_name()
            ))
        })
    }

    fn message_constraints(
        &self,
        message: &MessageDescriptor,
    ) -> Result<Option<MessageConstraints>, CompilationError> {
        message.message_constraints().map_err(|err| {
            CompilationError::new(format!(
                "failed to read constraints of {}: {err}",
                message.full_name()
            ))
        })
    }

    fn oneof_constraints(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<OneofConstraints>, CompilationError> {
        oneof.oneof_constraints().map_err(|err| {
            CompilationError::new(format!(
                "failed to read constraints of {}: {err}",
                oneof.full_name()
            ))
        })
    }
}

/// In-memory constraint catalog keyed by full names.
///
/// Fields are keyed as `package.Message.field`, messages as
/// `package.Message` and oneofs as `package.Message.oneof`. Elements without
/// an entry fall back to their descriptor options.
///
/// ```rust
/// use prost_constraints::Catalog;
/// use prost_constraints::types::{FieldConstraints, PatternConstraint};
///
/// let catalog = Catalog::new().field(
///     "acme.User.email",
///     FieldConstraints {
///         required: Some(true),
///         pattern: Some(PatternConstraint {
///             regex: ".+@.+".to_string(),
///             msg_format: None,
///         }),
///         ..Default::default()
///     },
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    fields: HashMap<String, FieldConstraints>,
    messages: HashMap<String, MessageConstraints>,
    oneofs: HashMap<String, OneofConstraints>,
}

impl Catalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare constraints for the field with the given full name.
    #[must_use]
    pub fn field(mut self, full_name: impl Into<String>, constraints: FieldConstraints) -> Self {
        self.fields.insert(full_name.into(), constraints);
        self
    }

    /// Declare constraints for the message type with the given full name.
    #[must_use]
    pub fn message(
        mut self,
        full_name: impl Into<String>,
        constraints: MessageConstraints,
    ) -> Self {
        self.messages.insert(full_name.into(), constraints);
        self
    }

    /// Declare constraints for the oneof with the given full name.
    #[must_use]
    pub fn oneof(mut self, full_name: impl Into<String>, constraints: OneofConstraints) -> Self {
        self.oneofs.insert(full_name.into(), constraints);
        self
    }
}

impl ConstraintSource for Catalog {
    fn field_constraints(
        &self,
        field: &FieldDescriptor,
    ) -> Result<Option<FieldConstraints>, CompilationError> {
        match self.fields.get(field.full_name()) {
            Some(constraints) => Ok(Some(constraints.clone())),
            None => OptionsSource.field_constraints(field),
        }
    }

    fn message_constraints(
        &self,
        message: &MessageDescriptor,
    ) -> Result<Option<MessageConstraints>, CompilationError> {
        match self.messages.get(message.full_name()) {
            Some(constraints) => Ok(Some(constraints.clone())),
            None => OptionsSource.message_constraints(message),
        }
    }

    fn oneof_constraints(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<OneofConstraints>, CompilationError> {
        match self.oneofs.get(oneof.full_name()) {
            Some(constraints) => Ok(Some(constraints.clone())),
            None => OptionsSource.oneof_constraints(oneof),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing;

    #[test]
    fn catalog_entries_are_found_by_full_name() {
        let catalog = Catalog::new()
            .field(
                "test.Email.email",
                FieldConstraints {
                    required: Some(true),
                    ..Default::default()
                },
            )
            .message("test.Entity", MessageConstraints { entity: Some(true) })
            .oneof(
                "test.Choice.kind",
                OneofConstraints {
                    required: Some(true),
                },
            );

        let email = testing::message("test.Email")
            .get_field_by_name("email")
            .expect("field exists");
        assert_eq!(
            catalog
                .field_constraints(&email)
                .expect("catalog reads")
                .and_then(|c| c.required),
            Some(true)
        );

        let entity = testing::message("test.Entity");
        assert_eq!(
            catalog
                .message_constraints(&entity)
                .expect("catalog reads")
                .and_then(|c| c.entity),
            Some(true)
        );

        let kind = testing::message("test.Choice")
            .oneofs()
            .next()
            .expect("oneof exists");
        assert_eq!(
            catalog
                .oneof_constraints(&kind)
                .expect("catalog reads")
                .and_then(|c| c.required),
            Some(true)
        );
    }

    #[test]
    fn missing_entries_fall_back_to_options() {
        let outer = testing::message("test.Outer");
        let label = outer.get_field_by_name("label").expect("field exists");
        assert_eq!(Catalog::new().field_constraints(&label).expect("catalog reads"), None);
        assert_eq!(Catalog::new().message_constraints(&outer).expect("catalog reads"), None);
    }
}
