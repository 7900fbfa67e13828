use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CompilationError;

pub(crate) const PLACEHOLDER: &str = "%s";

pub(crate) const MISSING: &str = "Value must be set.";
pub(crate) const PATTERN: &str = "String must match the regular expression '%s'.";
pub(crate) const MIN_INCLUSIVE: &str = "Number must be greater than or equal to %s.";
pub(crate) const MIN_EXCLUSIVE: &str = "Number must be greater than %s.";
pub(crate) const MAX_INCLUSIVE: &str = "Number must be less than or equal to %s.";
pub(crate) const MAX_EXCLUSIVE: &str = "Number must be less than %s.";
pub(crate) const DIGITS: &str =
    "Number value is out of bounds, expected: <%s max digits>.<%s max digits>.";
pub(crate) const IN_FUTURE: &str = "Timestamp value must be in the future.";
pub(crate) const IN_PAST: &str = "Timestamp value must be in the past.";
pub(crate) const INVALID_MESSAGE: &str = "Message must have valid properties.";
pub(crate) const INVALID_ELEMENTS: &str = "Collection must have valid elements.";
pub(crate) const DUPLICATE: &str =
    "Collection must not contain duplicates, but %s occurs more than once.";
pub(crate) const SET_ONCE: &str = "Field '%s' is set once and cannot be changed.";
pub(crate) const ENTITY_ID_CATEGORY: &str =
    "Entity ID field '%s' must be a message, string, integer or long.";
pub(crate) const ONEOF_REQUIRED: &str = "One of the fields in the '%s' group must be set.";

/// Rejects a custom message that replaces a param-less `template` but has
/// placeholders of its own, which could never be filled.
pub(crate) fn check_custom(
    custom: Option<&str>,
    template: &'static str,
    owner: &str,
) -> Result<(), CompilationError> {
    match custom {
        Some(custom) if custom.contains(PLACEHOLDER) && !template.contains(PLACEHOLDER) => {
            Err(CompilationError::new(format!(
                "{owner}: custom message `{custom}` has a `{PLACEHOLDER}` placeholder, \
                 but `{template}` takes no params"
            )))
        }
        _ => Ok(()),
    }
}

/// A single failed constraint.
///
/// `msg_format` is a template with `%s` placeholders filled, in order, from
/// `params`. The two always agree: `params` is non-empty exactly when
/// `msg_format` contains a placeholder. `children` holds the violations of a
/// nested message or of the elements of a collection, with field paths
/// relative to that nested value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ConstraintViolation {
    msg_format: String,
    params: Vec<String>,
    field_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ConstraintViolation>,
}

impl ConstraintViolation {
    pub(crate) fn new(
        msg_format: impl Into<String>,
        params: Vec<String>,
        field_path: Vec<String>,
    ) -> Self {
        Self {
            msg_format: msg_format.into(),
            params,
            field_path,
            children: Vec::new(),
        }
    }

    /// Build a violation from a default template, or from a custom message
    /// declared on the field.
    ///
    /// A custom message replaces the template verbatim. It keeps the default
    /// params only when it has placeholders of its own.
    pub(crate) fn from_template(
        custom: Option<&str>,
        template: &'static str,
        params: Vec<String>,
        field_path: Vec<String>,
    ) -> Self {
        match custom.filter(|c| !c.is_empty()) {
            Some(custom) if custom.contains(PLACEHOLDER) => Self::new(custom, params, field_path),
            Some(custom) => Self::new(custom, Vec::new(), field_path),
            None => Self::new(template, params, field_path),
        }
    }

    pub(crate) fn with_children(mut self, children: Vec<ConstraintViolation>) -> Self {
        self.children = children;
        self
    }

    /// The message template.
    #[must_use]
    pub fn msg_format(&self) -> &str {
        &self.msg_format
    }

    /// Values substituted into the template placeholders, in order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Field names from the validated message root to the offending field.
    #[must_use]
    pub fn field_path(&self) -> &[String] {
        &self.field_path
    }

    /// Violations of the nested message or collection elements.
    #[must_use]
    pub fn children(&self) -> &[ConstraintViolation] {
        &self.children
    }

    /// Renders the message by substituting `params` into the `%s`
    /// placeholders of `msg_format`, left to right.
    ///
    /// Placeholders without a matching param are kept as-is.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.msg_format.len());
        let mut params = self.params.iter();
        let mut rest = self.msg_format.as_str();
        while let Some(pos) = rest.find(PLACEHOLDER) {
            out.push_str(&rest[..pos]);
            match params.next() {
                Some(param) => out.push_str(param),
                None => out.push_str(PLACEHOLDER),
            }
            rest = &rest[pos + PLACEHOLDER.len()..];
        }
        out.push_str(rest);
        out
    }

    /// Convert to the wire-compatible `prost.constraints.ConstraintViolation` message.
    #[must_use]
    pub fn to_proto(&self) -> prost_constraints_types::ConstraintViolation {
        prost_constraints_types::ConstraintViolation {
            msg_format: self.msg_format.clone(),
            param: self.params.clone(),
            field_path: Some(prost_constraints_types::FieldPath {
                field_name: self.field_path.clone(),
            }),
            violation: self.children.iter().map(Self::to_proto).collect(),
        }
    }

    /// Build from the wire-compatible message.
    #[must_use]
    pub fn from_proto(proto: &prost_constraints_types::ConstraintViolation) -> Self {
        Self {
            msg_format: proto.msg_format.clone(),
            params: proto.param.clone(),
            field_path: proto
                .field_path
                .as_ref()
                .map(|p| p.field_name.clone())
                .unwrap_or_default(),
            children: proto.violation.iter().map(Self::from_proto).collect(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.field_path.is_empty() {
            write!(f, "{}: ", self.field_path.join("."))?;
        }
        f.write_str(&self.render())
    }
}
