//! Field occurrences and their values, as seen by the validators.

use std::collections::HashMap;

use prost_reflect::{
    DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor, ReflectMessage, Value,
};

use crate::error::RuntimeError;

const ANY: &str = "google.protobuf.Any";

/// Category of a field's values, which selects the validator that checks them.
///
/// Repeated and map fields are categorised by their element (map value) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    /// `string`
    String,
    /// 32-bit integers, signed or unsigned.
    Integer,
    /// 64-bit integers, signed or unsigned.
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `bool`
    Bool,
    /// `bytes`
    Bytes,
    /// Any enumeration.
    Enum,
    /// Any message other than `google.protobuf.Any`.
    Message,
    /// `google.protobuf.Any`.
    Any,
}

impl FieldCategory {
    /// Category of the values held by `field`.
    #[must_use]
    pub fn of(field: &FieldDescriptor) -> Self {
        if field.is_map() {
            if let Some(value) = field
                .kind()
                .as_message()
                .map(MessageDescriptor::map_entry_value_field)
            {
                return Self::of_kind(&value.kind());
            }
        }
        Self::of_kind(&field.kind())
    }

    pub(crate) fn of_kind(kind: &Kind) -> Self {
        match kind {
            Kind::String => Self::String,
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 | Kind::Uint32 | Kind::Fixed32 => {
                Self::Integer
            }
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 | Kind::Uint64 | Kind::Fixed64 => {
                Self::Long
            }
            Kind::Float => Self::Float,
            Kind::Double => Self::Double,
            Kind::Bool => Self::Bool,
            Kind::Bytes => Self::Bytes,
            Kind::Enum(_) => Self::Enum,
            Kind::Message(desc) if desc.full_name() == ANY => Self::Any,
            Kind::Message(_) => Self::Message,
        }
    }

    /// Returns true for the categories compared by numeric constraints.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Long | Self::Float | Self::Double)
    }
}

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// A single value.
    Singular,
    /// A list of values.
    Repeated,
    /// A map from keys to values.
    Map,
}

impl Cardinality {
    /// Cardinality of `field`.
    #[must_use]
    pub fn of(field: &FieldDescriptor) -> Self {
        if field.is_map() {
            Self::Map
        } else if field.is_list() {
            Self::Repeated
        } else {
            Self::Singular
        }
    }
}

/// Identifies one field occurrence: the field itself and the names of the
/// fields enclosing it, from the validated message root.
#[derive(Debug, Clone)]
pub struct FieldContext {
    parent_path: Vec<String>,
    field: FieldDescriptor,
}

impl FieldContext {
    /// A field nested under `parent_path`.
    #[must_use]
    pub fn new(parent_path: Vec<String>, field: FieldDescriptor) -> Self {
        Self { parent_path, field }
    }

    /// A field of the validated message itself.
    #[must_use]
    pub fn root(field: FieldDescriptor) -> Self {
        Self::new(Vec::new(), field)
    }

    /// The field descriptor.
    #[must_use]
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    /// The field name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        self.field.name()
    }

    /// The field number.
    #[must_use]
    pub fn field_number(&self) -> u32 {
        self.field.number()
    }

    /// The message type declaring the field.
    #[must_use]
    pub fn declaring_type(&self) -> MessageDescriptor {
        self.field.parent_message().clone()
    }

    /// Names of the fields enclosing this one.
    #[must_use]
    pub fn parent_path(&self) -> &[String] {
        &self.parent_path
    }

    /// Names of the enclosing fields followed by this field's name.
    #[must_use]
    pub fn field_path(&self) -> Vec<String> {
        let mut path = self.parent_path.clone();
        path.push(self.field.name().to_string());
        path
    }
}

impl PartialEq for FieldContext {
    fn eq(&self, other: &Self) -> bool {
        self.parent_path == other.parent_path
            && self.field.number() == other.field.number()
            && self.field.full_name() == other.field.full_name()
    }
}

impl Eq for FieldContext {}

/// The runtime value of one field together with its context.
#[derive(Debug, Clone)]
pub struct FieldValue {
    context: FieldContext,
    value: Value,
    category: FieldCategory,
    cardinality: Cardinality,
}

impl FieldValue {
    /// Wrap `value` as the value of the field described by `context`.
    #[must_use]
    pub fn new(context: FieldContext, value: Value) -> Self {
        let category = FieldCategory::of(context.field());
        let cardinality = Cardinality::of(context.field());
        Self {
            context,
            value,
            category,
            cardinality,
        }
    }

    /// Read the field described by `context` out of `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is not declared by the message's type.
    pub fn from_message(
        message: &DynamicMessage,
        context: FieldContext,
    ) -> Result<Self, RuntimeError> {
        let descriptor = message.descriptor();
        if context.field().parent_message().full_name() != descriptor.full_name() {
            return Err(RuntimeError::new(format!(
                "field `{}` is not declared by `{}`",
                context.field().full_name(),
                descriptor.full_name()
            )));
        }
        let value = message.get_field(context.field()).into_owned();
        Ok(Self::new(context, value))
    }

    /// The field occurrence this value belongs to.
    #[must_use]
    pub fn context(&self) -> &FieldContext {
        &self.context
    }

    /// The raw value: a single value, a list or a map.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Category of the values.
    #[must_use]
    pub fn category(&self) -> FieldCategory {
        self.category
    }

    /// Whether the value is a single value, a list or a map.
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// The individual values: the value itself, the list items or the map
    /// values ordered by key.
    #[must_use]
    pub fn elements(&self) -> Vec<&Value> {
        match &self.value {
            Value::List(items) => items.iter().collect(),
            Value::Map(entries) => sorted_entries(entries).into_iter().map(|(_, v)| v).collect(),
            single => vec![single],
        }
    }

    /// Returns true if the value equals the default of its type: an empty
    /// string or byte sequence, zero, `false`, the zero enum value, an empty
    /// message, or an empty list or map.
    #[must_use]
    pub fn is_default(&self) -> bool {
        is_default_value(&self.value)
    }
}

/// A previous and a current value of the same field occurrence.
#[derive(Debug, Clone)]
pub struct FieldValueChange {
    previous: FieldValue,
    current: FieldValue,
}

impl FieldValueChange {
    /// Pair two values of one field.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is missing or the two values belong to
    /// different field occurrences.
    pub fn new(
        previous: Option<FieldValue>,
        current: Option<FieldValue>,
    ) -> Result<Self, RuntimeError> {
        let (Some(previous), Some(current)) = (previous, current) else {
            return Err(RuntimeError::new(
                "a field value change requires both the previous and the current value",
            ));
        };
        if previous.context() != current.context() {
            return Err(RuntimeError::new(format!(
                "cannot compare `{}` with `{}`",
                previous.context().field_path().join("."),
                current.context().field_path().join(".")
            )));
        }
        Ok(Self { previous, current })
    }

    /// The value before the change.
    #[must_use]
    pub fn previous(&self) -> &FieldValue {
        &self.previous
    }

    /// The value after the change.
    #[must_use]
    pub fn current(&self) -> &FieldValue {
        &self.current
    }

    /// The field occurrence both values belong to.
    #[must_use]
    pub fn context(&self) -> &FieldContext {
        self.current.context()
    }

    /// Returns true if the current value differs from the previous one.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.previous.value() != self.current.value()
    }
}

pub(crate) fn is_default_value(value: &Value) -> bool {
    match value {
        Value::Bool(v) => !v,
        Value::I32(v) => *v == 0,
        Value::I64(v) => *v == 0,
        Value::U32(v) => *v == 0,
        Value::U64(v) => *v == 0,
        Value::F32(v) => *v == 0.0,
        Value::F64(v) => *v == 0.0,
        Value::String(v) => v.is_empty(),
        Value::Bytes(v) => v.is_empty(),
        Value::EnumNumber(v) => *v == 0,
        Value::Message(msg) => is_default_message(msg),
        Value::List(items) => items.is_empty(),
        Value::Map(entries) => entries.is_empty(),
    }
}

/// Map entries in a stable order, so repeated validations report map
/// violations identically.
pub(crate) fn sorted_entries(map: &HashMap<MapKey, Value>) -> Vec<(String, &Value)> {
    let mut entries: Vec<_> = map
        .iter()
        .map(|(key, value)| (map_key_to_string(key), value))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

pub(crate) fn map_key_to_string(key: &MapKey) -> String {
    match key {
        MapKey::Bool(b) => b.to_string(),
        MapKey::I32(n) => n.to_string(),
        MapKey::I64(n) => n.to_string(),
        MapKey::U32(n) => n.to_string(),
        MapKey::U64(n) => n.to_string(),
        MapKey::String(s) => serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string()),
    }
}

pub(crate) fn is_default_message(msg: &DynamicMessage) -> bool {
    msg.descriptor().fields().all(|field| !msg.has_field(&field))
}
