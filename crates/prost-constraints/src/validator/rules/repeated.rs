use std::collections::HashSet;

use prost_reflect::{ReflectMessage, Value};

use crate::violation::{self, ConstraintViolation};

/// Rejects collections holding two equal elements.
pub(crate) struct DistinctRuleEval;

impl DistinctRuleEval {
    pub fn evaluate(&self, elements: &[&Value], field_path: &[String]) -> Option<ConstraintViolation> {
        let duplicate = first_duplicate(elements)?;
        Some(ConstraintViolation::new(
            violation::DUPLICATE,
            vec![display_value(duplicate)],
            field_path.to_vec(),
        ))
    }
}

/// Hashable key extracted from a scalar `Value` for O(n) duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum UniqueKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(u32),
    F64(u64),
    String(String),
    Bytes(Vec<u8>),
    Enum(i32),
}

fn unique_key(value: &Value) -> Option<UniqueKey> {
    match value {
        Value::Bool(v) => Some(UniqueKey::Bool(*v)),
        Value::I32(v) => Some(UniqueKey::I32(*v)),
        Value::I64(v) => Some(UniqueKey::I64(*v)),
        Value::U32(v) => Some(UniqueKey::U32(*v)),
        Value::U64(v) => Some(UniqueKey::U64(*v)),
        Value::F32(v) => Some(UniqueKey::F32(v.to_bits())),
        Value::F64(v) => Some(UniqueKey::F64(v.to_bits())),
        Value::String(v) => Some(UniqueKey::String(v.clone())),
        Value::Bytes(v) => Some(UniqueKey::Bytes(v.to_vec())),
        Value::EnumNumber(v) => Some(UniqueKey::Enum(*v)),
        // Messages, lists and maps are compared pairwise.
        Value::Message(_) | Value::List(_) | Value::Map(_) => None,
    }
}

/// Returns the first element equal to an earlier one.
fn first_duplicate<'a>(elements: &[&'a Value]) -> Option<&'a Value> {
    let keys: Option<Vec<_>> = elements.iter().map(|v| unique_key(v)).collect();
    if let Some(keys) = keys {
        let mut seen = HashSet::with_capacity(keys.len());
        return keys
            .into_iter()
            .zip(elements)
            .find(|(key, _)| !seen.insert(key.clone()))
            .map(|(_, value)| *value);
    }

    elements
        .iter()
        .enumerate()
        .find(|(i, item)| elements[..*i].contains(item))
        .map(|(_, value)| *value)
}

/// Text of a value as used in violation params.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::I32(v) | Value::EnumNumber(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string()),
        Value::Bytes(b) => serde_json::to_string(&String::from_utf8_lossy(b))
            .unwrap_or_else(|_| "\"\"".to_string()),
        Value::Message(msg) => serde_json::to_string(msg)
            .unwrap_or_else(|_| msg.descriptor().full_name().to_string()),
        Value::List(items) => format!(
            "[{}]",
            items.iter().map(display_value).collect::<Vec<_>>().join(", ")
        ),
        Value::Map(_) => "{..}".to_string(),
    }
}
