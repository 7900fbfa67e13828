use prost_reflect::{FieldDescriptor, Kind, MessageDescriptor};

use crate::field::{Cardinality, FieldCategory};

const TIMESTAMP: &str = "google.protobuf.Timestamp";

/// Returns the field identifying an entity: the first field, in declaration
/// order, named `id` or ending in `_id`.
pub(crate) fn entity_id_field(desc: &MessageDescriptor) -> Option<FieldDescriptor> {
    desc.fields()
        .find(|field| field.name() == "id" || field.name().ends_with("_id"))
}

/// Returns true if `field` can hold an entity id: a single message, string,
/// integer or long.
pub(crate) fn is_permitted_entity_id(field: &FieldDescriptor) -> bool {
    Cardinality::of(field) == Cardinality::Singular
        && matches!(
            FieldCategory::of(field),
            FieldCategory::Message
                | FieldCategory::String
                | FieldCategory::Integer
                | FieldCategory::Long
        )
}

/// Returns true if the values of `field` are `google.protobuf.Timestamp`.
pub(crate) fn is_timestamp(field: &FieldDescriptor) -> bool {
    let kind = match field.kind() {
        Kind::Message(entry) if field.is_map() => entry.map_entry_value_field().kind(),
        kind => kind,
    };
    matches!(kind, Kind::Message(desc) if desc.full_name() == TIMESTAMP)
}

/// Returns the message type of the values of `field`, if they are messages.
pub(crate) fn element_message(field: &FieldDescriptor) -> Option<MessageDescriptor> {
    match field.kind() {
        Kind::Message(entry) if field.is_map() => {
            entry.map_entry_value_field().kind().as_message().cloned()
        }
        kind => kind.as_message().cloned(),
    }
}
