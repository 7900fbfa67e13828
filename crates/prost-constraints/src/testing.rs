//! Test schema assembled in code.

use std::sync::LazyLock;

use prost::Message;
use prost_reflect::{
    DescriptorPool, DynamicMessage, ExtensionDescriptor, MessageDescriptor, ReflectMessage, Value,
};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions, OneofDescriptorProto,
};

const FILE_NAME: &str = "test/messages.proto";

fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        json_name: Some(name.to_string()),
        ..Default::default()
    }
}

fn typed(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..field(name, number, ty)
    }
}

fn list(field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..field
    }
}

fn in_oneof(field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        oneof_index: Some(index),
        ..field
    }
}

fn message_proto(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

fn map_entry(name: &str, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..message_proto(name, vec![field("key", 1, Type::String), value])
    }
}

const TIMESTAMP: &str = ".google.protobuf.Timestamp";
const ANY: &str = ".google.protobuf.Any";

fn file_descriptor_proto() -> FileDescriptorProto {
    let kinds = DescriptorProto {
        nested_type: vec![map_entry("ScoresEntry", field("value", 2, Type::Int32))],
        ..message_proto(
            "Kinds",
            vec![
                field("text", 1, Type::String),
                field("count", 2, Type::Int32),
                field("unsigned", 3, Type::Uint32),
                field("big", 4, Type::Int64),
                field("ratio", 5, Type::Float),
                field("amount", 6, Type::Double),
                field("flag", 7, Type::Bool),
                field("blob", 8, Type::Bytes),
                typed("color", 9, Type::Enum, ".test.Color"),
                typed("when", 10, Type::Message, TIMESTAMP),
                typed("payload", 11, Type::Message, ANY),
                list(field("tags", 12, Type::String)),
                list(typed("scores", 13, Type::Message, ".test.Kinds.ScoresEntry")),
            ],
        )
    };

    let tagged = DescriptorProto {
        nested_type: vec![map_entry("LabelsEntry", field("value", 2, Type::String))],
        ..message_proto(
            "Tagged",
            vec![
                list(field("tags", 1, Type::String)),
                list(typed("labels", 2, Type::Message, ".test.Tagged.LabelsEntry")),
                list(field("numbers", 3, Type::Int64)),
                list(typed("emails", 4, Type::Message, ".test.Email")),
            ],
        )
    };

    let choice = DescriptorProto {
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("kind".to_string()),
            ..Default::default()
        }],
        ..message_proto(
            "Choice",
            vec![
                in_oneof(field("first", 1, Type::String), 0),
                in_oneof(field("second", 2, Type::String), 0),
                field("label", 3, Type::String),
            ],
        )
    };

    let color = EnumDescriptorProto {
        name: Some("Color".to_string()),
        value: [("COLOR_UNSPECIFIED", 0), ("RED", 1), ("GREEN", 2)]
            .into_iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_string()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some(FILE_NAME.to_string()),
        package: Some("test".to_string()),
        dependency: vec![
            "google/protobuf/any.proto".to_string(),
            "google/protobuf/timestamp.proto".to_string(),
        ],
        message_type: vec![
            kinds,
            tagged,
            choice,
            message_proto("Email", vec![field("email", 1, Type::String)]),
            message_proto(
                "Outer",
                vec![
                    typed("inner", 1, Type::Message, ".test.Email"),
                    list(typed("inners", 2, Type::Message, ".test.Email")),
                    field("label", 3, Type::String),
                ],
            ),
            message_proto(
                "Tree",
                vec![
                    field("name", 1, Type::String),
                    typed("child", 2, Type::Message, ".test.Tree"),
                ],
            ),
            message_proto(
                "Holder",
                vec![
                    typed("payload", 1, Type::Message, ANY),
                    list(typed("payloads", 2, Type::Message, ANY)),
                ],
            ),
            message_proto(
                "Numbers",
                vec![
                    field("int_value", 1, Type::Int32),
                    field("long_value", 2, Type::Int64),
                    field("float_value", 3, Type::Float),
                    field("double_value", 4, Type::Double),
                    field("ulong_value", 5, Type::Uint64),
                ],
            ),
            message_proto(
                "Times",
                vec![
                    typed("when", 1, Type::Message, TIMESTAMP),
                    list(typed("history", 2, Type::Message, TIMESTAMP)),
                ],
            ),
            message_proto(
                "Entity",
                vec![
                    field("id", 1, Type::String),
                    field("other_id", 2, Type::String),
                    field("name", 3, Type::String),
                ],
            ),
            message_proto(
                "ProjectEntity",
                vec![
                    field("title", 1, Type::String),
                    typed("project_id", 2, Type::Message, ".test.ProjectId"),
                ],
            ),
            message_proto("ProjectId", vec![field("value", 1, Type::String)]),
            message_proto("LongEntity", vec![field("id", 1, Type::Int64)]),
            message_proto("BytesEntity", vec![field("id", 1, Type::Bytes)]),
            message_proto("DoubleEntity", vec![field("user_id", 1, Type::Double)]),
            message_proto("RepeatedEntity", vec![list(field("id", 1, Type::String))]),
        ],
        enum_type: vec![color],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

static POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    let mut pool = DescriptorPool::global();
    pool.add_file_descriptor_proto(file_descriptor_proto())
        .expect("test schema is well formed");
    pool
});

pub(crate) fn pool() -> &'static DescriptorPool {
    &POOL
}

/// `annotated.Account`, with its constraints declared as descriptor options:
/// an entity whose `email` must be set and match a pattern, and whose
/// `contact` oneof is required.
static ANNOTATED: LazyLock<DescriptorPool> = LazyLock::new(|| {
    use prost_constraints_types::{
        FieldConstraints, MessageConstraints, OneofConstraints, PatternConstraint,
    };

    let account = DescriptorProto {
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("contact".to_string()),
            ..Default::default()
        }],
        ..message_proto(
            "Account",
            vec![
                field("id", 1, Type::String),
                field("email", 2, Type::String),
                in_oneof(field("phone", 3, Type::String), 0),
                in_oneof(field("fax", 4, Type::String), 0),
            ],
        )
    };
    let proto = FileDescriptorProto {
        name: Some("test/annotated.proto".to_string()),
        package: Some("annotated".to_string()),
        message_type: vec![account],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    };

    let file_type = prost_constraints_types::DESCRIPTOR_POOL
        .get_message_by_name("google.protobuf.FileDescriptorProto")
        .expect("descriptor.proto is part of the constraints pool");
    let mut file = DynamicMessage::decode(file_type, proto.encode_to_vec().as_slice())
        .expect("file descriptor decodes");

    let account = list_item(&mut file, "message_type", 0);
    set_option(
        account,
        prost_constraints_types::message_extension(),
        &MessageConstraints { entity: Some(true) },
    );
    set_option(
        list_item(account, "field", 1),
        prost_constraints_types::field_extension(),
        &FieldConstraints {
            required: Some(true),
            pattern: Some(PatternConstraint {
                regex: EMAIL_PATTERN.to_string(),
                msg_format: None,
            }),
            ..Default::default()
        },
    );
    set_option(
        list_item(account, "oneof_decl", 0),
        prost_constraints_types::oneof_extension(),
        &OneofConstraints {
            required: Some(true),
        },
    );

    let mut pool = DescriptorPool::global();
    pool.decode_file_descriptor_proto(file.encode_to_vec().as_slice())
        .expect("annotated schema is well formed");
    pool
});

pub(crate) const EMAIL_PATTERN: &str = r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}";

fn list_item<'a>(msg: &'a mut DynamicMessage, field: &str, index: usize) -> &'a mut DynamicMessage {
    msg.get_field_by_name_mut(field)
        .and_then(Value::as_list_mut)
        .and_then(|items| items.get_mut(index))
        .and_then(Value::as_message_mut)
        .unwrap_or_else(|| panic!("{field}[{index}] is a message"))
}

fn set_option(element: &mut DynamicMessage, extension: &ExtensionDescriptor, value: &impl Message) {
    let payload_type = extension
        .kind()
        .as_message()
        .cloned()
        .expect("constraint extensions are message typed");
    let payload = DynamicMessage::decode(payload_type, value.encode_to_vec().as_slice())
        .expect("payload decodes");
    element
        .get_field_by_name_mut("options")
        .and_then(Value::as_message_mut)
        .expect("options is a message field")
        .set_extension(extension, Value::Message(payload));
}

pub(crate) fn annotated(full_name: &str) -> DynamicMessage {
    let desc = ANNOTATED
        .get_message_by_name(full_name)
        .unwrap_or_else(|| panic!("{full_name} is part of the annotated schema"));
    DynamicMessage::new(desc)
}

pub(crate) fn message(full_name: &str) -> MessageDescriptor {
    POOL.get_message_by_name(full_name)
        .unwrap_or_else(|| panic!("{full_name} is part of the test schema"))
}

pub(crate) fn new(full_name: &str) -> DynamicMessage {
    DynamicMessage::new(message(full_name))
}

/// Build a message of `full_name` with the given top-level fields.
pub(crate) fn with(full_name: &str, fields: Vec<(&str, Value)>) -> DynamicMessage {
    let mut msg = new(full_name);
    for (name, value) in fields {
        msg.set_field_by_name(name, value);
    }
    msg
}

pub(crate) fn string(value: &str) -> Value {
    Value::String(value.to_string())
}

pub(crate) fn timestamp(seconds: i64, nanos: i32) -> Value {
    let mut msg = DynamicMessage::new(message("google.protobuf.Timestamp"));
    msg.set_field_by_name("seconds", Value::I64(seconds));
    msg.set_field_by_name("nanos", Value::I32(nanos));
    Value::Message(msg)
}

pub(crate) fn pack(payload: &DynamicMessage) -> Value {
    pack_as(
        &format!("type.googleapis.com/{}", payload.descriptor().full_name()),
        payload.encode_to_vec(),
    )
}

pub(crate) fn pack_as(type_url: &str, bytes: Vec<u8>) -> Value {
    let mut any = DynamicMessage::new(message("google.protobuf.Any"));
    any.set_field_by_name("type_url", string(type_url));
    any.set_field_by_name("value", Value::Bytes(bytes.into()));
    Value::Message(any)
}
