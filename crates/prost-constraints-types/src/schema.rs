//! In-code definition of `prost/constraints/constraints.proto`.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto,
};

/// Path of the constraints file inside a descriptor pool.
pub const FILE_NAME: &str = "prost/constraints/constraints.proto";

/// Package of every constraint type and extension.
pub const PACKAGE: &str = "prost.constraints";

/// Extension number of `prost.constraints.field`.
pub const FIELD_EXTENSION_NUMBER: i32 = 73101;
/// Extension number of `prost.constraints.message`.
pub const MESSAGE_EXTENSION_NUMBER: i32 = 73102;
/// Extension number of `prost.constraints.oneof`.
pub const ONEOF_EXTENSION_NUMBER: i32 = 73103;

fn scalar(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn repeated(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..scalar(name, number, ty)
    }
}

fn typed(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(format!(".{PACKAGE}.{type_name}")),
        ..scalar(name, number, ty)
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

fn extension(name: &str, number: i32, extendee: &str, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        extendee: Some(format!(".google.protobuf.{extendee}")),
        ..typed(name, number, Type::Message, type_name)
    }
}

/// Builds the file descriptor declaring the constraint catalog and its
/// option extensions.
#[must_use]
pub fn file_descriptor_proto() -> FileDescriptorProto {
    let field_constraints = message(
        "FieldConstraints",
        vec![
            scalar("required", 1, Type::Bool),
            scalar("missing_msg", 2, Type::String),
            typed("pattern", 3, Type::Message, "PatternConstraint"),
            typed("min", 4, Type::Message, "NumberBound"),
            typed("max", 5, Type::Message, "NumberBound"),
            typed("digits", 6, Type::Message, "DigitsConstraint"),
            typed("when", 7, Type::Message, "TimeConstraint"),
            scalar("valid", 8, Type::Bool),
            scalar("invalid_msg", 9, Type::String),
            scalar("set_once", 10, Type::Bool),
            scalar("distinct", 11, Type::Bool),
            scalar("unchecked", 12, Type::Bool),
        ],
    );

    let time = EnumDescriptorProto {
        name: Some("Time".to_string()),
        value: [("TIME_UNSPECIFIED", 0), ("PAST", 1), ("FUTURE", 2)]
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
        package: Some(PACKAGE.to_string()),
        dependency: vec!["google/protobuf/descriptor.proto".to_string()],
        message_type: vec![
            field_constraints,
            message(
                "PatternConstraint",
                vec![
                    scalar("regex", 1, Type::String),
                    scalar("msg_format", 2, Type::String),
                ],
            ),
            message(
                "NumberBound",
                vec![
                    scalar("value", 1, Type::String),
                    scalar("exclusive", 2, Type::Bool),
                    scalar("msg_format", 3, Type::String),
                ],
            ),
            message(
                "DigitsConstraint",
                vec![
                    scalar("integer_max", 1, Type::Int32),
                    scalar("fraction_max", 2, Type::Int32),
                    scalar("msg_format", 3, Type::String),
                ],
            ),
            message(
                "TimeConstraint",
                vec![
                    typed("time", 1, Type::Enum, "Time"),
                    scalar("msg_format", 2, Type::String),
                ],
            ),
            message("MessageConstraints", vec![scalar("entity", 1, Type::Bool)]),
            message("OneofConstraints", vec![scalar("required", 1, Type::Bool)]),
            message(
                "ConstraintViolation",
                vec![
                    scalar("msg_format", 1, Type::String),
                    repeated("param", 2, Type::String),
                    typed("field_path", 3, Type::Message, "FieldPath"),
                    FieldDescriptorProto {
                        label: Some(Label::Repeated as i32),
                        ..typed("violation", 4, Type::Message, "ConstraintViolation")
                    },
                ],
            ),
            message("FieldPath", vec![repeated("field_name", 1, Type::String)]),
            message(
                "ConstraintViolations",
                vec![FieldDescriptorProto {
                    label: Some(Label::Repeated as i32),
                    ..typed("violations", 1, Type::Message, "ConstraintViolation")
                }],
            ),
        ],
        enum_type: vec![time],
        extension: vec![
            extension(
                "field",
                FIELD_EXTENSION_NUMBER,
                "FieldOptions",
                "FieldConstraints",
            ),
            extension(
                "message",
                MESSAGE_EXTENSION_NUMBER,
                "MessageOptions",
                "MessageConstraints",
            ),
            extension(
                "oneof",
                ONEOF_EXTENSION_NUMBER,
                "OneofOptions",
                "OneofConstraints",
            ),
        ],
        syntax: Some("proto2".to_string()),
        ..Default::default()
    }
}
