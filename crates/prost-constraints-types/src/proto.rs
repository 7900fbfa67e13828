//! Message types of `prost/constraints/constraints.proto`.
//!
//! Field tags and wire types mirror the descriptor assembled in
//! [`crate::schema`], so values decoded from descriptor options transcode
//! straight into these structs.

/// Constraints attached to a single field.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldConstraints {
    /// The field must hold a non-default value.
    ///
    /// An explicit `false` also opts the field out of the implicit entity-id
    /// requirement.
    #[prost(bool, optional, tag = "1")]
    pub required: ::core::option::Option<bool>,
    /// Replaces the default "value must be set" message.
    #[prost(string, optional, tag = "2")]
    pub missing_msg: ::core::option::Option<::prost::alloc::string::String>,
    /// The string value must fully match a regular expression.
    #[prost(message, optional, tag = "3")]
    pub pattern: ::core::option::Option<PatternConstraint>,
    /// Lower numeric bound.
    #[prost(message, optional, tag = "4")]
    pub min: ::core::option::Option<NumberBound>,
    /// Upper numeric bound.
    #[prost(message, optional, tag = "5")]
    pub max: ::core::option::Option<NumberBound>,
    /// Maximum integral and fractional digit counts.
    #[prost(message, optional, tag = "6")]
    pub digits: ::core::option::Option<DigitsConstraint>,
    /// The timestamp value must lie in the past or in the future.
    #[prost(message, optional, tag = "7")]
    pub when: ::core::option::Option<TimeConstraint>,
    /// Validate the nested message recursively.
    #[prost(bool, optional, tag = "8")]
    pub valid: ::core::option::Option<bool>,
    /// Replaces the default "message must have valid properties" message.
    #[prost(string, optional, tag = "9")]
    pub invalid_msg: ::core::option::Option<::prost::alloc::string::String>,
    /// Once set to a non-default value, the field must not change.
    #[prost(bool, optional, tag = "10")]
    pub set_once: ::core::option::Option<bool>,
    /// Elements of the repeated field must be pairwise distinct.
    #[prost(bool, optional, tag = "11")]
    pub distinct: ::core::option::Option<bool>,
    /// Skip unpacking and validating a `google.protobuf.Any` payload.
    #[prost(bool, optional, tag = "12")]
    pub unchecked: ::core::option::Option<bool>,
}

/// Regular expression constraint for string fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PatternConstraint {
    #[prost(string, tag = "1")]
    pub regex: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "2")]
    pub msg_format: ::core::option::Option<::prost::alloc::string::String>,
}

/// One side of a numeric range.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NumberBound {
    /// Decimal text of the bound, e.g. `"16.5"`.
    #[prost(string, tag = "1")]
    pub value: ::prost::alloc::string::String,
    /// Whether the bound itself is excluded from the range.
    #[prost(bool, tag = "2")]
    pub exclusive: bool,
    #[prost(string, optional, tag = "3")]
    pub msg_format: ::core::option::Option<::prost::alloc::string::String>,
}

/// Digit count limits for numeric fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DigitsConstraint {
    #[prost(int32, tag = "1")]
    pub integer_max: i32,
    #[prost(int32, tag = "2")]
    pub fraction_max: i32,
    #[prost(string, optional, tag = "3")]
    pub msg_format: ::core::option::Option<::prost::alloc::string::String>,
}

/// Temporal constraint for `google.protobuf.Timestamp` fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeConstraint {
    #[prost(enumeration = "Time", tag = "1")]
    pub time: i32,
    #[prost(string, optional, tag = "2")]
    pub msg_format: ::core::option::Option<::prost::alloc::string::String>,
}

/// Direction of a [`TimeConstraint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Time {
    Unspecified = 0,
    Past = 1,
    Future = 2,
}

/// Constraints attached to a message type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageConstraints {
    /// The type describes an identifiable entity whose first `id`/`*_id`
    /// field is implicitly required.
    #[prost(bool, optional, tag = "1")]
    pub entity: ::core::option::Option<bool>,
}

/// Constraints attached to a oneof group.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OneofConstraints {
    /// One member of the group must be set.
    #[prost(bool, optional, tag = "1")]
    pub required: ::core::option::Option<bool>,
}

/// Wire form of a single constraint violation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConstraintViolation {
    #[prost(string, tag = "1")]
    pub msg_format: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub param: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "3")]
    pub field_path: ::core::option::Option<FieldPath>,
    #[prost(message, repeated, tag = "4")]
    pub violation: ::prost::alloc::vec::Vec<ConstraintViolation>,
}

/// Field names from the message root to the offending field.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldPath {
    #[prost(string, repeated, tag = "1")]
    pub field_name: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// A list of violations, as returned for a whole message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConstraintViolations {
    #[prost(message, repeated, tag = "1")]
    pub violations: ::prost::alloc::vec::Vec<ConstraintViolation>,
}
