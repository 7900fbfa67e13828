//! Constraint catalog schema for [`prost-constraints`](https://crates.io/crates/prost-constraints).
//!
//! This crate provides:
//!
//! - The catalog message types ([`FieldConstraints`], [`MessageConstraints`],
//!   [`OneofConstraints`]) and the wire form of a [`ConstraintViolation`].
//! - A shared [`DESCRIPTOR_POOL`] containing `prost/constraints/constraints.proto`,
//!   which declares the `prost.constraints.field`, `prost.constraints.message`
//!   and `prost.constraints.oneof` custom options.
//! - Extension traits for reading those options from descriptors:
//!   [`FieldConstraintsExt`], [`MessageConstraintsExt`] and
//!   [`OneofConstraintsExt`].
//!
//! Options are read no matter which pool the schema was loaded into. The
//! options message is re-decoded against [`DESCRIPTOR_POOL`] first, so a schema
//! that imports its own copy of `constraints.proto` works the same as one
//! carrying the extensions as unknown fields.

#![warn(missing_docs)]

#[allow(missing_docs, clippy::doc_markdown, clippy::must_use_candidate)]
mod proto;
pub mod schema;

use anyhow::anyhow;
use prost::Message;
use prost_reflect::{
    DescriptorPool, DynamicMessage, ExtensionDescriptor, FieldDescriptor, MessageDescriptor,
    OneofDescriptor, ReflectMessage,
};
use std::sync::LazyLock;

pub use proto::*;

static DESCRIPTOR_POOL_BUILD: LazyLock<(DescriptorPool, Option<String>)> = LazyLock::new(|| {
    let mut pool = DescriptorPool::global();
    match pool.add_file_descriptor_proto(schema::file_descriptor_proto()) {
        Ok(()) => (pool, None),
        Err(err) => (DescriptorPool::global(), Some(err.to_string())),
    }
});

/// Descriptor pool holding the well-known types and `constraints.proto`.
pub static DESCRIPTOR_POOL: LazyLock<DescriptorPool> =
    LazyLock::new(|| DESCRIPTOR_POOL_BUILD.0.clone());

/// Returns the reason `constraints.proto` could not be added to
/// [`DESCRIPTOR_POOL`], if it failed.
#[must_use]
pub fn descriptor_pool_build_error() -> Option<&'static str> {
    DESCRIPTOR_POOL_BUILD.1.as_deref()
}

#[allow(clippy::unwrap_used)]
static FIELD_EXTENSION: LazyLock<ExtensionDescriptor> = LazyLock::new(|| {
    DESCRIPTOR_POOL
        .get_extension_by_name("prost.constraints.field")
        .ok_or(anyhow!("prost.constraints.field extension not found"))
        .unwrap()
});

#[allow(clippy::unwrap_used)]
static MESSAGE_EXTENSION: LazyLock<ExtensionDescriptor> = LazyLock::new(|| {
    DESCRIPTOR_POOL
        .get_extension_by_name("prost.constraints.message")
        .ok_or(anyhow!("prost.constraints.message extension not found"))
        .unwrap()
});

#[allow(clippy::unwrap_used)]
static ONEOF_EXTENSION: LazyLock<ExtensionDescriptor> = LazyLock::new(|| {
    DESCRIPTOR_POOL
        .get_extension_by_name("prost.constraints.oneof")
        .ok_or(anyhow!("prost.constraints.oneof extension not found"))
        .unwrap()
});

/// Returns the extension descriptor of `prost.constraints.field`.
#[must_use]
pub fn field_extension() -> &'static ExtensionDescriptor {
    &FIELD_EXTENSION
}

/// Returns the extension descriptor of `prost.constraints.message`.
#[must_use]
pub fn message_extension() -> &'static ExtensionDescriptor {
    &MESSAGE_EXTENSION
}

/// Returns the extension descriptor of `prost.constraints.oneof`.
#[must_use]
pub fn oneof_extension() -> &'static ExtensionDescriptor {
    &ONEOF_EXTENSION
}

/// Reads one constraints extension out of a descriptor options message.
///
/// # Errors
///
/// Returns an error if the options cannot be re-decoded against
/// [`DESCRIPTOR_POOL`] or the extension value does not transcode to `T`.
pub fn read_extension<T: Message + Default>(
    options: &DynamicMessage,
    extension: &ExtensionDescriptor,
) -> anyhow::Result<Option<T>> {
    let options_name = options.descriptor().full_name().to_string();
    let descriptor = DESCRIPTOR_POOL
        .get_message_by_name(&options_name)
        .ok_or_else(|| anyhow!("{options_name} is not part of the constraints descriptor pool"))?;
    let options = DynamicMessage::decode(descriptor, options.encode_to_vec().as_slice())?;

    if !options.has_extension(extension) {
        return Ok(None);
    }
    match options.get_extension(extension).as_message() {
        Some(value) => Ok(Some(value.transcode_to::<T>()?)),
        None => Ok(None),
    }
}

/// Extension trait for reading `prost.constraints.field` from a field descriptor.
pub trait FieldConstraintsExt {
    /// Returns the [`FieldConstraints`] declared on this field, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be transcoded to `FieldConstraints`.
    fn field_constraints(&self) -> anyhow::Result<Option<FieldConstraints>>;

    /// Returns the real (non-synthetic) oneof containing this field, if any.
    fn real_oneof(&self) -> Option<OneofDescriptor>;
}

impl FieldConstraintsExt for FieldDescriptor {
    fn field_constraints(&self) -> anyhow::Result<Option<FieldConstraints>> {
        read_extension(&self.options(), &FIELD_EXTENSION)
    }

    fn real_oneof(&self) -> Option<OneofDescriptor> {
        self.containing_oneof().filter(|o| !o.is_synthetic())
    }
}

/// Extension trait for reading `prost.constraints.oneof` from a oneof descriptor.
pub trait OneofConstraintsExt {
    /// Returns the [`OneofConstraints`] declared on this oneof, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be transcoded to `OneofConstraints`.
    fn oneof_constraints(&self) -> anyhow::Result<Option<OneofConstraints>>;
}

impl OneofConstraintsExt for OneofDescriptor {
    fn oneof_constraints(&self) -> anyhow::Result<Option<OneofConstraints>> {
        read_extension(&self.options(), &ONEOF_EXTENSION)
    }
}

/// Extension trait for reading `prost.constraints.message` from a message descriptor.
pub trait MessageConstraintsExt {
    /// Returns the [`MessageConstraints`] declared on this message, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be transcoded to `MessageConstraints`.
    fn message_constraints(&self) -> anyhow::Result<Option<MessageConstraints>>;
}

impl MessageConstraintsExt for MessageDescriptor {
    fn message_constraints(&self) -> anyhow::Result<Option<MessageConstraints>> {
        read_extension(&self.options(), &MESSAGE_EXTENSION)
    }
}
