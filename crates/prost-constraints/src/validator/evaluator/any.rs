use prost_reflect::{DynamicMessage, ReflectMessage, Value};

use crate::error::{Error, RuntimeError};
use crate::violation::ConstraintViolation;

use super::embedded::wrap_nested;
use super::{EvalContext, Evaluator, MessageEvaluator};

/// Evaluator for `google.protobuf.Any` fields.
///
/// Unpacks the payload by its type URL and validates it like an embedded
/// message.
pub(crate) struct AnyEval {
    /// Skip the payload entirely.
    pub unchecked: bool,
    /// Replaces the default "invalid message" text.
    pub invalid_msg: Option<String>,
}

impl Evaluator for AnyEval {
    fn tautology(&self) -> bool {
        self.unchecked
    }

    fn evaluate(
        &self,
        val: &Value,
        field_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        if self.unchecked {
            return Ok(Vec::new());
        }
        let Some(any_msg) = val.as_message() else {
            return Ok(Vec::new());
        };

        let payload = unpack(any_msg)?;
        let eval = cx.builder.load_or_build(&payload.descriptor());
        let children = eval.evaluate_message(&payload, &[], cx)?;
        Ok(wrap_nested(self.invalid_msg.as_deref(), field_path, children))
    }
}

/// Decode the payload of an `Any` against the pool declaring the `Any` itself.
fn unpack(any_msg: &DynamicMessage) -> Result<DynamicMessage, RuntimeError> {
    let type_url = any_msg
        .get_field_by_name("type_url")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let bytes = any_msg
        .get_field_by_name("value")
        .and_then(|v| v.as_bytes().cloned())
        .unwrap_or_default();

    let type_name = type_url.rsplit_once('/').map_or(type_url.as_str(), |(_, name)| name);
    let pool = any_msg.descriptor().parent_pool().clone();
    let Some(descriptor) = pool.get_message_by_name(type_name) else {
        return Err(RuntimeError::new(format!(
            "cannot unpack Any: unknown message type `{type_url}`"
        )));
    };
    DynamicMessage::decode(descriptor, bytes).map_err(|err| {
        RuntimeError::new(format!("cannot unpack Any of type `{type_url}`: {err}"))
    })
}
