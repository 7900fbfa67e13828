use prost_reflect::Value;

use crate::error::Error;
use crate::field::sorted_entries;
use crate::validator::rules::repeated::DistinctRuleEval;
use crate::violation::ConstraintViolation;

use super::list::evaluate_elements;
use super::value::FieldValidator;
use super::{EvalContext, Evaluator};

/// Evaluator for map fields.
/// Applies the value validator to every non-default map value, in key order.
pub(crate) struct MapEval {
    pub value: FieldValidator,
    pub distinct: Option<DistinctRuleEval>,
}

impl Evaluator for MapEval {
    fn tautology(&self) -> bool {
        self.value.tautology() && self.distinct.is_none()
    }

    fn evaluate(
        &self,
        val: &Value,
        field_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let Some(map) = val.as_map() else {
            return Ok(Vec::new());
        };
        let values: Vec<&Value> = sorted_entries(map).into_iter().map(|(_, v)| v).collect();
        evaluate_elements(&self.value, self.distinct.as_ref(), &values, field_path, cx)
    }
}
