use prost_reflect::Value;

use crate::error::Error;
use crate::field::is_default_value;
use crate::validator::rules::repeated::DistinctRuleEval;
use crate::violation::{self, ConstraintViolation};

use super::value::FieldValidator;
use super::{EvalContext, Evaluator};

/// Evaluator for repeated (list) fields.
/// Applies the item validator to every non-default item.
pub(crate) struct ListEval {
    pub item: FieldValidator,
    pub distinct: Option<DistinctRuleEval>,
}

impl Evaluator for ListEval {
    fn tautology(&self) -> bool {
        self.item.tautology() && self.distinct.is_none()
    }

    fn evaluate(
        &self,
        val: &Value,
        field_path: &[String],
        cx: &EvalContext<'_>,
    ) -> Result<Vec<ConstraintViolation>, Error> {
        let Some(list) = val.as_list() else {
            return Ok(Vec::new());
        };
        let items: Vec<&Value> = list.iter().collect();
        evaluate_elements(&self.item, self.distinct.as_ref(), &items, field_path, cx)
    }
}

/// Shared by lists and maps: element violations become the children of one
/// violation on the collection, followed by the duplicate check.
pub(crate) fn evaluate_elements(
    item: &FieldValidator,
    distinct: Option<&DistinctRuleEval>,
    elements: &[&Value],
    field_path: &[String],
    cx: &EvalContext<'_>,
) -> Result<Vec<ConstraintViolation>, Error> {
    let mut violations = Vec::new();

    if !item.tautology() {
        let mut children = Vec::new();
        for element in elements.iter().filter(|e| !is_default_value(e)) {
            children.extend(item.evaluate(element, field_path, cx)?);
        }
        if !children.is_empty() {
            let collection =
                ConstraintViolation::new(violation::INVALID_ELEMENTS, Vec::new(), field_path.to_vec());
            violations.push(collection.with_children(children));
        }
    }

    if let Some(distinct) = distinct {
        violations.extend(distinct.evaluate(elements, field_path));
    }
    Ok(violations)
}
