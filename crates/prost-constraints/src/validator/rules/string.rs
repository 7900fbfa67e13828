use prost_reflect::Value;
use regex::Regex;

use prost_constraints_types::PatternConstraint;

use crate::error::CompilationError;
use crate::violation::{self, ConstraintViolation};

/// Full-match regular expression check for string values.
pub(crate) struct PatternRuleEval {
    regex: Regex,
    source: String,
    msg_format: Option<String>,
}

impl PatternRuleEval {
    pub fn new(pattern: &PatternConstraint) -> Result<Self, CompilationError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern.regex)).map_err(|e| {
            CompilationError::new(format!(
                "invalid regular expression `{}`: {e}",
                pattern.regex
            ))
        })?;
        Ok(Self {
            regex,
            source: pattern.regex.clone(),
            msg_format: pattern.msg_format.clone(),
        })
    }

    pub fn evaluate(&self, val: &Value, field_path: &[String]) -> Option<ConstraintViolation> {
        let text = val.as_str()?;
        if self.regex.is_match(text) {
            return None;
        }
        Some(ConstraintViolation::from_template(
            self.msg_format.as_deref(),
            violation::PATTERN,
            vec![self.source.clone()],
            field_path.to_vec(),
        ))
    }
}
