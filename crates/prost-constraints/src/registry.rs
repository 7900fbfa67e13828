//! Externally configured validation rules.
//!
//! A rule names fields whose nested message must be validated even though
//! the schema does not declare `valid` on them. Rules are usually loaded from
//! properties text:
//!
//! ```text
//! # rule id = comma separated field paths
//! projection_state=acme.tasks.TaskView.details,acme.tasks.TaskView.owner
//! ```

use std::collections::{HashMap, HashSet};

use prost_reflect::DescriptorPool;
use tracing::debug;

use crate::error::CompilationError;

/// One rule: an identifier and the fields it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRule {
    id: String,
    targets: Vec<String>,
}

impl ValidationRule {
    /// Create a rule targeting fields given as `package.Message.field`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or a target is not a qualified
    /// field path.
    pub fn new<I, S>(id: impl Into<String>, targets: I) -> Result<Self, CompilationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CompilationError::new("validation rule id must not be empty"));
        }
        let targets = targets
            .into_iter()
            .map(Into::into)
            .map(|target: String| {
                let target = target.trim().to_string();
                match split_target(&target) {
                    Some(_) => Ok(target),
                    None => Err(CompilationError::new(format!(
                        "validation rule `{id}` targets `{target}`, expected `package.Message.field`"
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { id, targets })
    }

    /// The rule identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full names of the targeted fields.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

/// Registry of [`ValidationRule`]s. The first rule registered under an id
/// wins; later ones with the same id are ignored.
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    rules: Vec<ValidationRule>,
    ids: HashSet<String>,
    targets: HashMap<String, String>,
}

impl ValidationRules {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from properties text: one `id=path,path` entry per line,
    /// `:` accepted as the separator, `#` and `!` starting comments.
    ///
    /// # Errors
    ///
    /// Returns an error for a line without a separator or a malformed target.
    pub fn from_properties(text: &str) -> Result<Self, CompilationError> {
        let mut rules = Self::new();
        rules.extend_from_properties(text)?;
        Ok(rules)
    }

    /// Parse more rules from properties text into this registry.
    ///
    /// # Errors
    ///
    /// Returns an error for a line without a separator or a malformed target.
    pub fn extend_from_properties(&mut self, text: &str) -> Result<(), CompilationError> {
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((id, targets)) = line.split_once(['=', ':']) else {
                return Err(CompilationError::new(format!(
                    "line {}: expected `rule_id=package.Message.field,...`, got `{line}`",
                    number + 1
                )));
            };
            let targets = targets.split(',').map(str::trim).filter(|t| !t.is_empty());
            self.add(ValidationRule::new(id.trim(), targets)?);
        }
        Ok(())
    }

    /// Register a rule. Returns false, leaving the registry unchanged, if a
    /// rule with the same id is already present.
    pub fn add(&mut self, rule: ValidationRule) -> bool {
        if !self.ids.insert(rule.id.clone()) {
            debug!(rule = %rule.id, "ignoring duplicate validation rule");
            return false;
        }
        for target in &rule.targets {
            self.targets
                .entry(target.clone())
                .or_insert_with(|| rule.id.clone());
        }
        self.rules.push(rule);
        true
    }

    /// The registered rules, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationRule> {
        self.rules.iter()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the id of the rule targeting the field with the given full name.
    pub(crate) fn rule_for(&self, field_full_name: &str) -> Option<&str> {
        self.targets.get(field_full_name).map(String::as_str)
    }

    /// Check that every target whose message type is in `pool` names one of
    /// its fields. Targets of types the pool does not know belong to other
    /// schemas and are skipped.
    pub(crate) fn verify(&self, pool: &DescriptorPool) -> Result<(), CompilationError> {
        for rule in &self.rules {
            for target in &rule.targets {
                let Some((message, field)) = split_target(target) else {
                    continue;
                };
                let Some(message) = pool.get_message_by_name(message) else {
                    continue;
                };
                if message.get_field_by_name(field).is_none() {
                    return Err(CompilationError::new(format!(
                        "validation rule `{}` targets unknown field `{target}`",
                        rule.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn split_target(target: &str) -> Option<(&str, &str)> {
    let (message, field) = target.rsplit_once('.')?;
    if message.is_empty() || field.is_empty() || message.split('.').any(str::is_empty) {
        return None;
    }
    Some((message, field))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing;

    #[test]
    fn properties_are_split_on_commas() {
        let rules = ValidationRules::from_properties(
            "# comment\n\
             ! another comment\n\
             \n\
             outer_inner = test.Outer.inner, test.Outer.inners\n\
             holder: test.Holder.payload\n",
        )
        .expect("properties parse");

        assert_eq!(rules.len(), 2);
        let first = rules.iter().next().expect("first rule");
        assert_eq!(first.id(), "outer_inner");
        assert_eq!(first.targets(), ["test.Outer.inner", "test.Outer.inners"]);
        assert_eq!(rules.rule_for("test.Holder.payload"), Some("holder"));
        assert_eq!(rules.rule_for("test.Outer.label"), None);
    }

    #[test]
    fn first_occurrence_of_an_id_wins() {
        let rules = ValidationRules::from_properties(
            "dup=test.Outer.inner\n\
             dup=test.Outer.inners\n",
        )
        .expect("properties parse");

        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rule_for("test.Outer.inner"), Some("dup"));
        assert_eq!(rules.rule_for("test.Outer.inners"), None);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let err = ValidationRules::from_properties("no separator here")
            .expect_err("line without separator");
        assert!(err.cause.contains("line 1"));

        let err = ValidationRules::from_properties("rule=justafield")
            .expect_err("target without message");
        assert!(err.cause.contains("justafield"));

        assert!(ValidationRule::new(" ", ["test.Outer.inner"]).is_err());
    }

    #[test]
    fn verify_resolves_targets_against_the_pool() {
        let rules = ValidationRules::from_properties("ok=test.Outer.inner").expect("parse");
        assert!(rules.verify(testing::pool()).is_ok());

        let rules = ValidationRules::from_properties("missing_field=test.Outer.nope").expect("parse");
        let err = rules.verify(testing::pool()).expect_err("unknown field");
        assert!(err.cause.contains("test.Outer.nope"));

        let rules = ValidationRules::from_properties("other_schema=test.Nope.inner").expect("parse");
        assert!(rules.verify(testing::pool()).is_ok());
    }
}
