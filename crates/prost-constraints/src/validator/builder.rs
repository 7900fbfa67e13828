use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use prost_reflect::{FieldDescriptor, MessageDescriptor};
use tracing::{debug, warn};

use prost_constraints_types::FieldConstraintsExt;

use crate::catalog::ConstraintSource;
use crate::error::CompilationError;
use crate::field::{Cardinality, FieldCategory};
use crate::registry::ValidationRules;

use super::evaluator::Evaluator;
use super::evaluator::field::{EntityId, FieldEval};
use super::evaluator::list::ListEval;
use super::evaluator::map::MapEval;
use super::evaluator::message::MessageEval;
use super::evaluator::oneof::OneofEval;
use super::evaluator::value::FieldValidator;
use super::lookups;
use super::rules::repeated::DistinctRuleEval;

/// Build-through cache of message evaluators keyed by descriptor full name.
pub(crate) struct Builder {
    /// Serializes cache writes.
    build_lock: Mutex<()>,
    /// Evaluator cache.
    cache: RwLock<HashMap<String, Arc<MessageEval>>>,
    /// Whether unknown types can be lazily built.
    lazy: bool,
    /// Where constraint catalogs are read from.
    source: Arc<dyn ConstraintSource>,
    /// Rules adding `valid` to fields from outside the schema.
    rules: ValidationRules,
}

impl Builder {
    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<MessageEval>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<MessageEval>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_build(&self) -> MutexGuard<'_, ()> {
        self.build_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn new(lazy: bool, source: Arc<dyn ConstraintSource>, rules: ValidationRules) -> Self {
        Self {
            build_lock: Mutex::new(()),
            cache: RwLock::new(HashMap::new()),
            lazy,
            source,
            rules,
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Load a cached evaluator or build a new one.
    pub fn load_or_build(&self, desc: &MessageDescriptor) -> Arc<MessageEval> {
        let key = desc.full_name().to_string();

        // Fast path
        if let Some(eval) = self.read_cache().get(&key) {
            return Arc::clone(eval);
        }

        if !self.lazy {
            let eval = Arc::new(MessageEval::new());
            eval.set_err(CompilationError::new(format!(
                "no evaluator available for {key}; lazy compilation is disabled"
            )));
            return eval;
        }

        // Slow path
        let _guard = self.lock_build();
        if let Some(eval) = self.read_cache().get(&key) {
            return Arc::clone(eval);
        }

        let mut local_cache = self.read_cache().clone();
        let eval = self.build(desc, &mut local_cache);
        *self.write_cache() = local_cache;

        eval
    }

    /// Preload an evaluator into the cache, even when lazy compilation is disabled.
    pub fn preload(&self, desc: &MessageDescriptor) {
        let key = desc.full_name().to_string();
        if self.read_cache().contains_key(&key) {
            return;
        }

        let _guard = self.lock_build();
        if self.read_cache().contains_key(&key) {
            return;
        }

        let mut local_cache = self.read_cache().clone();
        let _ = self.build(desc, &mut local_cache);
        *self.write_cache() = local_cache;
    }

    /// Build an evaluator for a message descriptor.
    /// Recursive types are handled by inserting a placeholder Arc before recursing.
    fn build(
        &self,
        desc: &MessageDescriptor,
        cache: &mut HashMap<String, Arc<MessageEval>>,
    ) -> Arc<MessageEval> {
        let key = desc.full_name().to_string();

        if let Some(eval) = cache.get(&key) {
            return Arc::clone(eval);
        }

        let eval = Arc::new(MessageEval::new());
        cache.insert(key, Arc::clone(&eval));
        if let Err(err) = self.build_message(desc, &eval, cache) {
            eval.set_err(err);
        }
        debug!(
            message = desc.full_name(),
            error = ?eval.compilation_error().map(|e| e.cause),
            "compiled message constraints"
        );
        eval
    }

    fn build_message(
        &self,
        desc: &MessageDescriptor,
        msg_eval: &Arc<MessageEval>,
        cache: &mut HashMap<String, Arc<MessageEval>>,
    ) -> Result<(), CompilationError> {
        let is_entity = self
            .source
            .message_constraints(desc)?
            .and_then(|c| c.entity)
            .unwrap_or(false);
        let id_field = if is_entity {
            lookups::entity_id_field(desc)
        } else {
            None
        };

        for oneof in desc.oneofs().filter(|o| !o.is_synthetic()) {
            let required = self
                .source
                .oneof_constraints(&oneof)?
                .and_then(|c| c.required)
                .unwrap_or(false);
            msg_eval.append_oneof(OneofEval {
                descriptor: oneof,
                required,
            });
        }

        for field in desc.fields() {
            let entity_id = match &id_field {
                Some(id) if id.number() == field.number() => {
                    if lookups::is_permitted_entity_id(&field) {
                        EntityId::Permitted
                    } else {
                        EntityId::Forbidden
                    }
                }
                _ => EntityId::None,
            };
            msg_eval.append_field(self.build_field(&field, entity_id, cache)?);
        }
        Ok(())
    }

    fn build_field(
        &self,
        field: &FieldDescriptor,
        entity_id: EntityId,
        cache: &mut HashMap<String, Arc<MessageEval>>,
    ) -> Result<FieldEval, CompilationError> {
        let mut constraints = self.source.field_constraints(field)?.unwrap_or_default();
        if let Some(rule) = self.rules.rule_for(field.full_name()) {
            debug!(field = field.full_name(), rule, "validation rule marks field as valid");
            constraints.valid = Some(true);
        }

        let category = FieldCategory::of(field);
        let cardinality = Cardinality::of(field);

        let implicit = entity_id != EntityId::None && constraints.required != Some(false);
        let mut required = constraints.required == Some(true) || implicit;
        if required && category == FieldCategory::Bool && cardinality == Cardinality::Singular {
            if constraints.required == Some(true) {
                warn!(
                    field = field.full_name(),
                    "`required` has no effect on a bool field"
                );
            }
            required = false;
        }

        let nested = match (constraints.valid, category) {
            (Some(true), FieldCategory::Message) => {
                lookups::element_message(field).map(|message| self.build(&message, cache))
            }
            _ => None,
        };
        let validator = FieldValidator::new(field, &constraints, nested)?;
        let distinct = (constraints.distinct == Some(true)).then_some(DistinctRuleEval);
        let value: Box<dyn Evaluator> = match cardinality {
            Cardinality::Singular => Box::new(validator),
            Cardinality::Repeated => Box::new(ListEval {
                item: validator,
                distinct,
            }),
            Cardinality::Map => Box::new(MapEval {
                value: validator,
                distinct,
            }),
        };

        Ok(FieldEval {
            descriptor: field.clone(),
            value,
            required,
            missing_msg: constraints.missing_msg.clone(),
            set_once: constraints.set_once == Some(true),
            entity_id,
            oneof_member: field.real_oneof().is_some(),
        })
    }
}
