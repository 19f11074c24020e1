//! Decoration pipeline: per-record engine and collection orchestrator.
//!
//! Coordinates decoration using:
//! - Decoration rules (ordered stages, context rules, preload rules)
//! - A decorator catalog (resolves stage identifiers to implementations)
//! - A decoration context threaded through every rule and stage
//!
//! # Example Flow
//! 1. Register decorators in a catalog, rules in a rule set
//! 2. Build a pipeline from both
//! 3. Decorate a record → context rules run, then the ordered stage fold
//! 4. Decorate a collection → preload rules run once, then every record

use serde_json::Value;

use crate::context::{DecorationContext, PreloadedData};
use crate::decorator::{DecorationError, DecoratorCatalog};
use crate::rules::DecorationRules;

/// Decoration pipeline for one decoratable type.
///
/// Owns the type's rule registries and its decorator catalog. Built once at
/// setup time and treated as read-only for the rest of the process; every
/// decoration call borrows it immutably.
pub struct DecorationPipeline {
    /// Ordered stage, context, and preload rules
    rules: DecorationRules,

    /// Decorator identifier -> implementation lookup
    catalog: DecoratorCatalog,
}

impl DecorationPipeline {
    /// Create a pipeline from registered rules and a decorator catalog.
    ///
    /// # Example
    /// ```ignore
    /// use garnish::{DecorationPipeline, DecorationRules, DecoratorCatalog};
    ///
    /// let mut rules = DecorationRules::new();
    /// let mut catalog = DecoratorCatalog::new();
    /// // ... register stages and decorators ...
    /// let pipeline = DecorationPipeline::new(rules, catalog);
    /// ```
    pub fn new(rules: DecorationRules, catalog: DecoratorCatalog) -> Self {
        Self { rules, catalog }
    }

    /// Decorate a single record with a fresh, empty context.
    ///
    /// Equivalent to [`decorate_with_context`](Self::decorate_with_context)
    /// with an empty context and an empty preloaded mapping.
    ///
    /// # Arguments
    /// * `record` - The record to decorate
    ///
    /// # Returns
    /// The record after the full stage fold
    ///
    /// # Errors
    /// Returns an error if a stage resolves to an unknown decorator or a
    /// decorator fails
    pub fn decorate(&self, record: Value) -> Result<Value, DecorationError> {
        let mut context = DecorationContext::empty();
        let preloaded = PreloadedData::empty();
        self.decorate_with_context(record, &mut context, Some(&preloaded))
    }

    /// Decorate a single record with a caller-supplied context.
    ///
    /// Runs in two phases:
    /// 1. Context augmentation: every context rule, in registration order,
    ///    computes a value from the record and the context so far, and writes
    ///    it into `context` under the rule's name. The caller's context
    ///    object is mutated in place.
    /// 2. Stage fold: every stage, in registration order, either applies its
    ///    decorator to the accumulated value or is skipped. Each applied
    ///    stage sees the cumulative output of all prior applied stages.
    ///
    /// # Arguments
    /// * `record` - The record to decorate
    /// * `context` - Call context (augmented in place by context rules)
    /// * `preloaded` - Batch-scoped preloaded data, if a preload phase ran
    ///
    /// # Returns
    /// The final fold carry
    ///
    /// # Errors
    /// Returns `DecorationError::NotFound` if a stage resolves to an
    /// identifier absent from the catalog, or the decorator's own error if
    /// decoration fails. A stage that does not apply is skipped silently.
    pub fn decorate_with_context(
        &self,
        record: Value,
        context: &mut DecorationContext,
        preloaded: Option<&PreloadedData>,
    ) -> Result<Value, DecorationError> {
        // Phase 1: context augmentation, in registration order
        for (name, compute) in self.rules.context_rules() {
            let value = compute(&record, context);
            context.set(name.clone(), value);
        }

        // Phase 2: stage fold
        let mut carry = record;
        for (stage_name, stage) in self.rules.stages() {
            let decorator_name = match stage.resolve(&carry, context) {
                Some(name) => name,
                None => {
                    tracing::trace!("Stage '{}' skipped", stage_name);
                    continue;
                }
            };

            let decorator = self.catalog.resolve(&decorator_name)?;
            carry = decorator.decorate(carry, context, preloaded)?;
            tracing::debug!("Stage '{}' applied decorator '{}'", stage_name, decorator_name);
        }

        Ok(carry)
    }

    /// Decorate a collection of records with a fresh, empty context.
    pub fn decorate_collection(&self, records: &[Value]) -> Result<Vec<Value>, DecorationError> {
        let mut context = DecorationContext::empty();
        self.decorate_collection_with_context(records, &mut context)
    }

    /// Decorate a collection of records with a caller-supplied context.
    ///
    /// Runs the preload phase exactly once for the whole batch, then
    /// decorates every record in input order with the same context object
    /// and the same preloaded data. Because the context is shared, one
    /// record's context-rule writes are visible to the records decorated
    /// after it.
    ///
    /// # Arguments
    /// * `records` - The batch to decorate
    /// * `context` - Call context shared by the preload phase and every item
    ///
    /// # Returns
    /// Decorated records in input order
    ///
    /// # Errors
    /// Returns the first error raised by the per-record engine
    pub fn decorate_collection_with_context(
        &self,
        records: &[Value],
        context: &mut DecorationContext,
    ) -> Result<Vec<Value>, DecorationError> {
        // Preload phase: once per batch, never once per record. Later rules
        // read results placed by earlier rules in the same pass.
        let preloaded = if self.rules.preload_rule_count() > 0 {
            let mut data = PreloadedData::empty();
            for (name, compute) in self.rules.preload_rules() {
                let value = compute(records, context, &data);
                data.set(name.clone(), value);
                tracing::debug!("Preload rule '{}' computed", name);
            }
            Some(data)
        } else {
            // No preload rules: the per-item phase receives no preloaded
            // data at all, not an empty mapping
            None
        };

        let mut decorated = Vec::with_capacity(records.len());
        for record in records {
            let result =
                self.decorate_with_context(record.clone(), context, preloaded.as_ref())?;
            decorated.push(result);
        }

        Ok(decorated)
    }

    /// Decorate a collection given as a JSON value.
    ///
    /// An array decorates item by item; anything else, including `null`,
    /// normalizes to the empty batch. Preload rules always receive a record
    /// slice, never a null.
    pub fn decorate_collection_value(
        &self,
        records: Value,
        context: &mut DecorationContext,
    ) -> Result<Vec<Value>, DecorationError> {
        match records {
            Value::Array(items) => self.decorate_collection_with_context(&items, context),
            _ => self.decorate_collection_with_context(&[], context),
        }
    }

    /// Get the pipeline's rule registries.
    pub fn rules(&self) -> &DecorationRules {
        &self.rules
    }

    /// Get the pipeline's decorator catalog.
    pub fn catalog(&self) -> &DecoratorCatalog {
        &self.catalog
    }
}
