//! Decoration rule shapes and the ordered rule registries.
//!
//! Provides the three rule kinds a decoratable type registers at setup time:
//! decorator stages, context derivations, and preload computations, each
//! keyed by a unique name in first-insertion order.

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::{DecorationContext, PreloadedData};

/// Compute function for a context rule: derives a context value from the
/// record being decorated and the context accumulated so far.
pub type ContextFn = Box<dyn Fn(&Value, &DecorationContext) -> Value + Send + Sync>;

/// Compute function for a preload rule: derives a batch-scoped value from
/// all records in the collection, the call context, and the results of
/// preload rules that ran earlier in the same pass.
pub type PreloadFn = Box<dyn Fn(&[Value], &DecorationContext, &PreloadedData) -> Value + Send + Sync>;

/// Gating predicate for a fixed-target stage.
///
/// The caller picks the shape at registration time: a predicate over the
/// record alone, or over the record and the call context.
pub enum Condition {
    /// Predicate over the record only
    Record(Box<dyn Fn(&Value) -> bool + Send + Sync>),
    /// Predicate over the record and the call context
    WithContext(Box<dyn Fn(&Value, &DecorationContext) -> bool + Send + Sync>),
}

impl Condition {
    /// Create a condition over the record only
    pub fn record(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Condition::Record(Box::new(f))
    }

    /// Create a condition over the record and context
    pub fn with_context(f: impl Fn(&Value, &DecorationContext) -> bool + Send + Sync + 'static) -> Self {
        Condition::WithContext(Box::new(f))
    }

    /// Evaluate the condition for a record
    pub fn evaluate(&self, record: &Value, context: &DecorationContext) -> bool {
        match self {
            Condition::Record(f) => f(record),
            Condition::WithContext(f) => f(record, context),
        }
    }
}

/// Name resolution function for a dynamic-target stage.
///
/// The return value doubles as the gating condition and the resolved
/// identifier: `None` or an empty name skips the stage, any other name is
/// the decorator identifier to invoke.
pub enum NameResolver {
    /// Resolver over the record only
    Record(Box<dyn Fn(&Value) -> Option<String> + Send + Sync>),
    /// Resolver over the record and the call context
    WithContext(Box<dyn Fn(&Value, &DecorationContext) -> Option<String> + Send + Sync>),
}

impl NameResolver {
    /// Create a resolver over the record only
    pub fn record(f: impl Fn(&Value) -> Option<String> + Send + Sync + 'static) -> Self {
        NameResolver::Record(Box::new(f))
    }

    /// Create a resolver over the record and context
    pub fn with_context(
        f: impl Fn(&Value, &DecorationContext) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        NameResolver::WithContext(Box::new(f))
    }

    /// Resolve a decorator name for a record
    pub fn resolve(&self, record: &Value, context: &DecorationContext) -> Option<String> {
        let name = match self {
            NameResolver::Record(f) => f(record),
            NameResolver::WithContext(f) => f(record, context),
        };

        // An empty name gates the stage off, same as no name at all
        name.filter(|n| !n.is_empty())
    }
}

/// One registered, conditionally-gated decorator slot in the pipeline.
///
/// A stage either names its decorator directly (optionally gated by a
/// condition) or resolves the name per record through a [`NameResolver`].
/// The two forms are mutually exclusive: a dynamic stage's resolver return
/// value is its gate, so it carries no separate condition.
pub enum StageRule {
    /// A literal decorator identifier, optionally gated
    Fixed {
        decorator: String,
        condition: Option<Condition>,
    },
    /// Per-record decorator selection
    Dynamic { resolver: NameResolver },
}

impl StageRule {
    /// Create an ungated stage with a fixed decorator identifier
    pub fn fixed(decorator: impl Into<String>) -> Self {
        StageRule::Fixed {
            decorator: decorator.into(),
            condition: None,
        }
    }

    /// Create a gated stage with a fixed decorator identifier
    pub fn fixed_when(decorator: impl Into<String>, condition: Condition) -> Self {
        StageRule::Fixed {
            decorator: decorator.into(),
            condition: Some(condition),
        }
    }

    /// Create a stage that resolves its decorator per record
    pub fn dynamic(resolver: NameResolver) -> Self {
        StageRule::Dynamic { resolver }
    }

    /// Decide whether this stage applies to a record, and with which decorator
    ///
    /// # Arguments
    /// * `record` - The record being decorated (the current fold carry)
    /// * `context` - Call context, already augmented by context rules
    ///
    /// # Returns
    /// * `Some(name)` - The stage applies; invoke the named decorator
    /// * `None` - The stage does not apply; the fold proceeds unchanged
    pub fn resolve(&self, record: &Value, context: &DecorationContext) -> Option<String> {
        match self {
            StageRule::Dynamic { resolver } => resolver.resolve(record, context),
            StageRule::Fixed {
                decorator,
                condition,
            } => match condition {
                None => Some(decorator.clone()),
                Some(cond) if cond.evaluate(record, context) => Some(decorator.clone()),
                Some(_) => None,
            },
        }
    }
}

/// Ordered registries for the three decoration rule kinds.
///
/// Each kind is an independent insert-or-overwrite mapping preserving
/// first-insertion order: re-registering a name replaces the rule but does
/// not move its position in the sequence. Registrations happen once during
/// type setup and are never retracted, so there is no remove operation.
#[derive(Default)]
pub struct DecorationRules {
    stages: IndexMap<String, StageRule>,
    context_rules: IndexMap<String, ContextFn>,
    preload_rules: IndexMap<String, PreloadFn>,
}

impl DecorationRules {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self {
            stages: IndexMap::new(),
            context_rules: IndexMap::new(),
            preload_rules: IndexMap::new(),
        }
    }

    /// Register a decorator stage
    ///
    /// Inserts or overwrites the stage for `name`. Overwriting keeps the
    /// stage's original position in the pipeline order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use garnish::{DecorationRules, StageRule, Condition};
    ///
    /// let mut rules = DecorationRules::new();
    /// rules.register_stage("badge", StageRule::fixed_when(
    ///     "BadgeDecorator",
    ///     Condition::record(|record| record["active"] == true),
    /// ));
    /// ```
    pub fn register_stage(&mut self, name: impl Into<String>, rule: StageRule) {
        self.stages.insert(name.into(), rule);
    }

    /// Register a context rule
    ///
    /// The rule's computed value is written into the call context under
    /// `name` before any stage runs.
    pub fn register_context(&mut self, name: impl Into<String>, compute: ContextFn) {
        self.context_rules.insert(name.into(), compute);
    }

    /// Register a preload rule
    ///
    /// The rule runs once per collection call, before any record is
    /// decorated; its result is stored under `name` in the batch's
    /// preloaded data.
    pub fn register_preload(&mut self, name: impl Into<String>, compute: PreloadFn) {
        self.preload_rules.insert(name.into(), compute);
    }

    /// Iterate stages in registration order
    pub fn stages(&self) -> impl Iterator<Item = (&String, &StageRule)> {
        self.stages.iter()
    }

    /// Iterate context rules in registration order
    pub fn context_rules(&self) -> impl Iterator<Item = (&String, &ContextFn)> {
        self.context_rules.iter()
    }

    /// Iterate preload rules in registration order
    pub fn preload_rules(&self) -> impl Iterator<Item = (&String, &PreloadFn)> {
        self.preload_rules.iter()
    }

    /// Check if a stage is registered
    pub fn has_stage(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// Get stage names in registration order
    pub fn stage_names(&self) -> Vec<&String> {
        self.stages.keys().collect()
    }

    /// Get the number of registered stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Get the number of registered context rules
    pub fn context_rule_count(&self) -> usize {
        self.context_rules.len()
    }

    /// Get the number of registered preload rules
    pub fn preload_rule_count(&self) -> usize {
        self.preload_rules.len()
    }
}
