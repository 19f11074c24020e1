//! # Garnish: Conditional Decoration Pipeline
//!
//! Garnish applies an ordered chain of named, conditionally-gated decorator
//! stages to structured records, with batch-aware preloading so a collection
//! shares one computed lookup cache instead of re-fetching per item.
//!
//! ## Features
//!
//! - **Ordered stage registry**: Stages run in registration order; re-registering
//!   a name replaces the stage without moving its position
//! - **Conditional gating**: Fixed-target stages with record or record+context
//!   predicates, or dynamic stages that pick their decorator per record
//! - **Two-tier decorator catalog**: Scoped decorators shadow a shared fallback tier
//! - **Context rules**: Derive per-call context values before any stage runs
//! - **Preload rules**: Compute batch-scoped data exactly once per collection call
//! - **Declarative configuration**: Define fixed-target pipelines in YAML
//!
//! ## Example: YAML pipeline
//!
//! ```yaml
//! pipeline:
//!   stages:
//!     - name: status_badge
//!       decorator: BadgeDecorator
//!       when:
//!         field: status
//!         equals: active
//!     - name: base
//!       decorator: DefaultDecorator
//! ```
//!
//! ## Example: decorating a batch
//!
//! ```
//! use serde_json::json;
//! use garnish::{DecorationPipeline, DecorationRules, DecoratorCatalog, StageRule};
//!
//! let mut catalog = DecoratorCatalog::new();
//! catalog.register("CountDecorator", Box::new(
//!     |mut value: serde_json::Value, _ctx: &garnish::DecorationContext,
//!      pre: Option<&garnish::PreloadedData>| {
//!         value["total"] = pre.and_then(|p| p.get("total").cloned()).unwrap_or_default();
//!         Ok(value)
//!     },
//! ) as Box<dyn garnish::Decorator>);
//!
//! let mut rules = DecorationRules::new();
//! rules.register_preload("total", Box::new(|records, _ctx, _pre| json!(records.len())));
//! rules.register_stage("count", StageRule::fixed("CountDecorator"));
//!
//! let pipeline = DecorationPipeline::new(rules, catalog);
//! let decorated = pipeline.decorate_collection(&[json!({}), json!({})]).unwrap();
//! assert_eq!(decorated[0]["total"], json!(2));
//! ```

// Core modules
pub mod context;
pub mod decorator;
pub mod path;
pub mod rules;
pub mod pipeline;

// Declarative pipeline configuration
pub mod config;

// Re-export key types
pub use context::{DecorationContext, PreloadedData};
pub use decorator::{Decorator, DecoratorCatalog, DecorationError};
pub use path::{FieldPath, PathSegment};
pub use rules::{Condition, ContextFn, DecorationRules, NameResolver, PreloadFn, StageRule};
pub use pipeline::DecorationPipeline;
pub use config::{ConditionDef, PipelineConfig, StageDef};
