//! Decorator contract and two-tier decorator catalog.
//!
//! This module provides the plugin architecture that allows decorator
//! implementations to be registered by name and resolved during stage
//! execution, with a scoped tier searched before a shared fallback tier.

use std::collections::HashMap;
use std::fmt;
use serde_json::Value;

use crate::context::{DecorationContext, PreloadedData};

/// Error type for decoration operations
#[derive(Debug, Clone)]
pub enum DecorationError {
    NotFound(String),
    ExecutionError(String),
    InvalidConfig(String),
}

impl fmt::Display for DecorationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecorationError::NotFound(name) => write!(f, "Decorator not found: {}", name),
            DecorationError::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
            DecorationError::InvalidConfig(msg) => write!(f, "Invalid pipeline config: {}", msg),
        }
    }
}

impl std::error::Error for DecorationError {}

/// Trait for decorator implementations
///
/// A decorator exposes exactly one operation: transform a value given the
/// call's context and any preloaded batch data. Decorators are opaque to the
/// engine; what they wrap or augment is entirely their own concern.
pub trait Decorator: Send + Sync {
    /// Apply the decoration to a value
    ///
    /// # Arguments
    /// * `value` - The value to decorate (the cumulative output of prior stages)
    /// * `context` - Context for this decoration call, already augmented by context rules
    /// * `preloaded` - Batch-scoped preloaded data, absent when no preload rules ran
    ///
    /// # Returns
    /// * `Ok(value)` - The decorated value
    /// * `Err(DecorationError)` - Decoration failed
    fn decorate(
        &self,
        value: Value,
        context: &DecorationContext,
        preloaded: Option<&PreloadedData>,
    ) -> Result<Value, DecorationError>;
}

/// Simple function-based implementation of Decorator
impl<F> Decorator for F
where
    F: Fn(Value, &DecorationContext, Option<&PreloadedData>) -> Result<Value, DecorationError>
        + Send
        + Sync,
{
    fn decorate(
        &self,
        value: Value,
        context: &DecorationContext,
        preloaded: Option<&PreloadedData>,
    ) -> Result<Value, DecorationError> {
        self(value, context, preloaded)
    }
}

/// Two-tier catalog mapping decorator identifiers to implementations.
///
/// Resolution tries the scoped tier first, then the fallback tier. The
/// scoped tier holds decorators registered for one decoratable type; the
/// fallback tier holds shared decorators usable from any pipeline. A miss
/// in both tiers is a fatal lookup error, never silently skipped.
pub struct DecoratorCatalog {
    scoped: HashMap<String, Box<dyn Decorator>>,
    fallback: HashMap<String, Box<dyn Decorator>>,
}

impl DecoratorCatalog {
    /// Create a new empty decorator catalog
    pub fn new() -> Self {
        Self {
            scoped: HashMap::new(),
            fallback: HashMap::new(),
        }
    }

    /// Register a decorator in the scoped tier
    ///
    /// # Example
    ///
    /// ```ignore
    /// use garnish::DecoratorCatalog;
    ///
    /// let mut catalog = DecoratorCatalog::new();
    /// catalog.register("UppercaseDecorator", Box::new(|value, _ctx, _pre| {
    ///     let text = value.as_str().unwrap_or_default().to_uppercase();
    ///     Ok(serde_json::Value::String(text))
    /// }));
    /// ```
    pub fn register(&mut self, name: impl Into<String>, decorator: Box<dyn Decorator>) {
        self.scoped.insert(name.into(), decorator);
    }

    /// Register a decorator in the shared fallback tier
    ///
    /// Fallback decorators are found only when no scoped decorator has the
    /// same name.
    pub fn register_fallback(&mut self, name: impl Into<String>, decorator: Box<dyn Decorator>) {
        self.fallback.insert(name.into(), decorator);
    }

    /// Resolve a decorator identifier to an implementation
    ///
    /// # Arguments
    /// * `name` - Decorator identifier produced by stage resolution
    ///
    /// # Returns
    /// * `Ok(decorator)` - Found in the scoped or fallback tier
    /// * `Err(DecorationError::NotFound)` - Absent from both tiers
    pub fn resolve(&self, name: &str) -> Result<&dyn Decorator, DecorationError> {
        self.scoped
            .get(name)
            .or_else(|| self.fallback.get(name))
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| DecorationError::NotFound(name.to_string()))
    }

    /// Check if a decorator is registered in either tier
    pub fn has_decorator(&self, name: &str) -> bool {
        self.scoped.contains_key(name) || self.fallback.contains_key(name)
    }

    /// Get list of all registered decorator names across both tiers
    pub fn decorator_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scoped.keys().cloned().collect();
        for name in self.fallback.keys() {
            if !self.scoped.contains_key(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Get the number of distinct decorator names registered
    pub fn count(&self) -> usize {
        self.decorator_names().len()
    }
}

impl Default for DecoratorCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn passthrough() -> Box<dyn Decorator> {
        Box::new(
            |value: Value, _ctx: &DecorationContext, _pre: Option<&PreloadedData>| Ok(value),
        )
    }

    #[test]
    fn test_register_and_resolve_decorator() {
        let mut catalog = DecoratorCatalog::new();

        catalog.register(
            "UppercaseDecorator",
            Box::new(
                |value: Value, _ctx: &DecorationContext, _pre: Option<&PreloadedData>| {
                    let text = value
                        .as_str()
                        .ok_or_else(|| {
                            DecorationError::ExecutionError("Expected a string".to_string())
                        })?
                        .to_uppercase();
                    Ok(Value::String(text))
                },
            ) as Box<dyn Decorator>,
        );

        let decorator = catalog.resolve("UppercaseDecorator").unwrap();
        let ctx = DecorationContext::empty();
        let result = decorator.decorate(json!("hello"), &ctx, None).unwrap();

        assert_eq!(result, json!("HELLO"));
    }

    #[test]
    fn test_decorator_not_found() {
        let catalog = DecoratorCatalog::new();

        let result = catalog.resolve("nonexistent");

        assert!(matches!(result, Err(DecorationError::NotFound(_))));
    }

    #[test]
    fn test_fallback_tier_resolution() {
        let mut catalog = DecoratorCatalog::new();

        catalog.register_fallback(
            "SharedDecorator",
            Box::new(
                |_value: Value, _ctx: &DecorationContext, _pre: Option<&PreloadedData>| {
                    Ok(json!("from fallback"))
                },
            ) as Box<dyn Decorator>,
        );

        let decorator = catalog.resolve("SharedDecorator").unwrap();
        let ctx = DecorationContext::empty();
        let result = decorator.decorate(json!(null), &ctx, None).unwrap();

        assert_eq!(result, json!("from fallback"));
    }

    #[test]
    fn test_scoped_tier_shadows_fallback() {
        let mut catalog = DecoratorCatalog::new();

        catalog.register_fallback(
            "Decorator",
            Box::new(
                |_value: Value, _ctx: &DecorationContext, _pre: Option<&PreloadedData>| {
                    Ok(json!("fallback"))
                },
            ) as Box<dyn Decorator>,
        );
        catalog.register(
            "Decorator",
            Box::new(
                |_value: Value, _ctx: &DecorationContext, _pre: Option<&PreloadedData>| {
                    Ok(json!("scoped"))
                },
            ) as Box<dyn Decorator>,
        );

        let decorator = catalog.resolve("Decorator").unwrap();
        let ctx = DecorationContext::empty();
        let result = decorator.decorate(json!(null), &ctx, None).unwrap();

        assert_eq!(result, json!("scoped"));
        // Shadowed name counts once
        assert_eq!(catalog.count(), 1);
    }

    #[test]
    fn test_has_decorator() {
        let mut catalog = DecoratorCatalog::new();

        catalog.register("ScopedOne", passthrough());
        catalog.register_fallback("SharedOne", passthrough());

        assert!(catalog.has_decorator("ScopedOne"));
        assert!(catalog.has_decorator("SharedOne"));
        assert!(!catalog.has_decorator("OtherOne"));
    }
}
