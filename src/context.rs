//! Shared mutable state threaded through a decoration call.
//!
//! Provides the per-call context mapping that context rules augment and
//! every stage observes, and the batch-scoped preloaded data mapping that
//! preload rules fill once per collection call.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Key→value context passed to every rule and decorator in a decoration call.
///
/// The context is supplied by the caller (or defaults to empty) and is
/// mutated in place by context-rule evaluation: each registered context rule
/// writes its computed value under its own name before any stage runs.
/// Callers must not assume the object they pass in is unchanged afterwards.
///
/// A collection call threads the *same* context through every item, so one
/// item's context-rule writes are visible to the items decorated after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationContext {
    /// Context fields: name -> value
    #[serde(default)]
    values: HashMap<String, serde_json::Value>,
}

impl DecorationContext {
    /// Create a context with initial fields.
    ///
    /// # Arguments
    /// * `values` - Initial context fields (e.g., current user, locale)
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    /// use garnish::DecorationContext;
    ///
    /// let mut fields = HashMap::new();
    /// fields.insert("locale".to_string(), serde_json::json!("en-NZ"));
    ///
    /// let ctx = DecorationContext::new(fields);
    /// ```
    pub fn new(values: HashMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Create an empty context.
    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get a context field by name.
    ///
    /// # Arguments
    /// * `key` - Field name
    ///
    /// # Returns
    /// `Some(value)` if the field exists, `None` otherwise
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Set a context field.
    ///
    /// # Arguments
    /// * `key` - Field name
    /// * `value` - Field value
    pub fn set(&mut self, key: String, value: serde_json::Value) {
        self.values.insert(key, value);
    }

    /// Check if a context field is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all context fields as a map.
    pub fn as_map(&self) -> &HashMap<String, serde_json::Value> {
        &self.values
    }

    /// Get the number of context fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the context has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert the context to JSON for serialization.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Create a context from JSON.
    ///
    /// # Arguments
    /// * `json` - JSON representation of a context
    pub fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json.clone())
    }
}

impl Default for DecorationContext {
    fn default() -> Self {
        Self::empty()
    }
}

/// Batch-scoped lookup cache filled by preload rules.
///
/// Preload rules run once per collection call, in registration order, each
/// writing its result under its own name. Later rules read results placed by
/// earlier rules in the same pass; the per-item decoration phase then reads
/// the finished mapping without further mutation.
///
/// When no preload rules are registered the per-item phase receives no
/// preloaded data at all (`None`), which is a distinct state from an empty
/// mapping. Decorator implementations must tolerate both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadedData {
    /// Preloaded results: preload rule name -> value
    #[serde(default)]
    values: HashMap<String, serde_json::Value>,
}

impl PreloadedData {
    /// Create an empty preloaded data mapping.
    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get a preloaded value by rule name.
    ///
    /// # Arguments
    /// * `key` - Preload rule name
    ///
    /// # Returns
    /// `Some(value)` if the rule has run, `None` otherwise
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Store a preloaded value.
    pub fn set(&mut self, key: String, value: serde_json::Value) {
        self.values.insert(key, value);
    }

    /// Check if a preloaded value is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get the number of preloaded values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no values have been preloaded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all preloaded values as a map.
    pub fn as_map(&self) -> &HashMap<String, serde_json::Value> {
        &self.values
    }
}

impl Default for PreloadedData {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_empty_context() {
        let ctx = DecorationContext::empty();
        assert_eq!(ctx.len(), 0);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_create_with_initial_fields() {
        let mut fields = HashMap::new();
        fields.insert("locale".to_string(), json!("en-NZ"));
        fields.insert("admin".to_string(), json!(true));

        let ctx = DecorationContext::new(fields);

        assert_eq!(ctx.get("locale"), Some(&json!("en-NZ")));
        assert_eq!(ctx.get("admin"), Some(&json!(true)));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_set_and_get_field() {
        let mut ctx = DecorationContext::empty();

        ctx.set("count".to_string(), json!(3));

        assert!(ctx.has("count"));
        assert!(!ctx.has("total"));
        assert_eq!(ctx.get("count"), Some(&json!(3)));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_set_overwrites_field() {
        let mut ctx = DecorationContext::empty();

        ctx.set("count".to_string(), json!(1));
        ctx.set("count".to_string(), json!(2));

        assert_eq!(ctx.get("count"), Some(&json!(2)));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_context_serialization() {
        let mut ctx = DecorationContext::empty();
        ctx.set("locale".to_string(), json!("en-NZ"));

        let json = ctx.to_json().expect("Should serialize");
        let ctx2 = DecorationContext::from_json(&json).expect("Should deserialize");

        assert_eq!(ctx2.get("locale"), Some(&json!("en-NZ")));
    }

    #[test]
    fn test_preloaded_data() {
        let mut preloaded = PreloadedData::empty();
        assert!(preloaded.is_empty());

        preloaded.set("comment_counts".to_string(), json!({"1": 4, "2": 0}));

        assert!(preloaded.has("comment_counts"));
        assert_eq!(preloaded.len(), 1);
        assert_eq!(
            preloaded.get("comment_counts"),
            Some(&json!({"1": 4, "2": 0}))
        );
        assert_eq!(preloaded.get("missing"), None);
    }
}
