//! Pipeline configuration loader.
//!
//! Loads declarative stage definitions from YAML and compiles them into a
//! [`DecorationRules`] registry. Declarative stages cover the fixed-target
//! form with field-based conditions; dynamic stages and context/preload
//! rules are code and stay in the registration API.

use std::fs;
use std::path::Path;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::FieldPath;
use crate::rules::{Condition, DecorationRules, StageRule};

/// Declarative pipeline definition loaded from YAML.
///
/// # Example
/// ```yaml
/// pipeline:
///   stages:
///     - name: status_badge
///       decorator: BadgeDecorator
///       when:
///         field: status
///         equals: active
///     - name: homepage_link
///       decorator: LinkDecorator
///       when:
///         field: url
///         matches: "^https?://"
///     - name: base
///       decorator: DefaultDecorator
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stage definitions in pipeline order
    pub stages: Vec<StageDef>,
}

/// One declarative stage definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDef {
    /// Stage name (unique identifier; a repeated name overwrites the earlier
    /// definition but keeps its position, matching registry semantics)
    pub name: String,

    /// Decorator identifier to invoke when the stage applies
    pub decorator: String,

    /// Optional gating condition; an absent condition always applies
    #[serde(default)]
    pub when: Option<ConditionDef>,
}

/// Declarative stage condition over one record field.
///
/// Exactly one form per condition:
/// - `equals` present: the field's value must equal it
/// - `matches` present: the field's string value must match the regex
/// - neither: the field must be present and non-null
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDef {
    /// Dotted path to the record field the condition tests
    pub field: String,

    /// Expected value for equality comparison
    #[serde(default)]
    pub equals: Option<Value>,

    /// Regex the field's string value must match
    #[serde(default)]
    pub matches: Option<String>,
}

impl PipelineConfig {
    /// Load a pipeline configuration from a YAML file.
    ///
    /// # Arguments
    /// * `path` - Path to the pipeline YAML file
    ///
    /// # Returns
    /// Validated pipeline configuration
    ///
    /// # Errors
    /// Returns error if the file doesn't exist or has invalid format
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read pipeline file {}: {}", path.display(), e))?;

        Self::from_yaml(&contents)
    }

    /// Parse a pipeline configuration from a YAML string.
    ///
    /// # Errors
    /// Returns error if the YAML is malformed or fails validation
    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        // Parse YAML
        let yaml: serde_yaml::Value = serde_yaml::from_str(contents)
            .map_err(|e| format!("Failed to parse YAML: {}", e))?;

        // Validate structure
        let pipeline_yaml = yaml
            .get("pipeline")
            .ok_or_else(|| "Pipeline YAML missing 'pipeline' field".to_string())?;

        // Deserialize pipeline definition
        let config: PipelineConfig = serde_yaml::from_value(pipeline_yaml.clone())
            .map_err(|e| format!("Failed to parse pipeline definition: {}", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the pipeline definition.
    ///
    /// Checks:
    /// - Stage names and decorator identifiers are not empty
    /// - Condition fields are not empty
    /// - `equals` and `matches` are not combined on one condition
    /// - `matches` patterns compile
    fn validate(&self) -> Result<(), String> {
        for stage in &self.stages {
            if stage.name.is_empty() {
                return Err("Stage name cannot be empty".to_string());
            }

            if stage.decorator.is_empty() {
                return Err(format!("Stage '{}' has an empty decorator name", stage.name));
            }

            if let Some(when) = &stage.when {
                if when.field.is_empty() {
                    return Err(format!("Stage '{}' condition has an empty field", stage.name));
                }

                if when.equals.is_some() && when.matches.is_some() {
                    return Err(format!(
                        "Stage '{}' condition combines 'equals' and 'matches'",
                        stage.name
                    ));
                }

                if let Some(pattern) = &when.matches {
                    Regex::new(pattern).map_err(|e| {
                        format!("Stage '{}' has an invalid pattern: {}", stage.name, e)
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Compile the definitions into a decoration rule registry.
    ///
    /// # Returns
    /// A `DecorationRules` with one fixed-target stage per definition, in
    /// definition order
    ///
    /// # Errors
    /// Returns error if a condition fails to compile
    pub fn into_rules(self) -> Result<DecorationRules, String> {
        let mut rules = DecorationRules::new();

        for stage in self.stages {
            let rule = match stage.when {
                None => StageRule::fixed(stage.decorator),
                Some(when) => {
                    let condition = compile_condition(&stage.name, when)?;
                    StageRule::fixed_when(stage.decorator, condition)
                }
            };
            rules.register_stage(stage.name, rule);
        }

        Ok(rules)
    }

    /// Get the number of stage definitions.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Compile a declarative condition into a record predicate.
fn compile_condition(stage_name: &str, def: ConditionDef) -> Result<Condition, String> {
    let path = FieldPath::from_dotted(&def.field);

    if let Some(expected) = def.equals {
        return Ok(Condition::record(move |record| {
            path.lookup(record) == Some(&expected)
        }));
    }

    if let Some(pattern) = def.matches {
        let regex = Regex::new(&pattern)
            .map_err(|e| format!("Stage '{}' has an invalid pattern: {}", stage_name, e))?;
        return Ok(Condition::record(move |record| {
            path.lookup(record)
                .and_then(|value| value.as_str())
                .map(|text| regex.is_match(text))
                .unwrap_or(false)
        }));
    }

    // No comparison form: the field must be present and non-null
    Ok(Condition::record(move |record| {
        path.lookup(record).map(|value| !value.is_null()).unwrap_or(false)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DecorationContext;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    const PIPELINE_YAML: &str = r#"
pipeline:
  stages:
    - name: status_badge
      decorator: BadgeDecorator
      when:
        field: status
        equals: active
    - name: homepage_link
      decorator: LinkDecorator
      when:
        field: url
        matches: "^https?://"
    - name: base
      decorator: DefaultDecorator
"#;

    fn resolve(rules: &DecorationRules, stage: &str, record: &serde_json::Value) -> Option<String> {
        let ctx = DecorationContext::empty();
        rules
            .stages()
            .find(|(name, _)| name.as_str() == stage)
            .and_then(|(_, rule)| rule.resolve(record, &ctx))
    }

    #[test]
    fn test_parse_pipeline_config() {
        let config = PipelineConfig::from_yaml(PIPELINE_YAML).unwrap();

        assert_eq!(config.stage_count(), 3);
        assert_eq!(config.stages[0].name, "status_badge");
        assert_eq!(config.stages[0].decorator, "BadgeDecorator");
        assert!(config.stages[2].when.is_none());
    }

    #[test]
    fn test_missing_pipeline_key() {
        let result = PipelineConfig::from_yaml("stages: []");

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("missing 'pipeline' field"));
    }

    #[test]
    fn test_validate_empty_decorator() {
        let yaml = r#"
pipeline:
  stages:
    - name: broken
      decorator: ""
"#;
        let result = PipelineConfig::from_yaml(yaml);

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("empty decorator name"));
    }

    #[test]
    fn test_validate_conflicting_condition_forms() {
        let yaml = r#"
pipeline:
  stages:
    - name: broken
      decorator: SomeDecorator
      when:
        field: status
        equals: active
        matches: "act.*"
"#;
        let result = PipelineConfig::from_yaml(yaml);

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("combines 'equals' and 'matches'"));
    }

    #[test]
    fn test_validate_invalid_pattern() {
        let yaml = r#"
pipeline:
  stages:
    - name: broken
      decorator: SomeDecorator
      when:
        field: status
        matches: "["
"#;
        let result = PipelineConfig::from_yaml(yaml);

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("invalid pattern"));
    }

    #[test]
    fn test_compiled_equals_condition() {
        let config = PipelineConfig::from_yaml(PIPELINE_YAML).unwrap();
        let rules = config.into_rules().unwrap();

        assert_eq!(
            resolve(&rules, "status_badge", &json!({"status": "active"})),
            Some("BadgeDecorator".to_string())
        );
        assert_eq!(
            resolve(&rules, "status_badge", &json!({"status": "archived"})),
            None
        );
    }

    #[test]
    fn test_compiled_matches_condition() {
        let config = PipelineConfig::from_yaml(PIPELINE_YAML).unwrap();
        let rules = config.into_rules().unwrap();

        assert_eq!(
            resolve(&rules, "homepage_link", &json!({"url": "https://example.nz"})),
            Some("LinkDecorator".to_string())
        );
        assert_eq!(
            resolve(&rules, "homepage_link", &json!({"url": "ftp://example.nz"})),
            None
        );
        // A non-string field never matches
        assert_eq!(resolve(&rules, "homepage_link", &json!({"url": 7})), None);
    }

    #[test]
    fn test_present_condition() {
        let yaml = r#"
pipeline:
  stages:
    - name: avatar
      decorator: AvatarDecorator
      when:
        field: profile.avatar
"#;
        let rules = PipelineConfig::from_yaml(yaml).unwrap().into_rules().unwrap();

        assert_eq!(
            resolve(&rules, "avatar", &json!({"profile": {"avatar": "a.png"}})),
            Some("AvatarDecorator".to_string())
        );
        assert_eq!(
            resolve(&rules, "avatar", &json!({"profile": {"avatar": null}})),
            None
        );
        assert_eq!(resolve(&rules, "avatar", &json!({"profile": {}})), None);
    }

    #[test]
    fn test_rules_preserve_definition_order() {
        let config = PipelineConfig::from_yaml(PIPELINE_YAML).unwrap();
        let rules = config.into_rules().unwrap();

        assert_eq!(
            rules.stage_names(),
            vec!["status_badge", "homepage_link", "base"]
        );
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("pipeline.yaml");
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(PIPELINE_YAML.as_bytes()).unwrap();

        let config = PipelineConfig::load_from_file(&file_path).unwrap();

        assert_eq!(config.stage_count(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = PipelineConfig::load_from_file("/nonexistent/pipeline.yaml");

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to read pipeline file"));
    }
}
