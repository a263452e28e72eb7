//! Stage Registry - Dynamic stage creation
//!
//! The registry maps stage type names to factories, so pipelines can be
//! assembled from TOML.
//!
//! # Example
//!
//! ```
//! use sluice_transform::{StageConfig, default_registry};
//!
//! let registry = default_registry();
//! let stage = registry.create("noop", &StageConfig::new()).unwrap();
//! assert_eq!(stage.name(), "noop");
//! ```

use crate::set_fields::{SetFieldsStage, Target};
use crate::{Chain, NoopStage, Stage, TagStage, TransformError, TransformResult};
use sluice_config::StageInstanceConfig;
use std::collections::HashMap;
use tracing::debug;

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Options passed to stage factories
///
/// The `type` and `enabled` keys are consumed by the registry; everything
/// else is interpreted by the factory.
pub type StageConfig = HashMap<String, toml::Value>;

/// Factory trait for creating stages
pub trait StageFactory: Send + Sync {
    /// Create a stage instance from its options
    ///
    /// # Errors
    /// Returns `TransformError::Config` if the options are invalid
    fn create(&self, config: &StageConfig) -> TransformResult<Box<dyn Stage>>;

    /// Type name this factory builds
    fn name(&self) -> &'static str;
}

/// Registry for stage factories
#[derive(Default)]
pub struct StageRegistry {
    factories: HashMap<String, Box<dyn StageFactory>>,
}

impl StageRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage factory
    ///
    /// # Errors
    /// Fails if a factory is already registered with this name.
    pub fn register<F: StageFactory + 'static>(
        &mut self,
        type_name: &str,
        factory: F,
    ) -> TransformResult<()> {
        if self.factories.contains_key(type_name) {
            return Err(TransformError::DuplicateFactory(type_name.to_string()));
        }
        self.factories
            .insert(type_name.to_string(), Box::new(factory));
        Ok(())
    }

    /// Create a stage from its type name and options
    pub fn create(&self, type_name: &str, config: &StageConfig) -> TransformResult<Box<dyn Stage>> {
        let factory = self.factories.get(type_name).ok_or_else(|| {
            TransformError::UnknownStageType {
                stage_type: type_name.to_string(),
                available: self.available_types().join(", "),
            }
        })?;

        factory.create(config)
    }

    /// Check if a stage type is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered stage types, sorted
    pub fn available_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Build a chain from stage configs, skipping disabled entries
pub fn build_chain(
    registry: &StageRegistry,
    stages: &[StageInstanceConfig],
) -> TransformResult<Chain> {
    let mut built = Vec::with_capacity(stages.len());
    for config in stages.iter().filter(|c| c.enabled) {
        let stage = registry.create(&config.stage_type, &config.options)?;
        debug!(stage_type = %config.stage_type, name = stage.name(), "built stage");
        built.push(stage);
    }
    Ok(Chain::new(built))
}

fn name_option(config: &StageConfig) -> TransformResult<Option<String>> {
    match config.get("name") {
        None => Ok(None),
        Some(toml::Value::String(s)) if !s.is_empty() => Ok(Some(s.clone())),
        Some(_) => Err(TransformError::config("name must be a non-empty string")),
    }
}

fn table_option<'a>(config: &'a StageConfig, key: &str) -> TransformResult<&'a toml::Table> {
    config
        .get(key)
        .and_then(|v| v.as_table())
        .ok_or_else(|| TransformError::config(format!("'{}' must be a table", key)))
}

/// Factory for [`NoopStage`]
#[derive(Debug, Clone, Copy)]
pub struct NoopFactory;

impl StageFactory for NoopFactory {
    fn create(&self, config: &StageConfig) -> TransformResult<Box<dyn Stage>> {
        Ok(Box::new(match name_option(config)? {
            Some(name) => NoopStage::named(name),
            None => NoopStage::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Factory for [`SetFieldsStage`]
#[derive(Debug, Clone, Copy)]
pub struct SetFieldsFactory;

impl StageFactory for SetFieldsFactory {
    fn create(&self, config: &StageConfig) -> TransformResult<Box<dyn Stage>> {
        let table = table_option(config, "fields")?;
        let mut values = serde_json::Map::with_capacity(table.len());
        for (key, value) in table {
            let value = serde_json::to_value(value)
                .map_err(|e| TransformError::config(format!("field '{}': {}", key, e)))?;
            values.insert(key.clone(), value);
        }

        let mut stage = SetFieldsStage::new(values);
        if let Some(target) = config.get("target").and_then(|v| v.as_str()) {
            stage = stage.with_target(Target::parse(target)?);
        }
        if let Some(overwrite) = config.get("overwrite").and_then(|v| v.as_bool()) {
            stage = stage.with_overwrite(overwrite);
        }
        if let Some(name) = name_option(config)? {
            stage = stage.with_name(name);
        }
        Ok(Box::new(stage))
    }

    fn name(&self) -> &'static str {
        "set_fields"
    }
}

/// Factory for [`TagStage`]
#[derive(Debug, Clone, Copy)]
pub struct TagFactory;

impl StageFactory for TagFactory {
    fn create(&self, config: &StageConfig) -> TransformResult<Box<dyn Stage>> {
        let table = table_option(config, "tags")?;
        let tags = table.iter().map(|(k, v)| {
            let value = match v {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        });

        let mut stage = TagStage::new(tags);
        if let Some(name) = name_option(config)? {
            stage = stage.with_name(name);
        }
        Ok(Box::new(stage))
    }

    fn name(&self) -> &'static str {
        "tag"
    }
}

/// Create a registry with every built-in stage registered
///
/// Includes:
/// - `noop` - Pass-through stage
/// - `set_fields` - Attach static values
/// - `tag` - Add event tags
pub fn default_registry() -> StageRegistry {
    let mut registry = StageRegistry::new();
    for factory in [
        Box::new(NoopFactory) as Box<dyn StageFactory>,
        Box::new(SetFieldsFactory),
        Box::new(TagFactory),
    ] {
        registry
            .factories
            .insert(factory.name().to_string(), factory);
    }
    registry
}
