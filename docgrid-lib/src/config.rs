//! Table model configuration

use std::num::NonZeroUsize;

use serde::Deserialize;
use serde::Serialize;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::ConfigError;
use crate::model::JsonOptions;

/// Configuration for a table model.
///
/// Fixed when the model is constructed.
///
/// # Example
///
/// ```
/// use docgrid_lib::ModelConfig;
///
/// let config = ModelConfig::default()
///     .with_max_nesting(2)
///     .with_cache_capacity(200);
///
/// let loaded = ModelConfig::from_json(r#"{ "max_nesting": 1 }"#).unwrap();
/// assert_eq!(loaded.cache_capacity, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// How many levels of embedded documents are expanded into columns.
    ///
    /// Default: 0 (top-level keys only)
    pub max_nesting: usize,

    /// Maximum number of documents kept in the row cache.
    ///
    /// Default: 50
    pub cache_capacity: usize,

    /// Name of the unique identifier field, always the first known column.
    ///
    /// Default: `_id`
    pub id_field: String,

    /// Formatting options for detail rendering.
    pub json: JsonOptions,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_nesting: 0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            id_field: "_id".to_string(),
            json: JsonOptions::default(),
        }
    }
}

impl ModelConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from JSON, filling in defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the nesting depth.
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Sets the row cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the identifier field name.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Sets the detail formatting options.
    pub fn with_json_options(mut self, json: JsonOptions) -> Self {
        self.json = json;
        self
    }

    /// Checks the config and returns the cache capacity as a non-zero size.
    pub fn validate(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.cache_capacity)
            .ok_or(ConfigError::InvalidCacheCapacity(self.cache_capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JsonMode;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.max_nesting, 0);
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.id_field, "_id");
        assert_eq!(config.json.indent, 2);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let config = ModelConfig::default().with_cache_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCacheCapacity(0))
        ));
    }

    #[test]
    fn test_from_json_partial() {
        let config = ModelConfig::from_json(
            r#"{ "max_nesting": 2, "json": { "mode": "canonical" } }"#,
        )
        .unwrap();
        assert_eq!(config.max_nesting, 2);
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.json.mode, JsonMode::Canonical);
        assert_eq!(config.json.indent, 2);
    }

    #[test]
    fn test_from_json_rejects_zero_capacity() {
        assert!(ModelConfig::from_json(r#"{ "cache_capacity": 0 }"#).is_err());
        assert!(matches!(
            ModelConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
