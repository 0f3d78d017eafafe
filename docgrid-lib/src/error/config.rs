//! Model configuration errors

/// Errors produced while building or loading a model configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document cache must hold at least one entry.
    #[error("Cache capacity must be greater than zero, got {0}")]
    InvalidCacheCapacity(usize),

    /// The configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
