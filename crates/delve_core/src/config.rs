//! World configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ceiling on simultaneously allocated handles.
pub const DEFAULT_CAPACITY: u32 = 4096;

/// Errors produced while loading or validating a [`WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse world config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("world capacity {capacity} is out of range (1..{max})", max = i32::MAX)]
    InvalidCapacity { capacity: u32 },
}

/// Static configuration for a [`World`](crate::ecs::World).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Hard ceiling on live handles. The pool never grows past it.
    pub capacity: u32,
}

impl WorldConfig {
    pub fn with_capacity(capacity: u32) -> Self {
        Self { capacity }
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sparse slots are stored as `i32`, which bounds the capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.capacity >= i32::MAX as u32 {
            return Err(ConfigError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
