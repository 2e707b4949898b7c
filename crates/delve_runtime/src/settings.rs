//! Runtime settings

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use delve_core::WorldConfig;
use serde::{Deserialize, Serialize};

/// Headless runtime settings, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub world: WorldConfig,
    /// Frames to simulate before shutting down.
    pub frames: u64,
    pub tick_hz: u32,
    /// Log a frame summary every N frames. Zero disables it.
    pub log_every: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            frames: 600,
            tick_hz: delve_core::time::TICK_RATE_HZ,
            log_every: 120,
        }
    }
}

impl RuntimeSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text).context("malformed runtime settings")?;
        settings.world.validate()?;
        Ok(settings)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("loading {}", path.display()))
    }
}
