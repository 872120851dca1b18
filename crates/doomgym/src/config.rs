//! Adapter configuration.

use crate::{EnvError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a `DoomEnv`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Scenario configuration file handed to the simulator
    pub scenario: PathBuf,
    /// Whether the simulator window is visible
    pub render: bool,
    /// Tics each `step` holds the chosen action for
    pub frame_skip: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("scenarios/basic.cfg"),
            render: false,
            frame_skip: 4,
        }
    }
}

impl EnvConfig {
    /// Create a config for the given scenario file with default settings
    pub fn new(scenario: impl Into<PathBuf>) -> Self {
        Self {
            scenario: scenario.into(),
            ..Default::default()
        }
    }

    /// Show or hide the simulator window
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Set the number of tics per step
    pub fn with_frame_skip(mut self, frame_skip: u32) -> Self {
        self.frame_skip = frame_skip;
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.frame_skip == 0 {
            return Err(EnvError::Config("frame_skip must be at least 1".into()));
        }
        Ok(())
    }
}
