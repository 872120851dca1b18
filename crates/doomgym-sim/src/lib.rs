//! Built-in simulator for doomgym.
//!
//! Provides a software rendition of the "basic" scenario so environments can
//! run without an external engine:
//! - `BasicScenario` - strafe-and-shoot simulator implementing `Simulator`
//! - `ScenarioConfig` - parser for the scenario `.cfg` format

mod basic;
mod scenario;

pub use basic::BasicScenario;
pub use scenario::{Button, GameVariable, ScenarioConfig};

use doomgym::{DoomEnv, EnvConfig, Result};

/// Create an environment backed by the built-in simulator
pub fn make(config: EnvConfig) -> Result<DoomEnv<BasicScenario>> {
    DoomEnv::new(BasicScenario::new(), config)
}
