//! # doomgym
//!
//! Gymnasium-style environments on top of first-person-shooter training
//! simulators.
//!
//! ## Overview
//!
//! doomgym provides:
//! - The `Env` trait, a standard `reset`/`step`/`close` contract for agents
//! - Observation and action spaces (`Discrete`, `Box`)
//! - The `Simulator` trait describing the native engine API the adapter drives
//! - `DoomEnv`, the adapter presenting a `Simulator` through `Env`
//! - The grayscale/resize transform turning screen buffers into observations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use doomgym::prelude::*;
//! use doomgym_sim::BasicScenario;
//!
//! let mut env = DoomEnv::new(BasicScenario::new(), EnvConfig::default())?;
//! let (obs, _) = env.reset(Some(42), None)?;
//! assert_eq!(obs.shape(), &[100, 160, 1]);
//!
//! let result = env.step(0)?;
//! env.close();
//! ```

pub mod adapter;
pub mod config;
pub mod env;
pub mod game;
pub mod preprocess;
pub mod spaces;

pub use adapter::DoomEnv;
pub use config::EnvConfig;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::{DoomEnv, ACTION_COUNT, OBS_HEIGHT, OBS_SHAPE, OBS_WIDTH};
    pub use crate::config::EnvConfig;
    pub use crate::env::{EnvInfo, EpisodeStats, Env, ResetOptions, Scoped, StepResult};
    pub use crate::game::{GameState, ScreenBuffer, ScreenFormat, Simulator};
    pub use crate::spaces::*;
    pub use crate::{EnvError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid action: {action} is outside [0, {n})")]
    InvalidAction { action: i64, n: usize },

    #[error("Environment closed")]
    Closed,

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Simulator error: {0}")]
    Simulator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, EnvError>;
