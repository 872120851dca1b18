//! Environment traits and wrappers.
//!
//! Provides the core `Env` trait agents are written against, plus the
//! `EpisodeStats` wrapper and the `Scoped` close-on-drop guard.

mod scoped;
mod traits;
mod wrappers;

pub use scoped::Scoped;
pub use traits::{Env, EnvInfo, ResetOptions, StepResult, DIAGNOSTIC_KEY};
pub use wrappers::EpisodeStats;
