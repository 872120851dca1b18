//! Core environment trait definitions.

use crate::spaces::Space;
use crate::Result;
use serde::ser::{Serialize, Serializer};
use smallvec::SmallVec;

/// Key under which the scenario diagnostic is exposed to agents
pub const DIAGNOSTIC_KEY: &str = "info";

/// Free-form reset options. Accepted for interface compatibility.
pub type ResetOptions = serde_json::Map<String, serde_json::Value>;

/// Information returned from environment resets and steps
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvInfo {
    /// Scenario-defined diagnostic, e.g. remaining ammunition
    pub diagnostic: Option<f64>,
    /// Episode return (if done)
    pub episode_return: Option<f64>,
    /// Episode length (if done)
    pub episode_length: Option<u32>,
    /// Custom metrics (kept minimal)
    pub extra: SmallVec<[(&'static str, f64); 4]>,
}

impl EnvInfo {
    /// Create empty info
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scenario diagnostic
    pub fn with_diagnostic(mut self, value: f64) -> Self {
        self.diagnostic = Some(value);
        self
    }

    /// Add episode stats
    pub fn with_episode_stats(mut self, ret: f64, len: u32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len);
        self
    }

    /// Add a custom metric (use rarely)
    pub fn with_extra(mut self, key: &'static str, value: f64) -> Self {
        self.extra.push((key, value));
        self
    }

    /// Get a value by key (including defaults)
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            DIAGNOSTIC_KEY => self.diagnostic,
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length.map(f64::from),
            _ => self.extra.iter().find(|(k, _)| *k == key).map(|(_, v)| *v),
        }
    }

    /// Iterate over every populated entry
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let fixed = [
            (DIAGNOSTIC_KEY, self.diagnostic),
            ("episode_return", self.episode_return),
            ("episode_length", self.episode_length.map(f64::from)),
        ];
        fixed
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .chain(self.extra.iter().map(|(k, v)| (*k, *v)))
    }

    /// Whether no entry is populated
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Serialized as a flat mapping, e.g. `{"info": 26.0}`.
impl Serialize for EnvInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Result from a single environment step
#[derive(Clone, Debug)]
pub struct StepResult<O> {
    /// Observation after the step
    pub observation: O,
    /// Reward received
    pub reward: f64,
    /// Whether episode terminated (goal reached, failure, etc.)
    pub terminated: bool,
    /// Whether episode truncated (time limit, etc.)
    pub truncated: bool,
    /// Additional info
    pub info: EnvInfo,
}

impl<O> StepResult<O> {
    /// Check if episode is done (terminated or truncated)
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Core trait for doomgym environments.
///
/// Mirrors the Gymnasium contract: `reset`, `step` and `close`, plus the
/// observation and action spaces as capability descriptors.
///
/// # Example
///
/// ```rust,ignore
/// use doomgym::env::{Env, EnvInfo, ResetOptions, StepResult};
/// use doomgym::spaces::{Box as BoxSpace, Discrete};
///
/// struct MyEnv {
///     obs_space: BoxSpace<f32>,
///     act_space: Discrete,
/// }
///
/// impl Env for MyEnv {
///     type Observation = ArrayD<f32>;
///     type Action = i64;
///     type ObservationSpace = BoxSpace<f32>;
///     type ActionSpace = Discrete;
///
///     fn observation_space(&self) -> &BoxSpace<f32> { &self.obs_space }
///     fn action_space(&self) -> &Discrete { &self.act_space }
///
///     fn reset(&mut self, seed: Option<u64>, _options: Option<&ResetOptions>)
///         -> Result<(ArrayD<f32>, EnvInfo)> {
///         // ...
///     }
///
///     fn step(&mut self, action: i64) -> Result<StepResult<ArrayD<f32>>> {
///         // ...
///     }
/// }
/// ```
pub trait Env {
    /// Observation produced by `reset` and `step`
    type Observation;
    /// Action accepted by `step`
    type Action;
    /// Descriptor of valid observations
    type ObservationSpace: Space;
    /// Descriptor of valid actions
    type ActionSpace: Space;

    /// Get the observation space
    fn observation_space(&self) -> &Self::ObservationSpace;

    /// Get the action space
    fn action_space(&self) -> &Self::ActionSpace;

    /// Start a new episode
    ///
    /// # Arguments
    /// * `seed` - Optional random seed for the environment's own RNG
    /// * `options` - Optional free-form options
    ///
    /// # Returns
    /// Tuple of (initial observation, info)
    fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&ResetOptions>,
    ) -> Result<(Self::Observation, EnvInfo)>;

    /// Take a single step in the environment
    ///
    /// # Returns
    /// StepResult containing observation, reward, done flags, and info
    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>>;

    /// Optional: Render the environment
    fn render(&self) -> Option<String> {
        None
    }

    /// Optional: Close the environment and free resources
    fn close(&mut self) {}
}
