//! Environment wrappers for common functionality.

use super::{Env, EnvInfo, ResetOptions, StepResult};
use crate::Result;

/// Wrapper that tracks episode statistics (return and length).
///
/// Adds `episode_return` and `episode_length` to info on episode completion.
pub struct EpisodeStats<E: Env> {
    env: E,
    episode_return: f64,
    episode_length: u32,
}

impl<E: Env> EpisodeStats<E> {
    /// Wrap an environment with episode statistics tracking
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode_return: 0.0,
            episode_length: 0,
        }
    }

    /// Get a reference to the inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Get a mutable reference to the inner environment
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

impl<E: Env> Env for EpisodeStats<E> {
    type Observation = E::Observation;
    type Action = E::Action;
    type ObservationSpace = E::ObservationSpace;
    type ActionSpace = E::ActionSpace;

    fn observation_space(&self) -> &Self::ObservationSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> &Self::ActionSpace {
        self.env.action_space()
    }

    fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<&ResetOptions>,
    ) -> Result<(Self::Observation, EnvInfo)> {
        self.episode_return = 0.0;
        self.episode_length = 0;
        self.env.reset(seed, options)
    }

    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>> {
        let mut result = self.env.step(action)?;

        self.episode_return += result.reward;
        self.episode_length += 1;

        if result.done() {
            result.info = result
                .info
                .with_episode_stats(self.episode_return, self.episode_length);

            // Reset internal counters (env will be reset externally)
            self.episode_return = 0.0;
            self.episode_length = 0;
        }

        Ok(result)
    }

    fn render(&self) -> Option<String> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }
}
