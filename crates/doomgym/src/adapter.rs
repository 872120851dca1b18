//! Simulator-backed environment.

use crate::config::EnvConfig;
use crate::env::{Env, EnvInfo, ResetOptions, Scoped, StepResult};
use crate::game::Simulator;
use crate::preprocess::{self, TARGET_HEIGHT, TARGET_WIDTH};
use crate::spaces::{Box as BoxSpace, Discrete};
use crate::{EnvError, Result};
use ndarray::ArrayD;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Observation height in pixels
pub const OBS_HEIGHT: usize = TARGET_HEIGHT as usize;
/// Observation width in pixels
pub const OBS_WIDTH: usize = TARGET_WIDTH as usize;
/// Declared observation shape: height, width, channels
pub const OBS_SHAPE: [usize; 3] = [OBS_HEIGHT, OBS_WIDTH, 1];
/// Number of mutually exclusive actions
pub const ACTION_COUNT: usize = 3;

const ASCII_RAMP: &[u8] = b" .:-=+*#%@";
const ASCII_COLS: usize = 40;
const ASCII_ROWS: usize = 12;

/// Environment presenting a [`Simulator`] through the [`Env`] contract.
///
/// Observation: `[100, 160, 1]` grayscale frame, values 0-255
/// Action: index in `[0, 3)`, sent to the simulator as a one-hot button vector
///
/// The simulator handle is owned exclusively and released by [`Env::close`].
/// Wrap the environment in [`Scoped`] to also release it on drop.
pub struct DoomEnv<S: Simulator> {
    game: Option<S>,
    frame_skip: u32,
    observation_space: BoxSpace<u8>,
    action_space: Discrete,
    /// One-hot button vector per action
    buttons: Vec<Vec<f64>>,
    rng: StdRng,
    last_observation: Option<ArrayD<u8>>,
}

impl<S: Simulator> DoomEnv<S> {
    /// Load the scenario into `game` and start the simulator.
    ///
    /// Blocks for as long as the simulator takes to initialize.
    pub fn new(mut game: S, config: EnvConfig) -> Result<Self> {
        config.validate()?;
        game.load_config(&config.scenario)?;
        game.set_window_visible(config.render);
        game.init()?;

        let declared = game.available_buttons_size();
        if declared != ACTION_COUNT {
            game.close();
            return Err(EnvError::Config(format!(
                "{} declares {} buttons, expected {}",
                config.scenario.display(),
                declared,
                ACTION_COUNT
            )));
        }

        tracing::debug!(
            scenario = %config.scenario.display(),
            visible = config.render,
            frame_skip = config.frame_skip,
            "Simulator initialized"
        );

        let buttons = (0..ACTION_COUNT)
            .map(|i| (0..ACTION_COUNT).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();

        Ok(Self {
            game: Some(game),
            frame_skip: config.frame_skip,
            observation_space: BoxSpace::uniform(&OBS_SHAPE, 0, 255),
            action_space: Discrete::new(ACTION_COUNT),
            buttons,
            rng: StdRng::from_entropy(),
            last_observation: None,
        })
    }

    /// Hand ownership to a guard that closes the environment on drop
    pub fn scoped(self) -> Scoped<Self> {
        Scoped::new(self)
    }

    /// The environment's own RNG, reseeded by `reset(Some(seed), _)`.
    ///
    /// Use it to sample the spaces reproducibly.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Tics per `step`
    pub fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    /// The simulator, unless the environment is closed
    pub fn simulator(&self) -> Option<&S> {
        self.game.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.game.is_none()
    }

    /// One-hot button vector for `action`
    pub fn encode_action(&self, action: i64) -> Result<&[f64]> {
        let index = self
            .action_space
            .index_of(action)
            .ok_or(EnvError::InvalidAction {
                action,
                n: self.action_space.n,
            })?;
        Ok(&self.buttons[index])
    }
}

/// Current frame and first game variable, or a blank frame once the
/// simulator has no state left.
fn observe<S: Simulator>(game: &S) -> Result<(ArrayD<u8>, f64)> {
    match game.get_state() {
        Some(state) => {
            let observation = preprocess::grayscale(&state.screen_buffer)?;
            let diagnostic = state.game_variables.first().copied().unwrap_or(0.0);
            Ok((observation, diagnostic))
        }
        None => Ok((preprocess::blank_observation(), 0.0)),
    }
}

impl<S: Simulator> Env for DoomEnv<S> {
    type Observation = ArrayD<u8>;
    type Action = i64;
    type ObservationSpace = BoxSpace<u8>;
    type ActionSpace = Discrete;

    fn observation_space(&self) -> &BoxSpace<u8> {
        &self.observation_space
    }

    fn action_space(&self) -> &Discrete {
        &self.action_space
    }

    /// Start a new episode.
    ///
    /// `seed` reseeds only this environment's RNG (see [`DoomEnv::rng`]).
    /// The simulator's internal randomness (monster placement, AI) is not
    /// reseeded, so a seeded reset does not make episodes reproducible.
    /// `options` is accepted for interface compatibility and ignored.
    fn reset(
        &mut self,
        seed: Option<u64>,
        _options: Option<&ResetOptions>,
    ) -> Result<(ArrayD<u8>, EnvInfo)> {
        let game = self.game.as_mut().ok_or(EnvError::Closed)?;

        if let Some(s) = seed {
            self.rng = StdRng::seed_from_u64(s);
        }

        game.new_episode()?;
        tracing::debug!(seed = ?seed, "New episode");

        let (observation, _) = observe(game)?;
        self.last_observation = Some(observation.clone());
        Ok((observation, EnvInfo::new()))
    }

    fn step(&mut self, action: i64) -> Result<StepResult<ArrayD<u8>>> {
        let game = self.game.as_mut().ok_or(EnvError::Closed)?;
        let index = self
            .action_space
            .index_of(action)
            .ok_or(EnvError::InvalidAction {
                action,
                n: self.action_space.n,
            })?;

        let reward = game.make_action(&self.buttons[index], self.frame_skip)?;
        let (observation, diagnostic) = observe(game)?;
        let terminated = game.is_episode_finished();

        self.last_observation = Some(observation.clone());

        Ok(StepResult {
            observation,
            reward,
            terminated,
            // No step limit of our own; time limits are the scenario's
            truncated: false,
            info: EnvInfo::new().with_diagnostic(diagnostic),
        })
    }

    fn render(&self) -> Option<String> {
        let obs = self.last_observation.as_ref()?;

        let mut out = String::with_capacity((ASCII_COLS + 1) * ASCII_ROWS);
        for row in 0..ASCII_ROWS {
            let y = row * OBS_HEIGHT / ASCII_ROWS;
            for col in 0..ASCII_COLS {
                let x = col * OBS_WIDTH / ASCII_COLS;
                let v = obs[&[y, x, 0][..]] as usize;
                out.push(ASCII_RAMP[v * (ASCII_RAMP.len() - 1) / 255] as char);
            }
            out.push('\n');
        }
        Some(out)
    }

    /// Release the simulator. Calling it again is a no-op.
    fn close(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.close();
            tracing::debug!("Simulator closed");
        }
        self.last_observation = None;
    }
}
