//! Built-in "basic" scenario.
//!
//! A square room with the player on one wall and a single monster on the
//! opposite wall at a random lateral offset. The player strafes left and
//! right and shoots; a shot close enough to the monster's line kills it and
//! ends the episode.
//!
//! Rewards per tic: the scenario's `living_reward`, -5 for every shot fired,
//! +106 for the killing shot (net +101).

use crate::scenario::{Button, GameVariable, ScenarioConfig};
use doomgym::game::{GameState, ScreenBuffer, ScreenFormat, Simulator};
use doomgym::{EnvError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Half the room width in world units; the player can strafe this far
const ROOM_HALF_WIDTH: f64 = 160.0;
/// Monsters spawn within this lateral distance of the room centre
const MONSTER_RANGE: f64 = 120.0;
/// Strafe distance per tic
const STRAFE_SPEED: f64 = 6.0;
/// A shot kills if the monster is within this lateral distance
const HIT_RADIUS: f64 = 14.0;
const MONSTER_HALF_WIDTH: f64 = 14.0;
/// Tics between two pistol shots
const FIRE_COOLDOWN: u32 = 8;
const START_AMMO: u32 = 50;
const START_HEALTH: f64 = 100.0;
const SHOT_REWARD: f64 = -5.0;
const KILL_REWARD: f64 = 106.0;

const CEILING: [u8; 3] = [72, 72, 84];
const FLOOR: [u8; 3] = [96, 76, 52];
const MONSTER: [u8; 3] = [176, 44, 32];

#[derive(Clone, Debug)]
struct Episode {
    tic: u64,
    player_x: f64,
    monster_x: f64,
    ammo: u32,
    cooldown: u32,
    kills: u32,
    finished: bool,
}

/// Positions of the declared buttons inside an action vector
#[derive(Clone, Copy, Debug, Default)]
struct ButtonMap {
    left: Option<usize>,
    right: Option<usize>,
    attack: Option<usize>,
}

impl ButtonMap {
    fn new(buttons: &[Button]) -> Self {
        let find = |b: Button| buttons.iter().position(|x| *x == b);
        Self {
            left: find(Button::MoveLeft),
            right: find(Button::MoveRight),
            attack: find(Button::Attack),
        }
    }

    fn pressed(slot: Option<usize>, action: &[f64]) -> bool {
        slot.map_or(false, |i| action[i] != 0.0)
    }
}

/// Software simulator for the basic scenario
///
/// Follows the native life cycle: `load_config`, `init` (which also starts
/// the first episode), then `new_episode` / `make_action` / `get_state`.
pub struct BasicScenario {
    config: Option<ScenarioConfig>,
    visible: Option<bool>,
    running: bool,
    buttons: ButtonMap,
    rng: StdRng,
    episode: Option<Episode>,
}

impl BasicScenario {
    pub fn new() -> Self {
        Self {
            config: None,
            visible: None,
            running: false,
            buttons: ButtonMap::default(),
            rng: StdRng::from_entropy(),
            episode: None,
        }
    }

    /// The loaded scenario configuration
    pub fn config(&self) -> Option<&ScenarioConfig> {
        self.config.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the window was requested visible
    pub fn window_visible(&self) -> bool {
        self.visible
            .or_else(|| self.config.as_ref().map(|c| c.window_visible))
            .unwrap_or(false)
    }

    /// Lateral offset of the monster from the player, if an episode is live
    pub fn monster_offset(&self) -> Option<f64> {
        self.episode
            .as_ref()
            .filter(|e| !e.finished)
            .map(|e| e.monster_x - e.player_x)
    }

    fn running_config(&self) -> Result<&ScenarioConfig> {
        match (&self.config, self.running) {
            (Some(config), true) => Ok(config),
            _ => Err(EnvError::Simulator("simulator is not running".into())),
        }
    }

    fn spawn_episode(&mut self) {
        let start = self.config.as_ref().map_or(0, |c| c.episode_start_time);
        self.episode = Some(Episode {
            tic: start,
            player_x: 0.0,
            monster_x: self.rng.gen_range(-MONSTER_RANGE..=MONSTER_RANGE),
            ammo: START_AMMO,
            cooldown: 0,
            kills: 0,
            finished: false,
        });
    }

    fn render(&self, config: &ScenarioConfig, episode: &Episode) -> Result<ScreenBuffer> {
        let (w, h) = (config.screen_width, config.screen_height);
        let scale = w as f64 / (2.0 * ROOM_HALF_WIDTH);
        let center = w as f64 / 2.0 + (episode.monster_x - episode.player_x) * scale;
        let half = MONSTER_HALF_WIDTH * scale;
        let (top, bottom) = (h * 2 / 5, h * 3 / 4);

        let pixel = |x: usize, y: usize| -> [u8; 3] {
            let fx = x as f64 + 0.5;
            if (center - half..center + half).contains(&fx) && (top..bottom).contains(&y) {
                MONSTER
            } else if y < h / 2 {
                CEILING
            } else {
                FLOOR
            }
        };

        let format = config.screen_format;
        let mut data = vec![0u8; format.channels() * w * h];
        for y in 0..h {
            for x in 0..w {
                let rgb = pixel(x, y);
                match format {
                    ScreenFormat::Crcgcb => {
                        for (c, v) in rgb.iter().enumerate() {
                            data[c * w * h + y * w + x] = *v;
                        }
                    }
                    ScreenFormat::Rgb24 => {
                        data[(y * w + x) * 3..(y * w + x) * 3 + 3].copy_from_slice(&rgb);
                    }
                    ScreenFormat::Gray8 => {
                        let [r, g, b] = rgb.map(u32::from);
                        data[y * w + x] = ((r * 4899 + g * 9617 + b * 1868 + 8192) >> 14) as u8;
                    }
                }
            }
        }
        ScreenBuffer::new(format, w, h, data)
    }
}

impl Default for BasicScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for BasicScenario {
    fn load_config(&mut self, path: &Path) -> Result<()> {
        let config = ScenarioConfig::load(path)?;
        self.buttons = ButtonMap::new(&config.buttons);
        self.config = Some(config);
        Ok(())
    }

    fn set_window_visible(&mut self, visible: bool) {
        self.visible = Some(visible);
    }

    fn init(&mut self) -> Result<()> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| EnvError::Simulator("load_config must be called before init".into()))?;

        self.rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        if self.window_visible() {
            tracing::debug!("Window requested; the built-in simulator renders off-screen only");
        }
        self.running = true;
        self.spawn_episode();
        Ok(())
    }

    fn new_episode(&mut self) -> Result<()> {
        self.running_config()?;
        self.spawn_episode();
        Ok(())
    }

    fn make_action(&mut self, action: &[f64], tics: u32) -> Result<f64> {
        let config = self.running_config()?;
        if action.len() != config.buttons.len() {
            return Err(EnvError::Simulator(format!(
                "action has {} buttons, scenario declares {}",
                action.len(),
                config.buttons.len()
            )));
        }
        let (living_reward, timeout) = (config.living_reward, config.episode_timeout);
        let buttons = self.buttons;

        let Some(ep) = self.episode.as_mut() else {
            return Ok(0.0);
        };

        let left = ButtonMap::pressed(buttons.left, action);
        let right = ButtonMap::pressed(buttons.right, action);
        let attack = ButtonMap::pressed(buttons.attack, action);

        let mut reward = 0.0;
        for _ in 0..tics {
            if ep.finished {
                break;
            }
            reward += living_reward;

            let dx = match (left, right) {
                (true, false) => -STRAFE_SPEED,
                (false, true) => STRAFE_SPEED,
                _ => 0.0,
            };
            ep.player_x = (ep.player_x + dx).clamp(-ROOM_HALF_WIDTH, ROOM_HALF_WIDTH);

            ep.cooldown = ep.cooldown.saturating_sub(1);
            if attack && ep.cooldown == 0 && ep.ammo > 0 {
                ep.ammo -= 1;
                ep.cooldown = FIRE_COOLDOWN;
                reward += SHOT_REWARD;
                if (ep.monster_x - ep.player_x).abs() <= HIT_RADIUS {
                    reward += KILL_REWARD;
                    ep.kills += 1;
                    ep.finished = true;
                }
            }

            ep.tic += 1;
            if timeout > 0 && ep.tic >= timeout {
                ep.finished = true;
            }
        }

        if ep.finished {
            tracing::debug!(tic = ep.tic, kills = ep.kills, "Episode finished");
        }
        Ok(reward)
    }

    fn get_state(&self) -> Option<GameState> {
        let config = self.running_config().ok()?;
        let episode = self.episode.as_ref().filter(|e| !e.finished)?;

        let screen_buffer = self.render(config, episode).ok()?;
        let game_variables = config
            .game_variables
            .iter()
            .map(|v| match v {
                GameVariable::Ammo2 => episode.ammo as f64,
                GameVariable::Health => START_HEALTH,
                GameVariable::KillCount => episode.kills as f64,
            })
            .collect();

        Some(GameState {
            number: episode.tic,
            screen_buffer,
            game_variables,
        })
    }

    fn is_episode_finished(&self) -> bool {
        self.episode.as_ref().map_or(true, |e| e.finished)
    }

    fn available_buttons_size(&self) -> usize {
        self.config.as_ref().map_or(0, |c| c.buttons.len())
    }

    fn close(&mut self) {
        self.running = false;
        self.episode = None;
    }
}
