//! Scenario `.cfg` parsing.
//!
//! The format is line based: `key = value`, `key += value` for lists,
//! `#` or `;` comments. Keys ignore case and underscores, so
//! `episode_timeout` and `episodeTimeout` are the same key. List values are
//! wrapped in braces and may span several lines:
//!
//! ```text
//! available_buttons =
//!     {
//!         MOVE_LEFT
//!         MOVE_RIGHT
//!         ATTACK
//!     }
//! ```

use doomgym::game::ScreenFormat;
use doomgym::{EnvError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Buttons the built-in scenario understands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    MoveLeft,
    MoveRight,
    Attack,
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, String> {
        match s.to_ascii_uppercase().as_str() {
            "MOVE_LEFT" => Ok(Button::MoveLeft),
            "MOVE_RIGHT" => Ok(Button::MoveRight),
            "ATTACK" => Ok(Button::Attack),
            other => Err(format!("unknown button {other}")),
        }
    }
}

/// Game variables reported in every state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameVariable {
    Ammo2,
    Health,
    KillCount,
}

impl FromStr for GameVariable {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, String> {
        match s.to_ascii_uppercase().as_str() {
            "AMMO2" => Ok(GameVariable::Ammo2),
            "HEALTH" => Ok(GameVariable::Health),
            "KILLCOUNT" => Ok(GameVariable::KillCount),
            other => Err(format!("unknown game variable {other}")),
        }
    }
}

/// Parsed scenario configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    /// Scenario archive, relative paths resolved against the `.cfg` directory
    pub scenario_path: Option<PathBuf>,
    pub map: String,
    /// Episode length limit in tics, 0 for none
    pub episode_timeout: u64,
    /// Tics skipped at the start of every episode
    pub episode_start_time: u64,
    /// Reward added on every tic
    pub living_reward: f64,
    pub screen_width: usize,
    pub screen_height: usize,
    pub screen_format: ScreenFormat,
    pub buttons: Vec<Button>,
    pub game_variables: Vec<GameVariable>,
    pub window_visible: bool,
    /// Seed for the simulator's own RNG
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            scenario_path: None,
            map: "map01".to_string(),
            episode_timeout: 0,
            episode_start_time: 1,
            living_reward: 0.0,
            screen_width: 320,
            screen_height: 240,
            screen_format: ScreenFormat::Crcgcb,
            buttons: Vec::new(),
            game_variables: Vec::new(),
            window_visible: false,
            seed: None,
        }
    }
}

/// A `key = { ... }` list still waiting for its closing brace
struct PendingList {
    key: String,
    append: bool,
    opened: bool,
    items: Vec<String>,
}

impl ScenarioConfig {
    /// Read and parse a `.cfg` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EnvError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&text, path)
    }

    /// Parse `.cfg` text. `origin` is used for error messages and to resolve
    /// the scenario path.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let mut config = ScenarioConfig::default();
        let mut pending: Option<PendingList> = None;
        let base = origin.parent().unwrap_or_else(|| Path::new(""));
        let err = |line: usize, msg: String| {
            EnvError::Config(format!("{}:{}: {}", origin.display(), line, msg))
        };

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let mut rest = strip_comment(raw).trim();

            if pending.is_none() {
                if rest.is_empty() {
                    continue;
                }
                let (key, append, value) = split_assignment(rest)
                    .ok_or_else(|| err(line_no, format!("expected 'key = value', got '{rest}'")))?;

                if !is_list_key(&key) {
                    if append {
                        return Err(err(line_no, format!("'+=' is only valid for lists, not {key}")));
                    }
                    match config.apply_scalar(&key, value, base) {
                        Ok(true) => {}
                        Ok(false) => {
                            tracing::warn!(key = %key, line = line_no, "Ignoring unsupported scenario option")
                        }
                        Err(m) => return Err(err(line_no, m)),
                    }
                    continue;
                }

                pending = Some(PendingList {
                    key,
                    append,
                    opened: false,
                    items: Vec::new(),
                });
                rest = value;
            }

            let Some(mut list) = pending.take() else {
                continue;
            };
            if !list.opened {
                if rest.is_empty() {
                    pending = Some(list);
                    continue;
                }
                rest = rest
                    .strip_prefix('{')
                    .ok_or_else(|| err(line_no, format!("expected '{{' after {}", list.key)))?;
                list.opened = true;
            }
            match rest.find('}') {
                Some(end) => {
                    if !rest[end + 1..].trim().is_empty() {
                        return Err(err(line_no, "unexpected text after '}'".into()));
                    }
                    list.items
                        .extend(rest[..end].split_whitespace().map(str::to_string));
                    config
                        .apply_list(&list.key, list.append, &list.items)
                        .map_err(|m| err(line_no, m))?;
                }
                None => {
                    list.items
                        .extend(rest.split_whitespace().map(str::to_string));
                    pending = Some(list);
                }
            }
        }

        if let Some(list) = pending {
            return Err(EnvError::Config(format!(
                "{}: unterminated list for {}",
                origin.display(),
                list.key
            )));
        }

        Ok(config)
    }

    /// Returns `Ok(false)` for keys this simulator does not know.
    fn apply_scalar(&mut self, key: &str, value: &str, base: &Path) -> core::result::Result<bool, String> {
        match key {
            "doomscenariopath" => self.scenario_path = Some(base.join(value)),
            "doommap" => self.map = value.to_string(),
            "episodetimeout" => self.episode_timeout = parse_num(key, value)?,
            "episodestarttime" => self.episode_start_time = parse_num(key, value)?,
            "livingreward" => self.living_reward = parse_num(key, value)?,
            "screenresolution" => {
                let (w, h) = parse_resolution(value)?;
                self.screen_width = w;
                self.screen_height = h;
            }
            "screenformat" => {
                self.screen_format = match value.to_ascii_uppercase().as_str() {
                    "CRCGCB" => ScreenFormat::Crcgcb,
                    "RGB24" => ScreenFormat::Rgb24,
                    "GRAY8" => ScreenFormat::Gray8,
                    other => return Err(format!("unsupported screen format {other}")),
                }
            }
            "windowvisible" => self.window_visible = parse_bool(value)?,
            "mode" => {
                if !value.eq_ignore_ascii_case("PLAYER") {
                    return Err(format!("unsupported mode {value}"));
                }
            }
            "seed" => self.seed = Some(parse_num(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn apply_list(&mut self, key: &str, append: bool, items: &[String]) -> core::result::Result<(), String> {
        match key {
            "availablebuttons" => {
                let parsed = items
                    .iter()
                    .map(|s| s.parse())
                    .collect::<core::result::Result<Vec<Button>, _>>()?;
                if !append {
                    self.buttons.clear();
                }
                for button in parsed {
                    if self.buttons.contains(&button) {
                        return Err(format!("button {button:?} declared twice"));
                    }
                    self.buttons.push(button);
                }
            }
            "availablegamevariables" => {
                let parsed = items
                    .iter()
                    .map(|s| s.parse())
                    .collect::<core::result::Result<Vec<GameVariable>, _>>()?;
                if !append {
                    self.game_variables.clear();
                }
                self.game_variables.extend(parsed);
            }
            other => return Err(format!("{other} is not a list option")),
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(|c| c == '#' || c == ';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Splits `key = value` / `key += value` and normalizes the key.
fn split_assignment(line: &str) -> Option<(String, bool, &str)> {
    let (key, append, value) = match line.find("+=") {
        Some(pos) => (&line[..pos], true, &line[pos + 2..]),
        None => {
            let pos = line.find('=')?;
            (&line[..pos], false, &line[pos + 1..])
        }
    };
    let key: String = key
        .trim()
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if key.is_empty() {
        return None;
    }
    Some((key, append, value.trim()))
}

fn is_list_key(key: &str) -> bool {
    matches!(key, "availablebuttons" | "availablegamevariables")
}

fn parse_num<T: FromStr>(key: &str, value: &str) -> core::result::Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value '{value}' for {key}"))
}

fn parse_bool(value: &str) -> core::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("invalid boolean '{value}'")),
    }
}

/// `RES_320X240` -> (320, 240)
fn parse_resolution(value: &str) -> core::result::Result<(usize, usize), String> {
    let upper = value.to_ascii_uppercase();
    let dims = upper
        .strip_prefix("RES_")
        .ok_or_else(|| format!("invalid resolution '{value}'"))?;
    let (w, h) = dims
        .split_once('X')
        .ok_or_else(|| format!("invalid resolution '{value}'"))?;
    let w: usize = w.parse().map_err(|_| format!("invalid resolution '{value}'"))?;
    let h: usize = h.parse().map_err(|_| format!("invalid resolution '{value}'"))?;
    if w == 0 || h == 0 {
        return Err(format!("invalid resolution '{value}'"));
    }
    Ok((w, h))
}
