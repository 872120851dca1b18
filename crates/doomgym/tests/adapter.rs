use doomgym::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared view of what the mock simulator was asked to do
#[derive(Default)]
struct Calls {
    loaded: Mutex<Option<PathBuf>>,
    visible: Mutex<Option<bool>>,
    actions: Mutex<Vec<(Vec<f64>, u32)>>,
    episodes: AtomicUsize,
    closes: AtomicUsize,
}

/// Scripted simulator: episodes last `episode_len` actions, one tic costs 1.
struct MockSim {
    calls: Arc<Calls>,
    buttons: usize,
    episode_len: usize,
    actions_taken: usize,
    ammo: f64,
    variables: bool,
}

impl MockSim {
    fn new(episode_len: usize) -> (Self, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let sim = Self {
            calls: Arc::clone(&calls),
            buttons: 3,
            episode_len,
            actions_taken: 0,
            ammo: 50.0,
            variables: true,
        };
        (sim, calls)
    }
}

impl Simulator for MockSim {
    fn load_config(&mut self, path: &Path) -> Result<()> {
        if path.ends_with("missing.cfg") {
            return Err(EnvError::Config(format!("{} not found", path.display())));
        }
        *self.calls.loaded.lock().unwrap() = Some(path.to_path_buf());
        Ok(())
    }

    fn set_window_visible(&mut self, visible: bool) {
        *self.calls.visible.lock().unwrap() = Some(visible);
    }

    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn new_episode(&mut self) -> Result<()> {
        self.calls.episodes.fetch_add(1, Ordering::SeqCst);
        self.actions_taken = 0;
        self.ammo = 50.0;
        Ok(())
    }

    fn make_action(&mut self, action: &[f64], tics: u32) -> Result<f64> {
        if action.len() != self.buttons {
            return Err(EnvError::Simulator("wrong button count".into()));
        }
        self.calls
            .actions
            .lock()
            .unwrap()
            .push((action.to_vec(), tics));
        if action[2] > 0.0 {
            self.ammo -= 1.0;
        }
        self.actions_taken += 1;
        Ok(-(tics as f64))
    }

    fn get_state(&self) -> Option<GameState> {
        if self.is_episode_finished() {
            return None;
        }
        let (w, h) = (320, 240);
        let data = (0..3 * w * h).map(|i| (i % 256) as u8).collect();
        Some(GameState {
            number: self.actions_taken as u64,
            screen_buffer: ScreenBuffer::new(ScreenFormat::Crcgcb, w, h, data).unwrap(),
            game_variables: if self.variables { vec![self.ammo] } else { vec![] },
        })
    }

    fn is_episode_finished(&self) -> bool {
        self.actions_taken >= self.episode_len
    }

    fn available_buttons_size(&self) -> usize {
        self.buttons
    }

    fn close(&mut self) {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn make_env(episode_len: usize) -> (DoomEnv<MockSim>, Arc<Calls>) {
    let (sim, calls) = MockSim::new(episode_len);
    let env = DoomEnv::new(sim, EnvConfig::new("scenarios/basic.cfg")).unwrap();
    (env, calls)
}

#[test]
fn test_construction_configures_simulator() {
    let (sim, calls) = MockSim::new(10);
    let env = DoomEnv::new(sim, EnvConfig::new("basic.cfg").with_render(true)).unwrap();

    assert_eq!(
        calls.loaded.lock().unwrap().as_deref(),
        Some(Path::new("basic.cfg"))
    );
    assert_eq!(*calls.visible.lock().unwrap(), Some(true));
    assert_eq!(env.frame_skip(), 4);
    assert!(!env.is_closed());
}

#[test]
fn test_spaces() {
    let (env, _) = make_env(10);

    assert_eq!(env.observation_space().shape(), &OBS_SHAPE);
    assert_eq!(env.observation_space().bounds(), Some((0, 255)));
    assert_eq!(env.action_space().n, 3);
}

#[test]
fn test_missing_scenario_fails_construction() {
    let (sim, _) = MockSim::new(10);
    let result = DoomEnv::new(sim, EnvConfig::new("missing.cfg"));
    assert!(matches!(result, Err(EnvError::Config(_))));
}

#[test]
fn test_button_count_mismatch_fails_construction() {
    let (mut sim, calls) = MockSim::new(10);
    sim.buttons = 4;
    let result = DoomEnv::new(sim, EnvConfig::default());
    assert!(matches!(result, Err(EnvError::Config(_))));
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_zero_frame_skip_rejected() {
    let (sim, _) = MockSim::new(10);
    let result = DoomEnv::new(sim, EnvConfig::default().with_frame_skip(0));
    assert!(matches!(result, Err(EnvError::Config(_))));
}

#[test]
fn test_reset_returns_declared_shape_and_empty_info() {
    let (mut env, calls) = make_env(10);

    let (obs, info) = env.reset(None, None).unwrap();
    assert_eq!(obs.shape(), &OBS_SHAPE);
    assert!(info.is_empty());
    assert!(env.observation_space().contains(&obs));
    assert_eq!(calls.episodes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reset_ignores_options() {
    let (mut env, _) = make_env(10);
    let mut options = ResetOptions::new();
    options.insert("difficulty".into(), serde_json::json!(3));

    let (obs, info) = env.reset(Some(1), Some(&options)).unwrap();
    assert_eq!(obs.shape(), &OBS_SHAPE);
    assert!(info.is_empty());
}

#[test]
fn test_every_action_yields_declared_shape() {
    let (mut env, _) = make_env(100);
    env.reset(None, None).unwrap();

    for action in 0..3 {
        let result = env.step(action).unwrap();
        assert_eq!(result.observation.shape(), &OBS_SHAPE);
        assert!(!result.terminated);
        assert!(!result.truncated);
    }
}

#[test]
fn test_step_sends_one_hot_with_frame_skip() {
    let (mut env, calls) = make_env(100);
    env.reset(None, None).unwrap();

    env.step(0).unwrap();
    env.step(1).unwrap();
    env.step(2).unwrap();

    let actions = calls.actions.lock().unwrap();
    assert_eq!(
        *actions,
        vec![
            (vec![1.0, 0.0, 0.0], 4),
            (vec![0.0, 1.0, 0.0], 4),
            (vec![0.0, 0.0, 1.0], 4),
        ]
    );
}

#[test]
fn test_step_reward_and_diagnostic() {
    let (mut env, _) = make_env(100);
    env.reset(None, None).unwrap();

    let result = env.step(2).unwrap();
    assert_eq!(result.reward, -4.0);
    assert_eq!(result.info.get("info"), Some(49.0));

    let result = env.step(0).unwrap();
    assert_eq!(result.info.get("info"), Some(49.0));
}

#[test]
fn test_missing_game_variable_reports_zero() {
    let (mut sim, _) = MockSim::new(100);
    sim.variables = false;
    let mut env = DoomEnv::new(sim, EnvConfig::default()).unwrap();
    env.reset(None, None).unwrap();

    let result = env.step(0).unwrap();
    assert_eq!(result.info.get("info"), Some(0.0));
}

#[test]
fn test_out_of_range_action_is_rejected() {
    let (mut env, calls) = make_env(100);
    env.reset(None, None).unwrap();

    for action in [-1, 3, 100] {
        match env.step(action) {
            Err(EnvError::InvalidAction { action: a, n }) => {
                assert_eq!(a, action);
                assert_eq!(n, 3);
            }
            other => panic!("expected InvalidAction, got {:?}", other.map(|r| r.reward)),
        }
    }
    assert!(calls.actions.lock().unwrap().is_empty());
}

#[test]
fn test_terminal_step_returns_blank_observation() {
    let (mut env, _) = make_env(3);
    env.reset(None, None).unwrap();

    env.step(0).unwrap();
    env.step(0).unwrap();
    let last = env.step(0).unwrap();

    assert!(last.terminated);
    assert!(!last.truncated);
    assert_eq!(last.observation.shape(), &OBS_SHAPE);
    assert!(last.observation.iter().all(|&v| v == 0));
    assert_eq!(last.info.get("info"), Some(0.0));
    assert!(env.observation_space().contains(&last.observation));
}

#[test]
fn test_reset_after_episode_end_starts_new_episode() {
    let (mut env, calls) = make_env(1);
    env.reset(None, None).unwrap();
    assert!(env.step(1).unwrap().terminated);

    let (obs, _) = env.reset(None, None).unwrap();
    assert!(obs.iter().any(|&v| v != 0));
    assert_eq!(calls.episodes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_seed_drives_own_rng() {
    let (mut env1, _) = make_env(10);
    let (mut env2, _) = make_env(10);
    env1.reset(Some(42), None).unwrap();
    env2.reset(Some(42), None).unwrap();

    let space = env1.action_space().clone();
    let a: Vec<i64> = (0..20).map(|_| space.sample(env1.rng())).collect();
    let b: Vec<i64> = (0..20).map(|_| space.sample(env2.rng())).collect();
    assert_eq!(a, b);
    assert!(a.iter().all(|x| space.contains(x)));
}

#[test]
fn test_encode_action() {
    let (env, _) = make_env(10);
    assert_eq!(env.encode_action(1).unwrap(), &[0.0, 1.0, 0.0]);
    assert!(env.encode_action(-1).is_err());
}

#[test]
fn test_close_is_idempotent() {
    let (mut env, calls) = make_env(10);
    env.close();
    env.close();

    assert!(env.is_closed());
    assert!(env.simulator().is_none());
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_use_after_close_fails() {
    let (mut env, _) = make_env(10);
    env.reset(None, None).unwrap();
    env.close();

    assert!(matches!(env.reset(None, None), Err(EnvError::Closed)));
    assert!(matches!(env.step(0), Err(EnvError::Closed)));
    assert!(env.render().is_none());
}

#[test]
fn test_scoped_closes_on_drop() {
    let (env, calls) = make_env(10);
    {
        let mut env = env.scoped();
        env.reset(None, None).unwrap();
        env.step(0).unwrap();
    }
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scoped_explicit_close() {
    let (env, calls) = make_env(10);
    let mut env = env.scoped();
    env.reset(None, None).unwrap();
    env.close();
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scoped_after_inner_close() {
    let (env, calls) = make_env(10);
    let mut env = env.scoped();
    Env::close(&mut *env);
    assert!(env.is_closed());
    drop(env);
    assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_render() {
    let (mut env, _) = make_env(10);
    assert!(env.render().is_none());

    env.reset(None, None).unwrap();
    let frame = env.render().unwrap();
    assert_eq!(frame.lines().count(), 12);
    assert!(frame.lines().all(|l| l.chars().count() == 40));
}

#[test]
fn test_episode_stats_wrapper() {
    let (env, _) = make_env(3);
    let mut env = EpisodeStats::new(env);
    env.reset(None, None).unwrap();

    env.step(0).unwrap();
    env.step(0).unwrap();
    let result = env.step(0).unwrap();

    assert!(result.done());
    assert_eq!(result.info.get("episode_return"), Some(-12.0));
    assert_eq!(result.info.get("episode_length"), Some(3.0));
}
