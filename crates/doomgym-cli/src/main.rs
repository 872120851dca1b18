//! doomgym CLI
//!
//! Command-line interface for inspecting and exercising doomgym environments.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use doomgym::env::{Env, EpisodeStats, Scoped};
use doomgym::spaces::Space;
use doomgym::EnvConfig;

#[derive(Parser)]
#[command(name = "doomgym")]
#[command(version, about = "doomgym - Gymnasium-style FPS training environments", long_about = None)]
struct Cli {
    /// Environment config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show observation and action spaces
    Info {
        /// Scenario configuration file
        #[arg(long)]
        scenario: Option<PathBuf>,
    },

    /// Evaluate a random policy
    Run {
        /// Scenario configuration file
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Number of episodes
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        episodes: u64,

        /// Seed for the first episode, incremented per episode
        #[arg(long)]
        seed: Option<u64>,

        /// Show the simulator window
        #[arg(long)]
        visible: bool,
    },

    /// Demo: step with random actions and print frames
    Demo {
        /// Scenario configuration file
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Number of steps
        #[arg(long, default_value = "20")]
        steps: usize,

        /// Seed for the action sampler
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let base = cli.config.as_deref();

    match cli.command {
        Commands::Info { scenario } => {
            info(load_config(base, scenario, None)?)?;
        }
        Commands::Run {
            scenario,
            episodes,
            seed,
            visible,
        } => {
            let visible = visible.then_some(true);
            run(load_config(base, scenario, visible)?, episodes, seed)?;
        }
        Commands::Demo {
            scenario,
            steps,
            seed,
        } => {
            demo(load_config(base, scenario, None)?, steps, seed)?;
        }
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(
    path: Option<&Path>,
    scenario: Option<PathBuf>,
    visible: Option<bool>,
) -> Result<EnvConfig> {
    let mut config = match path {
        Some(p) => EnvConfig::load(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => EnvConfig::default(),
    };
    if let Some(scenario) = scenario {
        config.scenario = scenario;
    }
    if let Some(visible) = visible {
        config.render = visible;
    }
    Ok(config)
}

fn info(config: EnvConfig) -> Result<()> {
    let mut env = doomgym_sim::make(config.clone())?;

    let obs_space = env.observation_space();
    let (low, high) = obs_space.bounds().unwrap_or((0, 255));
    println!("Scenario: {}", config.scenario.display());
    println!(
        "Observation space: {:?} u8 in [{}, {}]",
        obs_space.shape(),
        low,
        high
    );
    println!("Action space: Discrete({})", env.action_space().n);
    println!("Frame skip: {}", env.frame_skip());

    env.close();
    Ok(())
}

fn run(config: EnvConfig, episodes: u64, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        scenario = %config.scenario.display(),
        episodes,
        "Starting evaluation (random policy)"
    );

    let env = EpisodeStats::new(doomgym_sim::make(config)?);
    let mut env = Scoped::new(env);
    let space = env.action_space().clone();
    let mut total_return = 0.0;

    for episode in 0..episodes {
        env.reset(seed.map(|s| s + episode), None)?;

        loop {
            let action = space.sample(env.inner_mut().rng());
            let result = env.step(action)?;

            if result.done() {
                let episode_return = result.info.get("episode_return").unwrap_or(0.0);
                let length = result.info.get("episode_length").unwrap_or(0.0);
                tracing::info!(episode, episode_return, length, "Episode finished");
                total_return += episode_return;
                break;
            }
        }
    }

    env.close();

    let avg_return = total_return / episodes as f64;
    tracing::info!(avg_return, "Evaluation complete");
    println!("Average return over {} episodes: {:.2}", episodes, avg_return);
    Ok(())
}

fn demo(config: EnvConfig, steps: usize, seed: Option<u64>) -> Result<()> {
    tracing::info!(scenario = %config.scenario.display(), steps, "Running demo");

    let mut env = doomgym_sim::make(config)?.scoped();
    env.reset(seed, None)?;
    let space = env.action_space().clone();

    for step in 0..steps {
        let action = space.sample(env.rng());
        let result = env.step(action)?;

        println!(
            "Step {}: action={}, reward={:.1}, ammo={}",
            step,
            action,
            result.reward,
            result.info.get("info").unwrap_or(0.0)
        );
        if let Some(frame) = env.render() {
            println!("{}", frame);
        }

        if result.done() {
            tracing::info!(step, "Episode ended, resetting");
            env.reset(None, None)?;
        }
    }

    Ok(())
}
