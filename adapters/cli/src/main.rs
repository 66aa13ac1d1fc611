#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays an Alley Tanks session headlessly.

use std::path::PathBuf;

use alley_tanks_core::GameMode;
use alley_tanks_headless::{Simulation, SimulationConfig};
use alley_tanks_world::query;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Rule set selectable from the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Normal,
    TimeTrial,
    Survival,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => Self::Normal,
            ModeArg::TimeTrial => Self::TimeTrial,
            ModeArg::Survival => Self::Survival,
        }
    }
}

/// Runs a scripted Alley Tanks session and prints the outcome.
#[derive(Debug, Parser)]
#[command(name = "alley-tanks", version)]
struct CliArgs {
    /// TOML file with simulation settings; flags override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Rule set to play.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Seed for every random stream of the session.
    #[arg(long)]
    seed: Option<u64>,
    /// Difficulty multiplier applied on top of level scaling.
    #[arg(long)]
    difficulty: Option<f32>,
    /// Extra lives before the session ends.
    #[arg(long)]
    lives: Option<u32>,
    /// Number of fixed steps to simulate.
    #[arg(long)]
    ticks: Option<u32>,
    /// Length of each fixed step in milliseconds.
    #[arg(long, value_name = "MS")]
    timestep_ms: Option<u64>,
}

impl CliArgs {
    fn into_config(self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(lives) = self.lives {
            config.lives = lives;
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(timestep_ms) = self.timestep_ms {
            config.timestep_ms = timestep_ms;
        }

        config.validate().context("invalid command-line overrides")?;
        Ok(config)
    }
}

/// Entry point for the Alley Tanks command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CliArgs::parse().into_config()?;
    let mut simulation = Simulation::new(&config);
    println!("{}", query::welcome_banner(simulation.world()));

    let summary = simulation.run(config.ticks);
    println!("mode:             {}", summary.mode.label());
    println!("ticks:            {}", summary.ticks);
    println!("elapsed:          {:.2}s", summary.elapsed.as_secs_f32());
    println!("score:            {}", summary.score);
    match summary.mode {
        GameMode::Survival => println!("wave:             {}", summary.wave),
        GameMode::Normal | GameMode::TimeTrial => {
            println!("level:            {}", summary.level);
        }
    }
    println!("lives:            {}", summary.lives);
    println!("enemies defeated: {}", summary.enemies_defeated);
    println!("enemies alive:    {}", summary.enemies_alive);
    if summary.game_over {
        println!("game over");
    }
    Ok(())
}
