//! # sector_sim
//!
//! Headless driver for the sector simulation: build the demo universe (or
//! resume a save), fast-forward a number of ticks, optionally write a save.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sim_app::savefile::{self, Format};
use sim_app::{Sim, TickConfig, factory};
use sim_ecs::World;
use sim_system::SimConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sector_sim", version, about = "Headless sector simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start a fresh demo universe.
    Run {
        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 100)]
        ticks: u64,
        /// Seconds per tick; defaults to `1 / tick_rate`.
        #[arg(long)]
        delta: Option<f64>,
        /// RNG seed; overrides the config file and the environment.
        #[arg(long)]
        seed: Option<u64>,
        /// TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write a save here when done.
        #[arg(long)]
        save: Option<PathBuf>,
        /// Write the save as MessagePack instead of JSON.
        #[arg(long)]
        msgpack: bool,
        /// Pace ticks against the wall clock.
        #[arg(long)]
        realtime: bool,
    },
    /// Continue from a save.
    Resume {
        /// Save to load (JSON or MessagePack).
        #[arg(long)]
        load: PathBuf,
        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 100)]
        ticks: u64,
        /// Seconds per tick; defaults to `1 / tick_rate`.
        #[arg(long)]
        delta: Option<f64>,
        /// TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write a save here when done.
        #[arg(long)]
        save: Option<PathBuf>,
        /// Write the save as MessagePack instead of JSON.
        #[arg(long)]
        msgpack: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let config = match path {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn tick_config(config: &SimConfig, ticks: u64, delta: Option<f64>, realtime: bool) -> TickConfig {
    TickConfig {
        tick_rate: delta.map_or(config.tick_rate, |d| 1.0 / d),
        max_ticks: ticks,
        realtime,
    }
}

fn finish(sim: &Sim, save: Option<PathBuf>, msgpack: bool) -> Result<()> {
    info!(
        tick_id = sim.tick_id(),
        elapsed = sim.elapsed(),
        entities = sim.world().len(),
        "simulation stopped"
    );
    if let Some(path) = save {
        let format = if msgpack { Format::Msgpack } else { Format::Json };
        savefile::write(&path, &sim.save(), format)
            .with_context(|| format!("writing save {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sim_app=info".parse()?))
        .init();

    match Cli::parse().command {
        Command::Run {
            ticks,
            delta,
            seed,
            config,
            save,
            msgpack,
            realtime,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            info!(seed = config.seed, ticks, "building demo universe");

            let mut world = World::new();
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            factory::demo_universe(&mut world, &mut rng)?;

            let loop_config = tick_config(&config, ticks, delta, realtime);
            let mut sim = Sim::with_default_systems(world, config);
            sim.run(&loop_config)?;
            finish(&sim, save, msgpack)
        }
        Command::Resume {
            load,
            ticks,
            delta,
            config,
            save,
            msgpack,
        } => {
            let config = load_config(config.as_ref())?;
            let doc = savefile::read(&load).with_context(|| format!("reading save {}", load.display()))?;
            let loop_config = tick_config(&config, ticks, delta, false);
            let mut sim = Sim::load(doc, config)?;
            sim.run(&loop_config)?;
            finish(&sim, save, msgpack)
        }
    }
}
