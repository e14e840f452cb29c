// src/main.rs
// Entry point for semnav: builds a map from a labeled scan (or a random layout)
// and runs navigation episodes on it.

use clap::Parser;
use log::{error, info};
use semnav::{LabeledScan, SemnavConfig, Session};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "semnav")]
#[command(about = "Semantic occupancy mapping and grid navigation", long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// YAML labeled scan (points + labels) to build the map from
    #[arg(short, long)]
    scan: Option<PathBuf>,

    /// Number of episodes to run
    #[arg(short, long, default_value_t = 1)]
    episodes: usize,

    /// Exploration rate override
    #[arg(long)]
    epsilon: Option<f64>,

    /// Seed override for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    info!("Starting semnav...");

    let mut config = match &args.config {
        Some(path) => SemnavConfig::load(path)?,
        None => SemnavConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.navigation.seed = Some(seed);
    }
    let mut session = Session::new(config)?;

    let from_map = match &args.scan {
        Some(path) => {
            let scan = LabeledScan::load(path)?;
            let map = session.build_map(&scan)?;
            let occupied = map.grid.iter().flatten().filter(|&&c| c != 0).count();
            info!("Map built: {} occupied cells", occupied);
            true
        }
        None => false,
    };

    let mut reached = 0;
    for episode in 1..=args.episodes {
        if from_map {
            session.reset_from_map()?;
        } else {
            session.reset_random();
        }
        match session.run_episode(args.epsilon) {
            Ok(summary) => {
                if summary.outcome == semnav::core::EpisodeOutcome::ReachedGoal {
                    reached += 1;
                }
                println!(
                    "episode {episode}: {:?} after {} steps, reward {:.2}",
                    summary.outcome, summary.steps, summary.total_reward
                );
            }
            Err(e) => {
                error!("Episode {} failed: {}", episode, e);
                return Err(e.into());
            }
        }
    }

    info!("Reached goal in {}/{} episodes", reached, args.episodes);
    Ok(())
}
