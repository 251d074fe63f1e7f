use std::path::PathBuf;

use anyhow::{Context, Result};
use botlife::simulation::ecosystem::Ecosystem;
use botlife::simulation::params::Params;
use botlife::simulation::persistence;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(version)]
#[command(about = "Evolve neural-network bots that learn to watch the right balls")]
struct Args {
    /// Number of generations to run
    #[arg(short, long, default_value_t = 10)]
    generations: u64,
    /// Seed for a reproducible run, random if omitted
    #[arg(long)]
    seed: Option<u64>,
    /// JSON parameter file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Resume from a save file
    #[arg(short, long)]
    load: Option<PathBuf>,
    /// Save the final state here; a directory gets a timestamped file name
    #[arg(short, long)]
    save: Option<PathBuf>,
    /// Autosave every K generations, 0 disables autosaving
    #[arg(long, default_value_t = 5)]
    autosave_every: u64,
    /// Autosave destination
    #[arg(long, default_value = "saves/autosave.json")]
    autosave_path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut ecosystem = match &args.load {
        Some(path) => Ecosystem::load_from_file(path, seed)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            let params = match &args.config {
                Some(path) => Params::load_from_file(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?,
                None => Params::default(),
            };
            Ecosystem::with_seed(params, seed)?
        }
    };

    ecosystem.start();
    info!(
        seed,
        generations = args.generations,
        population = ecosystem.bots().len(),
        "running"
    );

    let target = ecosystem.generation() + args.generations;
    let mut last_generation = ecosystem.generation();

    while ecosystem.generation() < target {
        ecosystem.tick(true);

        if ecosystem.generation() == last_generation {
            continue;
        }
        last_generation = ecosystem.generation();

        if let Some(report) = ecosystem.last_report() {
            info!(
                generation = report.generation,
                best_pct = report.normalized_best(ecosystem.params()),
                average_pct = report.normalized_average(ecosystem.params()),
                "progress"
            );
        }

        if args.autosave_every > 0 && last_generation % args.autosave_every == 0 {
            ecosystem
                .save_to_file(&args.autosave_path)
                .with_context(|| format!("autosave to {} failed", args.autosave_path.display()))?;
        }
    }

    if let Some(path) = args.save {
        let path = if path.is_dir() {
            path.join(persistence::default_save_name())
        } else {
            path
        };
        ecosystem
            .save_to_file(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;
    }

    Ok(())
}
