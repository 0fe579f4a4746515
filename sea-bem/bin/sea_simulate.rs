//! Run a boundary element simulation described by a JSON file
//!
//! Usage:
//!   cargo run --release --bin sea-simulate -- --config room.json --output results.json

use clap::Parser;
use std::path::PathBuf;

use sea_bem::simulation::{FailurePolicy, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "sea-simulate")]
#[command(about = "Frequency-domain BEM simulation from a JSON configuration", long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Output JSON file path
    #[arg(short, long, default_value = "results.json")]
    output: PathBuf,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Keep going when a frequency fails
    #[arg(long)]
    skip_failures: bool,

    /// Keep the boundary solutions in the output
    #[arg(long)]
    boundary: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("sea-simulate {} ({})", sea_bem::VERSION, sea_bem::GIT_HASH);

    #[cfg(feature = "native")]
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
        log::info!("using {threads} threads");
    }
    #[cfg(not(feature = "native"))]
    if args.threads.is_some() {
        log::warn!("built without the native feature; --threads is ignored");
    }

    log::info!("loading configuration from {}", args.config.display());
    let config = SimulationConfig::from_file(&args.config)?;
    let mut options = config.solver.clone();
    if args.skip_failures {
        options.failure_policy = FailurePolicy::SkipAndContinue;
    }
    if args.boundary {
        options.retain_boundary_solutions = true;
    }

    let session = config.to_session()?;
    let results = session.run(&options)?;

    let failed = results.failed_frequencies();
    if !failed.is_empty() {
        log::warn!("{} of {} frequencies failed", failed.len(), results.frequencies.len());
    }
    for record in &results.receivers {
        let levels: Vec<String> = record
            .spl_db()
            .iter()
            .map(|l| l.map_or_else(|| "-".to_string(), |l| format!("{l:.1}")))
            .collect();
        log::info!(
            "receiver {} / source {}: {} dB",
            record.receiver_index,
            record.source_index,
            levels.join(" ")
        );
    }

    log::info!("saving results to {}", args.output.display());
    results.to_file(&args.output)?;
    Ok(())
}
