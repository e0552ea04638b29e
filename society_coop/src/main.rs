//! Evolve society-switching strategies
//!
//! Usage:
//!   cargo run --release --bin evolve -- [experiments/baseline.toml] [output_dir]
//!
//! Without a config file the defaults are used. `SOCIETY_SEED`,
//! `SOCIETY_GENERATIONS` and `SOCIETY_POPULATION` override the loaded values.

use society_coop::config::RunConfig;
use society_coop::output::{SnapshotCsvObserver, SNAPSHOTS_CSV};
use society_coop::{init_tracing, run_evolution_with, Observer, ReportError};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ReportError> {
    let args: Vec<String> = env::args().collect();

    let mut config = match args.get(1) {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::from_env()?,
    };
    if let Some(dir) = args.get(2) {
        config.output.directory = PathBuf::from(dir);
    }

    println!("========================================");
    println!("Society Cooperation: Evolving Switching Strategies");
    println!("========================================");

    let mut observers: Vec<Box<dyn Observer>> = Vec::new();
    if config.output.write_snapshots {
        std::fs::create_dir_all(&config.output.directory)?;
        let path = config.output.directory.join(SNAPSHOTS_CSV);
        observers.push(Box::new(SnapshotCsvObserver::create(path)?));
    }

    let start = Instant::now();
    let report = run_evolution_with(&config.evolver, observers)?;
    let elapsed = start.elapsed();

    report.print_summary();
    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());

    report.write_all(&config.output.directory)?;
    println!("Results written to {}", config.output.directory.display());

    Ok(())
}
