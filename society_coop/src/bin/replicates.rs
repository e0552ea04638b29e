//! Run one configuration over consecutive seeds in parallel
//!
//! Usage:
//!   cargo run --release --bin replicates -- <count> [experiments/baseline.toml]

use society_coop::config::RunConfig;
use society_coop::replicates::run_replicates;
use society_coop::{init_tracing, ReportError};
use std::env;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let count = match args.get(1).and_then(|s| s.parse::<usize>().ok()) {
        Some(count) => count,
        None => {
            eprintln!("Usage: replicates <count> [config.toml]");
            return ExitCode::FAILURE;
        }
    };

    match run(count, args.get(2).map(String::as_str)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every replicate succeeded
fn run(count: usize, config_path: Option<&str>) -> Result<bool, ReportError> {
    let config = match config_path {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::from_env()?,
    };

    println!(
        "Running {} replicates from seed {}",
        count, config.evolver.random_seed
    );

    let start = Instant::now();
    let results = run_replicates(&config.evolver, count)?;
    let elapsed = start.elapsed();

    println!(
        "\n{:>8} {:>10} {:>10} {:>8} {:>8} {:>10} {:>8}",
        "Seed", "Mean", "Median", "Saints", "Buddies", "FightClub", "Vandals"
    );
    println!(
        "{:->8} {:->10} {:->10} {:->8} {:->8} {:->10} {:->8}",
        "", "", "", "", "", "", ""
    );

    let mut all_ok = true;
    for (i, result) in results.iter().enumerate() {
        let seed = config.evolver.random_seed.wrapping_add(i as u64);
        match result {
            Ok(report) => {
                let last = report.last();
                println!(
                    "{:>8} {:>10.3} {:>10.3} {:>8} {:>8} {:>10} {:>8}",
                    seed,
                    last.fitness.mean,
                    last.fitness.median,
                    last.counts.saints,
                    last.counts.buddies,
                    last.counts.fight_club,
                    last.counts.vandals
                );
            }
            Err(e) => {
                all_ok = false;
                println!("{:>8} failed: {}", seed, e);
            }
        }
    }

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    Ok(all_ok)
}
