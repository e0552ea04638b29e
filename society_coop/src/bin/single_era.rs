//! One era of random matches without evolution
//!
//! Usage:
//!   cargo run --release --bin single_era -- [population] [matches] [seed]

use rand::rngs::StdRng;
use rand::SeedableRng;
use society_coop::simulator::{random_population, Simulator};
use society_coop::{init_tracing, SimError, Society};
use std::env;
use std::process::ExitCode;

const MEMORY_LENGTH: usize = 2;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let population = parse_arg(&args, 1, 20);
    let matches = parse_arg(&args, 2, 400);
    let seed = parse_arg(&args, 3, 42);

    match run(population, matches, seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_arg<V: std::str::FromStr>(args: &[String], index: usize, default: V) -> V {
    args.get(index)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn run(population: usize, matches: usize, seed: u64) -> Result<(), SimError> {
    println!(
        "Single era: {} agents, {} matches, seed {}",
        population, matches, seed
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let players = random_population(population, MEMORY_LENGTH, &mut rng)?;
    let mut simulator = Simulator::new(players)?;

    let before = simulator.get_counts();
    simulator.run(matches, &mut rng)?;
    let after = simulator.get_counts();
    let stats = simulator.get_stats()?;

    println!("\n{:<12} {:>8} {:>8}", "Society", "Start", "End");
    println!("{:-<12} {:->8} {:->8}", "", "", "");
    for society in Society::ALL {
        println!(
            "{:<12} {:>8} {:>8}",
            society.name(),
            before.get(society),
            after.get(society)
        );
    }

    println!(
        "\nFitness: min={:.3}, mean={:.3}, median={:.3}, max={:.3}",
        stats.min, stats.mean, stats.median, stats.max
    );
    println!("Dominant society: {}", after.dominant());

    Ok(())
}
