//! Independent runs of one configuration over consecutive seeds

use des::parallel::ParallelRunner;
use tracing::info;

use crate::config::EvolverConfig;
use crate::error::{Result, SimError};
use crate::evolver::{build_event_loop, Evolver};
use crate::output::EvolutionReport;
use crate::Stats;

/// Run `count` replicates with seeds `base.random_seed + i` on a thread pool.
///
/// Each replicate owns its population and RNG, so replicate `i` gives exactly
/// what `run_evolution` gives for the same seed. Results come back in seed order.
pub fn run_replicates(base: &EvolverConfig, count: usize) -> Result<Vec<Result<EvolutionReport>>> {
    run_replicates_on(base, count, None)
}

/// As [`run_replicates`], optionally on a dedicated pool of `threads` workers
pub fn run_replicates_on(
    base: &EvolverConfig,
    count: usize,
    threads: Option<usize>,
) -> Result<Vec<Result<EvolutionReport>>> {
    base.validate()?;
    let horizon = Evolver::from_validated(base.clone()).horizon();
    let seeds: Vec<u64> = (0..count)
        .map(|i| base.random_seed.wrapping_add(i as u64))
        .collect();

    info!(count, first_seed = base.random_seed, "Running replicates");

    let builder_config = base.clone();
    let builder_seeds = seeds.clone();
    let mut runner = ParallelRunner::new(count, move |scenario_id| {
        let config = builder_config.with_seed(builder_seeds[scenario_id]);
        build_event_loop(Evolver::from_validated(config)).0
    })
    .progress(|done, total| {
        info!(done, total, "Replicate finished");
    });
    if let Some(n) = threads {
        runner = runner.num_threads(n);
    }

    let results = runner
        .run(horizon)
        .into_iter()
        .zip(seeds)
        .map(|(result, seed)| match result {
            Ok(stats) => match stats.into_iter().next() {
                Some(Stats::Evolution(stats)) => EvolutionReport::from_stats(stats),
                None => Err(SimError::Incomplete {
                    recorded: 0,
                    expected: base.generations,
                }),
            },
            Err(message) => Err(SimError::ReplicatePanicked { seed, message }),
        })
        .collect();
    Ok(results)
}
