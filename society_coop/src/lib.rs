pub mod agent;
pub mod config;
pub mod error;
pub mod evolver;
pub mod game;
pub mod observer;
pub mod operators;
pub mod output;
pub mod payoff;
pub mod replicates;
pub mod simulator;
pub mod society;
pub mod stats;

pub use agent::{Chromosome, History, Player};
pub use config::{EvolverConfig, OutputConfig, RunConfig};
pub use error::{ReportError, SimError};
pub use evolver::{run_evolution, run_evolution_with, Evolver};
pub use game::{play_round, MatchOutcome};
pub use observer::{Observer, RecordingObserver};
pub use output::EvolutionReport;
pub use simulator::Simulator;
pub use society::{cooperates_with, Society};
pub use stats::{FitnessSummary, GenerationRecord, PopulationSnapshot, SocietyCounts};

/// Events driving an evolutionary run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Build the initial population
    EvolutionStart,
    EraStart { generation: usize },
    /// One pairwise match within an era
    Match { generation: usize, index: usize },
    /// All matches of the era are played; record statistics
    EraComplete { generation: usize },
    /// Breed the population for the next era
    Reproduction { generation: usize },
    EvolutionComplete,
}

/// State of an evolutionary run as reported by the event loop
#[derive(Debug, Clone)]
pub struct EvolutionStats {
    pub config: EvolverConfig,
    /// Statistics of the era played by the random initial population
    pub initial: Option<GenerationRecord>,
    /// One record per bred generation, in order
    pub generations: Vec<GenerationRecord>,
    pub matches_played: usize,
    pub final_snapshot: PopulationSnapshot,
    pub complete: bool,
    pub failure: Option<SimError>,
}

#[derive(Debug, Clone)]
pub enum Stats {
    Evolution(EvolutionStats),
}

/// Install the console subscriber used by the binaries. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
