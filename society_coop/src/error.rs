//! Error types for the society cooperation model

use thiserror::Error;

/// Result alias for the simulation core
pub type Result<T> = std::result::Result<T, SimError>;

/// Failures in the simulation core. Every one of them aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid population of {size} agents: {reason}")]
    InvalidPopulation { size: usize, reason: &'static str },

    #[error("chromosome{} has {actual} genes, expected {expected}", agent_label(.agent_id))]
    InvalidChromosomeLength {
        agent_id: Option<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("memory length {memory_length} outside 1..={}", crate::agent::MAX_MEMORY_LENGTH)]
    InvalidMemoryLength { memory_length: usize },

    #[error("agent {agent_id}: history index {index} outside chromosome of {len} genes")]
    DegenerateHistoryIndex {
        agent_id: usize,
        index: usize,
        len: usize,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("evolution stopped after {recorded} of {expected} generations")]
    Incomplete { recorded: usize, expected: usize },

    #[error("replicate with seed {seed} panicked: {message}")]
    ReplicatePanicked { seed: u64, message: String },

    #[error("generation {generation}: {source}")]
    Generation {
        generation: usize,
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    /// Attach the generation in which the error surfaced
    pub fn in_generation(self, generation: usize) -> SimError {
        SimError::Generation {
            generation,
            source: Box::new(self),
        }
    }
}

fn agent_label(agent_id: &Option<usize>) -> String {
    match agent_id {
        Some(id) => format!(" of agent {}", id),
        None => String::new(),
    }
}

/// Failures while loading configuration or writing reports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Sim(#[from] SimError),
}
