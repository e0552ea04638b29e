//! Run reports and file output
//!
//! A finished run is summarised as an [`EvolutionReport`] that can be written
//! as a per-generation CSV table and a JSON summary for later analysis.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;
use tracing::{info, warn};

use crate::config::EvolverConfig;
use crate::error::{ReportError, Result, SimError};
use crate::observer::Observer;
use crate::stats::{GenerationRecord, PopulationSnapshot};
use crate::EvolutionStats;

pub const GENERATIONS_CSV: &str = "generations.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const SNAPSHOTS_CSV: &str = "snapshots.csv";

/// Everything needed to reproduce and analyse a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub metadata: RunMetadata,
    /// Era played by the random initial population
    pub initial: GenerationRecord,
    pub generations: Vec<GenerationRecord>,
    pub final_snapshot: PopulationSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub config: EvolverConfig,
    pub matches_played: usize,
    pub timestamp: String,
}

impl EvolutionReport {
    /// Turn the evolver's final stats into a report, surfacing any failure
    pub fn from_stats(stats: EvolutionStats) -> Result<Self> {
        if let Some(failure) = stats.failure {
            return Err(failure);
        }
        let initial = match (stats.complete, stats.initial) {
            (true, Some(initial)) => initial,
            _ => {
                return Err(SimError::Incomplete {
                    recorded: stats.generations.len(),
                    expected: stats.config.generations,
                })
            }
        };

        Ok(EvolutionReport {
            metadata: RunMetadata {
                config: stats.config,
                matches_played: stats.matches_played,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            initial,
            generations: stats.generations,
            final_snapshot: stats.final_snapshot,
        })
    }

    /// Initial era followed by every bred generation
    pub fn records(&self) -> impl Iterator<Item = &GenerationRecord> {
        std::iter::once(&self.initial).chain(self.generations.iter())
    }

    pub fn last(&self) -> &GenerationRecord {
        self.generations.last().unwrap_or(&self.initial)
    }

    pub fn print_summary(&self) {
        let config = &self.metadata.config;
        let last = self.last();
        println!("\n=== Society cooperation (seed {}) ===", config.random_seed);
        println!(
            "Population: {}, generations: {}, matches per era: {}, memory: {}",
            config.population_size, config.generations, config.matches_per_era, config.memory_length
        );
        println!(
            "Initial fitness: mean={:.3}, median={:.3}",
            self.initial.fitness.mean, self.initial.fitness.median
        );
        println!(
            "Final fitness: min={:.3}, mean={:.3}, median={:.3}, max={:.3}",
            last.fitness.min, last.fitness.mean, last.fitness.median, last.fitness.max
        );
        println!(
            "Final societies: saints={}, buddies={}, fight_club={}, vandals={}",
            last.counts.saints, last.counts.buddies, last.counts.fight_club, last.counts.vandals
        );
    }

    pub fn write_generations_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), ReportError> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "generation",
            "min",
            "mean",
            "median",
            "max",
            "saints",
            "buddies",
            "fight_club",
            "vandals",
        ])?;

        for record in self.records() {
            wtr.write_record(&[
                record.generation.to_string(),
                record.fitness.min.to_string(),
                record.fitness.mean.to_string(),
                record.fitness.median.to_string(),
                record.fitness.max.to_string(),
                record.counts.saints.to_string(),
                record.counts.buddies.to_string(),
                record.counts.fight_club.to_string(),
                record.counts.vandals.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn write_summary_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), ReportError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Write the CSV table and JSON summary into `dir`, creating it if needed
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> std::result::Result<(), ReportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.write_generations_csv(dir.join(GENERATIONS_CSV))?;
        self.write_summary_json(dir.join(SUMMARY_JSON))?;
        info!(directory = %dir.display(), "Wrote run output");
        Ok(())
    }
}

/// Streams one row per agent per era: `generation, agent_id, society_code, total_payoff`
pub struct SnapshotCsvObserver {
    writer: csv::Writer<File>,
    failed: bool,
}

impl SnapshotCsvObserver {
    pub fn create<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ReportError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["generation", "agent_id", "society_code", "total_payoff"])?;
        Ok(SnapshotCsvObserver {
            writer,
            failed: false,
        })
    }

    fn write_snapshot(
        &mut self,
        generation: usize,
        snapshot: &PopulationSnapshot,
    ) -> std::result::Result<(), ReportError> {
        for agent in &snapshot.agents {
            self.writer.write_record(&[
                generation.to_string(),
                agent.id.to_string(),
                agent.society_code.to_string(),
                agent.total_payoff.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl Observer for SnapshotCsvObserver {
    fn on_era_complete(&mut self, record: &GenerationRecord, snapshot: &PopulationSnapshot) {
        if self.failed {
            return;
        }
        if let Err(e) = self.write_snapshot(record.generation, snapshot) {
            // Observers cannot abort the run; stop writing after the first failure
            warn!(generation = record.generation, error = %e, "Snapshot write failed");
            self.failed = true;
        }
    }
}
