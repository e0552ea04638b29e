//! Run configuration: evolver parameters, TOML loading, environment overrides

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::agent::MAX_MEMORY_LENGTH;
use crate::error::{ReportError, Result, SimError};

/// Parameters of one evolutionary run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolverConfig {
    /// Generations after the initial era
    pub generations: usize,
    pub population_size: usize,
    /// Matches played per era
    pub matches_per_era: usize,
    /// Per-gene swap probability
    pub mutation_rate: f64,
    /// Per-pair crossover probability
    pub crossover_rate: f64,
    pub tournament_size: usize,
    /// Interactions remembered; the chromosome has 4^(2k) genes
    pub memory_length: usize,
    pub random_seed: u64,
}

impl Default for EvolverConfig {
    fn default() -> Self {
        EvolverConfig {
            generations: 200,
            population_size: 20,
            matches_per_era: 400,
            mutation_rate: 0.021,
            crossover_rate: 0.15,
            tournament_size: 5,
            memory_length: 2,
            random_seed: 42,
        }
    }
}

impl EvolverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.generations == 0 {
            return Err(invalid("generations must be at least 1"));
        }
        if self.population_size < 2 {
            return Err(invalid(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.matches_per_era == 0 {
            return Err(invalid("matches_per_era must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(invalid("tournament_size must be at least 1"));
        }
        if self.memory_length == 0 || self.memory_length > MAX_MEMORY_LENGTH {
            return Err(invalid(format!(
                "memory_length must be in 1..={}, got {}",
                MAX_MEMORY_LENGTH, self.memory_length
            )));
        }
        check_probability("mutation_rate", self.mutation_rate)?;
        check_probability("crossover_rate", self.crossover_rate)?;
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, ReportError> {
        let config: EvolverConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Same configuration with another seed
    pub fn with_seed(&self, random_seed: u64) -> Self {
        EvolverConfig {
            random_seed,
            ..self.clone()
        }
    }

    /// Apply `SOCIETY_SEED`, `SOCIETY_GENERATIONS` and `SOCIETY_POPULATION`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable values are logged and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_override(&lookup, "SOCIETY_SEED") {
            self.random_seed = v;
        }
        if let Some(v) = parse_override(&lookup, "SOCIETY_GENERATIONS") {
            self.generations = v;
        }
        if let Some(v) = parse_override(&lookup, "SOCIETY_POPULATION") {
            self.population_size = v;
        }
    }
}

fn parse_override<F, V>(lookup: &F, key: &str) -> Option<V>
where
    F: Fn(&str) -> Option<String>,
    V: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable override");
            None
        }
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::Configuration(message.into())
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{} must be in [0, 1], got {}", name, value)));
    }
    Ok(())
}

/// Where and what to write after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Also write a per-agent snapshot row for every era
    pub write_snapshots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: PathBuf::from("results"),
            write_snapshots: false,
        }
    }
}

/// A complete experiment file: `[evolver]` and `[output]` sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub evolver: EvolverConfig,
    pub output: OutputConfig,
}

impl RunConfig {
    /// Read a TOML file, apply environment overrides, then validate
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ReportError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// As [`RunConfig::load`], with overrides taken from `lookup`
    pub fn load_with<P, F>(path: P, lookup: F) -> std::result::Result<Self, ReportError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let text = std::fs::read_to_string(path)?;
        let mut config: RunConfig = toml::from_str(&text)?;
        config.evolver.apply_overrides(lookup);
        config.evolver.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides
    pub fn from_env() -> std::result::Result<Self, ReportError> {
        let mut config = RunConfig::default();
        config.evolver.apply_env_overrides();
        config.evolver.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = EvolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population_size, 20);
        assert_eq!(config.matches_per_era, 400);
        assert_eq!(config.tournament_size, 5);
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            EvolverConfig { generations: 0, ..Default::default() },
            EvolverConfig { population_size: 1, ..Default::default() },
            EvolverConfig { matches_per_era: 0, ..Default::default() },
            EvolverConfig { tournament_size: 0, ..Default::default() },
            EvolverConfig { memory_length: 0, ..Default::default() },
            EvolverConfig { memory_length: 5, ..Default::default() },
            EvolverConfig { mutation_rate: 1.5, ..Default::default() },
            EvolverConfig { crossover_rate: -0.1, ..Default::default() },
            EvolverConfig { crossover_rate: f64::NAN, ..Default::default() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(SimError::Configuration(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = EvolverConfig::from_toml_str("population_size = 50\nrandom_seed = 7\n").unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.generations, 200);
    }

    #[test]
    fn toml_round_trip() {
        let config = RunConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: RunConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn invalid_toml_values_are_reported() {
        let err = EvolverConfig::from_toml_str("memory_length = 9").unwrap_err();
        assert!(matches!(err, ReportError::Sim(SimError::Configuration(_))));
        let err = EvolverConfig::from_toml_str("memory_length = \"two\"").unwrap_err();
        assert!(matches!(err, ReportError::Toml(_)));
    }

    #[test]
    fn overrides_replace_fields() {
        let vars: HashMap<&str, &str> = [
            ("SOCIETY_SEED", "99"),
            ("SOCIETY_GENERATIONS", "3"),
            ("SOCIETY_POPULATION", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let mut config = EvolverConfig::default();

        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.random_seed, 99);
        assert_eq!(config.generations, 3);
        assert_eq!(config.population_size, 20);
    }

    #[test]
    fn load_reads_both_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "[evolver]\ngenerations = 4\n\n[output]\ndirectory = \"out\"\nwrite_snapshots = true\n",
        )
        .unwrap();

        let config = RunConfig::load_with(&path, |_| None).unwrap();

        assert_eq!(config.evolver.generations, 4);
        assert_eq!(config.evolver.population_size, 20);
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert!(config.output.write_snapshots);
    }

    #[test]
    fn load_applies_overrides_after_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "[evolver]
generations = 4
random_seed = 1
").unwrap();

        let config = RunConfig::load_with(&path, |key| {
            (key == "SOCIETY_SEED").then(|| "77".to_string())
        })
        .unwrap();

        assert_eq!(config.evolver.generations, 4);
        assert_eq!(config.evolver.random_seed, 77);

        let err = RunConfig::load_with(&path, |key| {
            (key == "SOCIETY_POPULATION").then(|| "1".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ReportError::Sim(SimError::Configuration(_))));
    }
}
