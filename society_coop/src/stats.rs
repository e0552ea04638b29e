//! Per-era statistics and read-only population views

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::society::Society;

/// Min, mean, median and max over a set of fitness values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
}

impl FitnessSummary {
    pub fn from_fitness(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(SimError::InvalidPopulation {
                size: 0,
                reason: "statistics need at least one agent",
            });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Ok(FitnessSummary {
            min: sorted[0],
            mean,
            median,
            max: sorted[n - 1],
        })
    }
}

/// How many agents sit in each society
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocietyCounts {
    pub saints: usize,
    pub buddies: usize,
    pub fight_club: usize,
    pub vandals: usize,
}

impl SocietyCounts {
    pub fn from_societies(societies: impl IntoIterator<Item = Society>) -> Self {
        let mut counts = SocietyCounts::default();
        for society in societies {
            counts.add(society);
        }
        counts
    }

    pub fn add(&mut self, society: Society) {
        match society {
            Society::Saints => self.saints += 1,
            Society::Buddies => self.buddies += 1,
            Society::FightClub => self.fight_club += 1,
            Society::Vandals => self.vandals += 1,
        }
    }

    pub fn get(&self, society: Society) -> usize {
        match society {
            Society::Saints => self.saints,
            Society::Buddies => self.buddies,
            Society::FightClub => self.fight_club,
            Society::Vandals => self.vandals,
        }
    }

    pub fn total(&self) -> usize {
        self.saints + self.buddies + self.fight_club + self.vandals
    }

    /// The society with the most members; ties resolve to the lower code
    pub fn dominant(&self) -> Society {
        let mut best = Society::Saints;
        for society in Society::ALL {
            if self.get(society) > self.get(best) {
                best = society;
            }
        }
        best
    }
}

/// Statistics recorded once an era is complete. Generation 0 is the initial era.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub fitness: FitnessSummary,
    pub counts: SocietyCounts,
}

/// One agent as seen from outside the simulation core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: usize,
    pub society_code: u8,
    pub total_payoff: u64,
}

/// Read-only view of the whole population
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub agents: Vec<AgentView>,
}
