use rand::Rng;

use crate::agent::{Chromosome, Player};
use crate::error::{Result, SimError};
use crate::game::{play_round, MatchOutcome};
use crate::stats::{AgentView, FitnessSummary, PopulationSnapshot, SocietyCounts};

/// A fixed population playing random pairwise matches for one era
#[derive(Debug, Clone)]
pub struct Simulator {
    population: Vec<Player>,
}

impl Simulator {
    pub fn new(population: Vec<Player>) -> Result<Self> {
        check_population(&population)?;
        Ok(Simulator { population })
    }

    pub fn population(&self) -> &[Player] {
        &self.population
    }

    pub fn len(&self) -> usize {
        self.population.len()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Pick two distinct agents uniformly and play one match
    pub fn step(&mut self, rng: &mut impl Rng) -> Result<MatchOutcome> {
        let n = self.population.len();
        let a = rng.random_range(0..n);
        let mut b = rng.random_range(0..n);
        while b == a {
            b = rng.random_range(0..n);
        }

        let (first, second) = pair_mut(&mut self.population, a, b);
        play_round(first, second)
    }

    /// Play `matches` matches in order
    pub fn run(&mut self, matches: usize, rng: &mut impl Rng) -> Result<()> {
        for _ in 0..matches {
            self.step(rng)?;
        }
        Ok(())
    }

    pub fn get_stats(&self) -> Result<FitnessSummary> {
        let fitness: Vec<f64> = self.population.iter().map(Player::fitness).collect();
        FitnessSummary::from_fitness(&fitness)
    }

    pub fn get_counts(&self) -> SocietyCounts {
        SocietyCounts::from_societies(self.population.iter().map(Player::society))
    }

    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            agents: self
                .population
                .iter()
                .map(|player| AgentView {
                    id: player.id(),
                    society_code: player.society().code(),
                    total_payoff: player.total_payoff(),
                })
                .collect(),
        }
    }

    /// Swap in the next generation
    pub fn replace_population(&mut self, population: Vec<Player>) -> Result<()> {
        check_population(&population)?;
        self.population = population;
        Ok(())
    }

    /// Reset every agent in population order
    pub fn reset_agents(&mut self, rng: &mut impl Rng) {
        for player in &mut self.population {
            player.reset(rng);
        }
    }
}

/// Fresh random players. Each one draws its chromosome, then society, then history.
pub fn random_population(
    size: usize,
    memory_length: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Player>> {
    (0..size)
        .map(|id| {
            let chromosome = Chromosome::random(memory_length, rng)?;
            Player::new(id, chromosome, memory_length, rng)
        })
        .collect()
}

fn check_population(population: &[Player]) -> Result<()> {
    if population.len() < 2 {
        return Err(SimError::InvalidPopulation {
            size: population.len(),
            reason: "an era needs at least 2 agents",
        });
    }
    Ok(())
}

/// Two mutable borrows into the population, returned in the order asked for
fn pair_mut(population: &mut [Player], a: usize, b: usize) -> (&mut Player, &mut Player) {
    if a < b {
        let (left, right) = population.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = population.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
