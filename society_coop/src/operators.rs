//! Genetic operators: tournament selection, two-point crossover, swap mutation
//!
//! All operators draw from the caller's RNG in a fixed order, so a seeded run
//! replays exactly. Crossover and mutation only move genes around; chromosome
//! lengths and gene multisets across each pair are preserved.

use rand::Rng;

use crate::agent::{Chromosome, Player};
use crate::error::{Result, SimError};

/// Build the next generation by tournament selection.
///
/// Each slot draws `tournament_size` contestants with replacement and keeps the
/// fittest; on equal fitness the earliest draw wins. The winner is copied into a
/// new player whose id is its slot.
pub fn select_tournament(
    population: &[Player],
    tournament_size: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Player>> {
    if population.is_empty() {
        return Err(SimError::InvalidPopulation {
            size: 0,
            reason: "selection needs at least one agent",
        });
    }
    if tournament_size == 0 {
        return Err(SimError::Configuration(
            "tournament size must be at least 1".to_string(),
        ));
    }

    let n = population.len();
    let mut offspring = Vec::with_capacity(n);
    for slot in 0..n {
        let mut winner = rng.random_range(0..n);
        for _ in 1..tournament_size {
            let contestant = rng.random_range(0..n);
            if population[contestant].fitness() > population[winner].fitness() {
                winner = contestant;
            }
        }
        offspring.push(Player::offspring(slot, &population[winner]));
    }
    Ok(offspring)
}

/// Cross consecutive pairs `(0, 1), (2, 3), ...` with probability `rate` each.
/// With an odd count the last player is left alone.
pub fn crossover_pairs(offspring: &mut [Player], rate: f64, rng: &mut impl Rng) {
    for pair in offspring.chunks_exact_mut(2) {
        if rng.random::<f64>() < rate {
            let (left, right) = pair.split_at_mut(1);
            two_point_crossover(
                left[0].chromosome_mut(),
                right[0].chromosome_mut(),
                rng,
            );
        }
    }
}

/// Swap the segment between two random cut points.
///
/// The cuts are drawn so the segment is never empty:
/// `c1` in `1..=size`, `c2` in `1..size` shifted past `c1`.
pub fn two_point_crossover(a: &mut Chromosome, b: &mut Chromosome, rng: &mut impl Rng) {
    let size = a.len().min(b.len());
    if size < 2 {
        return;
    }

    let mut c1 = rng.random_range(1..=size);
    let mut c2 = rng.random_range(1..size);
    if c2 >= c1 {
        c2 += 1;
    } else {
        std::mem::swap(&mut c1, &mut c2);
    }

    a.genes_mut()[c1..c2].swap_with_slice(&mut b.genes_mut()[c1..c2]);
}

/// Mutate every player's chromosome in population order
pub fn mutate_all(offspring: &mut [Player], rate: f64, rng: &mut impl Rng) {
    for player in offspring {
        swap_mutation(player.chromosome_mut(), rate, rng);
    }
}

/// Each gene, with probability `rate`, trades places with a different random gene
pub fn swap_mutation(chromosome: &mut Chromosome, rate: f64, rng: &mut impl Rng) {
    let len = chromosome.len();
    if len < 2 {
        return;
    }

    let genes = chromosome.genes_mut();
    for i in 0..len {
        if rng.random::<f64>() < rate {
            let mut j = rng.random_range(0..len - 1);
            if j >= i {
                j += 1;
            }
            genes.swap(i, j);
        }
    }
}
