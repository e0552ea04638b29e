use rand::Rng;
use std::collections::VecDeque;

use crate::error::{Result, SimError};
use crate::society::Society;
use crate::stats::SocietyCounts;

/// Longest memory a chromosome can be built for (4^8 = 65536 genes)
pub const MAX_MEMORY_LENGTH: usize = 4;

/// Number of history symbols for a memory of `memory_length` interactions
pub fn history_len(memory_length: usize) -> usize {
    2 * memory_length
}

/// Genes needed to address every possible history: 4^(2k), for k in `1..=MAX_MEMORY_LENGTH`
pub fn chromosome_len(memory_length: usize) -> Result<usize> {
    if memory_length == 0 || memory_length > MAX_MEMORY_LENGTH {
        return Err(SimError::InvalidMemoryLength { memory_length });
    }
    Ok(4usize.pow(history_len(memory_length) as u32))
}

// ============================================================================
// Chromosome
// ============================================================================

/// Lookup table from an encoded history to the society to switch to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chromosome {
    genes: Vec<Society>,
}

impl Chromosome {
    /// Build from explicit genes. The length must be exactly 4^(2k).
    pub fn new(genes: Vec<Society>, memory_length: usize) -> Result<Self> {
        let expected = chromosome_len(memory_length)?;
        if genes.len() != expected {
            return Err(SimError::InvalidChromosomeLength {
                agent_id: None,
                expected,
                actual: genes.len(),
            });
        }
        Ok(Chromosome { genes })
    }

    /// Every gene drawn independently and uniformly
    pub fn random(memory_length: usize, rng: &mut impl Rng) -> Result<Self> {
        let genes = (0..chromosome_len(memory_length)?)
            .map(|_| Society::random(rng))
            .collect();
        Ok(Chromosome { genes })
    }

    /// Same society at every position
    pub fn uniform(society: Society, memory_length: usize) -> Result<Self> {
        Ok(Chromosome {
            genes: vec![society; chromosome_len(memory_length)?],
        })
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn genes(&self) -> &[Society] {
        &self.genes
    }

    /// Mutable view for the genetic operators; a slice cannot change the length
    pub(crate) fn genes_mut(&mut self) -> &mut [Society] {
        &mut self.genes
    }

    pub fn gene(&self, index: usize) -> Option<Society> {
        self.genes.get(index).copied()
    }

    /// Multiset of gene values
    pub fn counts(&self) -> SocietyCounts {
        SocietyCounts::from_societies(self.genes.iter().copied())
    }
}

// ============================================================================
// History
// ============================================================================

/// Sliding window over the last k (own society, opponent society) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    symbols: VecDeque<u8>,
}

impl History {
    /// Build from explicit pairs, oldest first
    pub fn from_pairs(pairs: &[(Society, Society)]) -> Self {
        let symbols = pairs
            .iter()
            .flat_map(|(own, other)| [own.code(), other.code()])
            .collect();
        History { symbols }
    }

    pub fn random(memory_length: usize, rng: &mut impl Rng) -> Self {
        let symbols = (0..history_len(memory_length))
            .map(|_| Society::random(rng).code())
            .collect();
        History { symbols }
    }

    /// Forget the oldest pair, remember the newest
    pub fn push(&mut self, own: Society, other: Society) {
        self.symbols.pop_front();
        self.symbols.pop_front();
        self.symbols.push_back(own.code());
        self.symbols.push_back(other.code());
    }

    /// The window read as a base-4 number, most recent symbol least significant
    pub fn index(&self) -> usize {
        self.symbols
            .iter()
            .fold(0usize, |acc, &symbol| acc * 4 + symbol as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> Vec<u8> {
        self.symbols.iter().copied().collect()
    }
}

// ============================================================================
// Player Agent
// ============================================================================

/// One member of the population
#[derive(Debug, Clone)]
pub struct Player {
    id: usize,
    society: Society,
    chromosome: Chromosome,
    history: History,
    total_payoff: u64,
    rounds_played: u64,
}

impl Player {
    /// Fresh player with random society and history drawn in that order
    pub fn new(
        id: usize,
        chromosome: Chromosome,
        memory_length: usize,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let society = Society::random(rng);
        let history = History::random(memory_length, rng);
        Self::with_state(id, chromosome, society, history)
    }

    /// Player with an explicit starting state; the chromosome must match the history length
    pub fn with_state(
        id: usize,
        chromosome: Chromosome,
        society: Society,
        history: History,
    ) -> Result<Self> {
        if history.len() % 2 != 0 {
            return Err(SimError::InvalidMemoryLength {
                memory_length: history.len() / 2,
            });
        }
        let expected = chromosome_len(history.len() / 2)?;
        if chromosome.len() != expected {
            return Err(SimError::InvalidChromosomeLength {
                agent_id: Some(id),
                expected,
                actual: chromosome.len(),
            });
        }
        Ok(Player {
            id,
            society,
            chromosome,
            history,
            total_payoff: 0,
            rounds_played: 0,
        })
    }

    /// Offspring of `parent`: new identity and its own copy of the chromosome
    pub fn offspring(id: usize, parent: &Player) -> Self {
        Player {
            id,
            society: parent.society,
            chromosome: parent.chromosome.clone(),
            history: parent.history.clone(),
            total_payoff: 0,
            rounds_played: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn society(&self) -> Society {
        self.society
    }

    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    pub(crate) fn chromosome_mut(&mut self) -> &mut Chromosome {
        &mut self.chromosome
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn total_payoff(&self) -> u64 {
        self.total_payoff
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    pub fn cooperates_with(&self, other: &Player) -> bool {
        self.society.cooperates_with(other.society)
    }

    pub fn update_score(&mut self, delta: u32) {
        self.total_payoff += u64::from(delta);
        self.rounds_played += 1;
    }

    /// Average payoff per round, 0 before the first round
    pub fn fitness(&self) -> f64 {
        if self.rounds_played == 0 {
            0.0
        } else {
            self.total_payoff as f64 / self.rounds_played as f64
        }
    }

    pub fn update_history(&mut self, opponent: Society) {
        self.history.push(self.society, opponent);
    }

    /// Adopt the society the chromosome lists for the current history
    pub fn change_society(&mut self) -> Result<()> {
        let index = self.history.index();
        match self.chromosome.gene(index) {
            Some(society) => {
                self.society = society;
                Ok(())
            }
            None => Err(SimError::DegenerateHistoryIndex {
                agent_id: self.id,
                index,
                len: self.chromosome.len(),
            }),
        }
    }

    /// Clear runtime state; the chromosome is kept
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.total_payoff = 0;
        self.rounds_played = 0;
        self.society = Society::random(rng);
        let memory_length = self.history.len() / 2;
        self.history = History::random(memory_length, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sizes_follow_memory_length() {
        assert_eq!(history_len(1), 2);
        assert_eq!(chromosome_len(1), Ok(16));
        assert_eq!(chromosome_len(2), Ok(256));
        assert_eq!(chromosome_len(3), Ok(4096));
        assert_eq!(chromosome_len(4), Ok(65536));
    }

    #[test]
    fn chromosome_rejects_wrong_length() {
        let err = Chromosome::new(vec![Society::Saints; 15], 1).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidChromosomeLength {
                agent_id: None,
                expected: 16,
                actual: 15
            }
        );
        assert!(Chromosome::new(vec![Society::Saints; 16], 1).is_ok());
    }

    #[test]
    fn memory_length_outside_bounds_is_an_error() {
        for k in [0, MAX_MEMORY_LENGTH + 1, 17, usize::MAX / 2] {
            assert_eq!(
                chromosome_len(k),
                Err(SimError::InvalidMemoryLength { memory_length: k })
            );
            assert!(Chromosome::new(Vec::new(), k).is_err());
            assert!(Chromosome::uniform(Society::Saints, k).is_err());
        }
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Chromosome::random(17, &mut rng).is_err());
    }

    #[test]
    fn with_state_rejects_overlong_history() {
        let history = History::from_pairs(&[(Society::Saints, Society::Saints); 16]);
        let chromosome = Chromosome::uniform(Society::Saints, 1).unwrap();

        let err = Player::with_state(0, chromosome, Society::Saints, history).unwrap_err();

        assert_eq!(err, SimError::InvalidMemoryLength { memory_length: 16 });
    }

    #[test]
    fn history_index_is_base_four() {
        let history = History::from_pairs(&[(Society::Buddies, Society::Vandals)]);
        // symbols [1, 3] -> 1*4 + 3
        assert_eq!(history.index(), 7);

        let history = History::from_pairs(&[
            (Society::Vandals, Society::Vandals),
            (Society::Vandals, Society::Vandals),
        ]);
        assert_eq!(history.index(), 255);
    }

    #[test]
    fn history_push_keeps_length_and_drops_oldest() {
        let mut history = History::from_pairs(&[
            (Society::Saints, Society::Buddies),
            (Society::FightClub, Society::Vandals),
        ]);
        history.push(Society::Vandals, Society::Saints);

        assert_eq!(history.len(), 4);
        assert_eq!(history.symbols(), vec![2, 3, 3, 0]);
    }

    #[test]
    fn history_length_invariant_under_random_updates() {
        let mut rng = StdRng::seed_from_u64(11);
        for k in 1..=MAX_MEMORY_LENGTH {
            let mut history = History::random(k, &mut rng);
            for _ in 0..50 {
                history.push(Society::random(&mut rng), Society::random(&mut rng));
                assert_eq!(history.len(), 2 * k);
                assert!(history.index() < chromosome_len(k).unwrap());
            }
        }
    }

    #[test]
    fn fitness_is_zero_before_any_round() {
        let mut rng = StdRng::seed_from_u64(1);
        let player = Player::new(0, Chromosome::random(1, &mut rng).unwrap(), 1, &mut rng).unwrap();
        assert_eq!(player.rounds_played(), 0);
        assert_eq!(player.fitness(), 0.0);
    }

    #[test]
    fn fitness_is_average_payoff() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut player = Player::new(0, Chromosome::random(1, &mut rng).unwrap(), 1, &mut rng).unwrap();
        player.update_score(6);
        player.update_score(1);
        player.update_score(4);

        assert_eq!(player.total_payoff(), 11);
        assert_eq!(player.rounds_played(), 3);
        assert!((player.fitness() - 11.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn change_society_reads_gene_at_history_index() {
        let mut genes = vec![Society::Saints; 16];
        genes[7] = Society::FightClub;
        let chromosome = Chromosome::new(genes, 1).unwrap();
        let history = History::from_pairs(&[(Society::Buddies, Society::Vandals)]);
        let mut player = Player::with_state(3, chromosome, Society::Vandals, history).unwrap();

        player.change_society().unwrap();

        assert_eq!(player.society(), Society::FightClub);
    }

    #[test]
    fn with_state_checks_chromosome_against_history() {
        let chromosome = Chromosome::uniform(Society::Saints, 2).unwrap();
        let history = History::from_pairs(&[(Society::Saints, Society::Saints)]);
        let err = Player::with_state(9, chromosome, Society::Saints, history).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidChromosomeLength {
                agent_id: Some(9),
                expected: 16,
                actual: 256
            }
        );
    }

    #[test]
    fn reset_keeps_chromosome_and_clears_payoff() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut player = Player::new(0, Chromosome::random(2, &mut rng).unwrap(), 2, &mut rng).unwrap();
        let chromosome = player.chromosome().clone();
        player.update_score(4);
        player.update_history(Society::Saints);

        player.reset(&mut rng);

        assert_eq!(player.chromosome(), &chromosome);
        assert_eq!(player.total_payoff(), 0);
        assert_eq!(player.rounds_played(), 0);
        assert_eq!(player.history().len(), 4);
    }

    #[test]
    fn offspring_does_not_alias_parent_chromosome() {
        let mut rng = StdRng::seed_from_u64(5);
        let parent = Player::new(4, Chromosome::uniform(Society::Saints, 1).unwrap(), 1, &mut rng).unwrap();
        let mut child = Player::offspring(0, &parent);

        child.chromosome_mut().genes_mut()[0] = Society::Vandals;

        assert_eq!(child.id(), 0);
        assert_eq!(parent.chromosome().gene(0), Some(Society::Saints));
        assert_eq!(child.chromosome().gene(0), Some(Society::Vandals));
    }
}
