use serde::{Deserialize, Serialize};

use crate::agent::Player;
use crate::error::Result;
use crate::payoff;
use crate::society::Society;

/// Everything that happened in one pairwise match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub agent_a: usize,
    pub agent_b: usize,
    pub coop_a: bool,
    pub coop_b: bool,
    pub payoff_a: u32,
    pub payoff_b: u32,
    /// Societies the agents switched to after the match
    pub society_a: Society,
    pub society_b: Society,
}

/// Play one match between two distinct agents.
///
/// Decisions and history entries use the societies held before the match;
/// both agents switch only once scores and histories are updated.
pub fn play_round(a: &mut Player, b: &mut Player) -> Result<MatchOutcome> {
    let society_a = a.society();
    let society_b = b.society();

    let coop_a = a.cooperates_with(b);
    let coop_b = b.cooperates_with(a);

    let (payoff_a, payoff_b) = payoff::score(coop_a, coop_b);
    a.update_score(payoff_a);
    b.update_score(payoff_b);

    a.update_history(society_b);
    b.update_history(society_a);

    a.change_society()?;
    b.change_society()?;

    Ok(MatchOutcome {
        agent_a: a.id(),
        agent_b: b.id(),
        coop_a,
        coop_b,
        payoff_a,
        payoff_b,
        society_a: a.society(),
        society_b: b.society(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Chromosome, History};

    fn player(id: usize, society: Society, table: Society) -> Player {
        let history = History::from_pairs(&[(Society::Saints, Society::Saints)]);
        Player::with_state(id, Chromosome::uniform(table, 1).unwrap(), society, history).unwrap()
    }

    #[test]
    fn all_vandal_tables_turn_both_into_vandals() {
        let mut a = player(0, Society::Saints, Society::Vandals);
        let mut b = player(1, Society::Buddies, Society::Vandals);

        let outcome = play_round(&mut a, &mut b).unwrap();

        assert_eq!(a.society(), Society::Vandals);
        assert_eq!(b.society(), Society::Vandals);
        assert_eq!(outcome.society_a, Society::Vandals);
        assert_eq!(outcome.society_b, Society::Vandals);
    }

    #[test]
    fn saint_against_vandal_is_exploited() {
        let mut saint = player(0, Society::Saints, Society::Saints);
        let mut vandal = player(1, Society::Vandals, Society::Vandals);

        let outcome = play_round(&mut saint, &mut vandal).unwrap();

        assert!(outcome.coop_a);
        assert!(!outcome.coop_b);
        assert_eq!((outcome.payoff_a, outcome.payoff_b), (0, 6));
        assert_eq!(saint.total_payoff(), 0);
        assert_eq!(vandal.total_payoff(), 6);
        assert_eq!(saint.rounds_played(), 1);
        assert_eq!(vandal.rounds_played(), 1);
    }

    #[test]
    fn history_records_pre_match_societies() {
        // Tables switch both to fight club, history must still hold the old labels
        let mut a = player(0, Society::Buddies, Society::FightClub);
        let mut b = player(1, Society::Vandals, Society::FightClub);

        play_round(&mut a, &mut b).unwrap();

        assert_eq!(
            a.history().symbols(),
            vec![Society::Buddies.code(), Society::Vandals.code()]
        );
        assert_eq!(
            b.history().symbols(),
            vec![Society::Vandals.code(), Society::Buddies.code()]
        );
        assert_eq!(a.society(), Society::FightClub);
    }

    #[test]
    fn payoffs_never_decrease() {
        let mut a = player(0, Society::FightClub, Society::Buddies);
        let mut b = player(1, Society::Buddies, Society::FightClub);
        let mut last = (0, 0);
        for _ in 0..20 {
            play_round(&mut a, &mut b).unwrap();
            assert!(a.total_payoff() >= last.0);
            assert!(b.total_payoff() >= last.1);
            last = (a.total_payoff(), b.total_payoff());
        }
    }
}
