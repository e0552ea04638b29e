use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four behavioral archetypes an agent can belong to.
///
/// Each variant carries a fixed code (0-3) that doubles as a history symbol
/// and as a base-4 digit when addressing a chromosome. The mapping is spelled
/// out in [`Society::code`] and [`Society::from_code`]; declaration order
/// plays no part in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Society {
    Saints,
    Buddies,
    FightClub,
    Vandals,
}

impl Society {
    /// All societies in code order
    pub const ALL: [Society; 4] = [
        Society::Saints,
        Society::Buddies,
        Society::FightClub,
        Society::Vandals,
    ];

    pub fn code(self) -> u8 {
        match self {
            Society::Saints => 0,
            Society::Buddies => 1,
            Society::FightClub => 2,
            Society::Vandals => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Society> {
        match code {
            0 => Some(Society::Saints),
            1 => Some(Society::Buddies),
            2 => Some(Society::FightClub),
            3 => Some(Society::Vandals),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Society::Saints => "SAINTS",
            Society::Buddies => "BUDDIES",
            Society::FightClub => "FIGHT_CLUB",
            Society::Vandals => "VANDALS",
        }
    }

    /// Uniformly random society, one RNG draw
    pub fn random(rng: &mut impl Rng) -> Society {
        match rng.random_range(0..4u8) {
            0 => Society::Saints,
            1 => Society::Buddies,
            2 => Society::FightClub,
            _ => Society::Vandals,
        }
    }

    /// Whether a member of `self` cooperates with a member of `other`
    pub fn cooperates_with(self, other: Society) -> bool {
        cooperates_with(self, other)
    }
}

impl fmt::Display for Society {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Society policy: the cooperation decision of an agent in `own` facing an agent in `other`.
///
/// Depends only on the two labels, never on the opponent's decision.
pub fn cooperates_with(own: Society, other: Society) -> bool {
    match own {
        Society::Saints => true,
        Society::Buddies => other == Society::Buddies,
        Society::FightClub => other != Society::FightClub,
        Society::Vandals => false,
    }
}
