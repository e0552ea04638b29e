/// Both cooperate
pub const REWARD: u32 = 4;
/// Cooperated against a defector
pub const SUCKER: u32 = 0;
/// Defected against a cooperator
pub const TEMPTATION: u32 = 6;
/// Both defect
pub const PUNISHMENT: u32 = 1;

/// Score deltas `(a, b)` once both cooperation decisions are known
pub fn score(coop_a: bool, coop_b: bool) -> (u32, u32) {
    match (coop_a, coop_b) {
        (true, true) => (REWARD, REWARD),
        (true, false) => (SUCKER, TEMPTATION),
        (false, true) => (TEMPTATION, SUCKER),
        (false, false) => (PUNISHMENT, PUNISHMENT),
    }
}
