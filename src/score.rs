//! Running totals for the two contestants.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contestant {
    One,
    Two,
}

impl Contestant {
    pub const ALL: [Contestant; 2] = [Contestant::One, Contestant::Two];

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Contestant::One),
            2 => Some(Contestant::Two),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Contestant::One => 1,
            Contestant::Two => 2,
        }
    }

    /// Label used when the contestant's name field is empty.
    pub fn default_name(self) -> String {
        format!("Contestant {}", self.id())
    }

    fn slot(self) -> usize {
        self.id() as usize - 1
    }
}

impl fmt::Display for Contestant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contestant {}", self.id())
    }
}

/// Unbounded integer scores; totals may go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    scores: [i32; 2],
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, contestant: Contestant) -> i32 {
        self.scores[contestant.slot()]
    }

    /// Add `delta` to the contestant's total and return the new total.
    pub fn adjust(&mut self, contestant: Contestant, delta: i32) -> i32 {
        let slot = &mut self.scores[contestant.slot()];
        *slot = slot.saturating_add(delta);
        *slot
    }

    /// Display flag for a below-zero total.
    pub fn is_negative(&self, contestant: Contestant) -> bool {
        self.score(contestant) < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_flag_follows_the_score() {
        let mut ledger = ScoreLedger::new();
        assert_eq!(ledger.adjust(Contestant::One, -3), -3);
        assert!(ledger.is_negative(Contestant::One));
        assert_eq!(ledger.adjust(Contestant::One, 3), 0);
        assert!(!ledger.is_negative(Contestant::One));
    }

    #[test]
    fn contestants_are_independent() {
        let mut ledger = ScoreLedger::new();
        ledger.adjust(Contestant::Two, 12);
        ledger.adjust(Contestant::Two, -20);
        assert_eq!(ledger.score(Contestant::One), 0);
        assert_eq!(ledger.score(Contestant::Two), -8);
    }

    #[test]
    fn ids_round_trip() {
        for c in Contestant::ALL {
            assert_eq!(Contestant::from_id(c.id()), Some(c));
        }
        assert_eq!(Contestant::from_id(0), None);
        assert_eq!(Contestant::from_id(3), None);
        assert_eq!(Contestant::Two.default_name(), "Contestant 2");
    }
}
