use std::fmt;

use serde::Serialize;

use crate::battle::Verdict;
use crate::process::Player;

/// Win/loss/draw tallies for one pairing over many rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Standings {
    pub wins_a: usize,
    pub wins_b: usize,
    pub draws: usize,
}

impl Standings {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Win(Player::A) => self.wins_a += 1,
            Verdict::Win(Player::B) => self.wins_b += 1,
            Verdict::Draw => self.draws += 1,
        }
    }

    /// Combine tallies from two disjoint sets of rounds.
    pub fn merge(self, other: Standings) -> Standings {
        Standings {
            wins_a: self.wins_a + other.wins_a,
            wins_b: self.wins_b + other.wins_b,
            draws: self.draws + other.draws,
        }
    }

    pub fn rounds(&self) -> usize {
        self.wins_a + self.wins_b + self.draws
    }

    pub fn wins(&self, player: Player) -> usize {
        match player {
            Player::A => self.wins_a,
            Player::B => self.wins_b,
        }
    }

    /// ICWS tournament score: three points per win, one per draw.
    pub fn score(&self, player: Player) -> usize {
        3 * self.wins(player) + self.draws
    }

    /// Fraction of rounds `player` won, or 0 with no rounds played.
    pub fn win_rate(&self, player: Player) -> f64 {
        let rounds = self.rounds();
        if rounds == 0 {
            return 0.0;
        }
        self.wins(player) as f64 / rounds as f64
    }
}

impl FromIterator<Verdict> for Standings {
    fn from_iter<I: IntoIterator<Item = Verdict>>(iter: I) -> Self {
        let mut standings = Standings::default();
        for verdict in iter {
            standings.record(verdict);
        }
        standings
    }
}

impl fmt::Display for Standings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A {} / B {} / draw {} (score A {}, B {})",
            self.wins_a,
            self.wins_b,
            self.draws,
            self.score(Player::A),
            self.score(Player::B)
        )
    }
}
