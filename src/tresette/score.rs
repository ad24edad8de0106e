//! Scoring.
//!
//! Card values are kept in hundredths of a game point, so totals are exact and
//! can always be recomputed from the captured piles. A side's score is the
//! points of every card its seats have captured, plus one whole point for each
//! hand in which it took the last trick.

use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::{Card, Player, SeatCount, Side};

/// Game points, stored in hundredths.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Points(u32);

impl Points {
    pub const ZERO: Points = Points(0);

    /// The last-trick bonus.
    pub const BONUS: Points = Points(100);

    pub fn from_cents(cents: u32) -> Self {
        Points(cents)
    }

    pub fn whole(points: u32) -> Self {
        Points(points * 100)
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        self.0 += rhs.0;
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Self {
        iter.fold(Points::ZERO, Add::add)
    }
}

/// Running totals for both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub first: Points,
    pub second: Points,
}

impl Display for Scores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.first, self.second)
    }
}

impl Scores {
    pub fn side(&self, side: Side) -> Points {
        match side {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }

    /// The side that has reached `target`. If both have, the higher score
    /// wins; a tie at or above the target leaves the game undecided.
    pub fn winner(&self, target: Points) -> Option<Side> {
        let first = self.first >= target;
        let second = self.second >= target;
        match (first, second) {
            (false, false) => None,
            (true, false) => Some(Side::First),
            (false, true) => Some(Side::Second),
            (true, true) if self.first > self.second => Some(Side::First),
            (true, true) if self.second > self.first => Some(Side::Second),
            (true, true) => None,
        }
    }
}

/// Last-trick bonuses won by each side over the whole game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bonuses([u32; 2]);

impl Bonuses {
    /// Credits one last-trick bonus to `side`.
    pub fn award(&mut self, side: Side) {
        self.0[side.index()] += 1;
    }

    /// Number of bonuses `side` has taken.
    pub fn count(&self, side: Side) -> u32 {
        self.0[side.index()]
    }

    /// Bonus points credited to `side`.
    pub fn points(&self, side: Side) -> Points {
        Points(Points::BONUS.0 * self.count(side))
    }
}

/// Points carried by the cards of a trick.
pub fn trick_points<'a, I: IntoIterator<Item = &'a Card>>(cards: I) -> Points {
    cards
        .into_iter()
        .map(|c| Points::from_cents(c.points()))
        .sum()
}

/// Returns true if `trick_number` (1-based) is the final trick of a hand.
pub fn is_last_trick(trick_number: usize, seats: SeatCount) -> bool {
    trick_number == seats.tricks_per_hand()
}

/// Recomputes both sides' totals from the captured piles and bonuses.
pub fn totals(players: &[Player], bonuses: &Bonuses) -> Scores {
    let mut sums = [Points::ZERO; 2];
    for (seat, player) in players.iter().enumerate() {
        sums[Side::of(seat).index()] += player.captured_points();
    }
    Scores {
        first: sums[0] + bonuses.points(Side::First),
        second: sums[1] + bonuses.points(Side::Second),
    }
}
