//! Table positions and sides.

use std::convert::TryFrom;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Index of a seat at the table. Seat 0 is always the human player.
pub type Seat = usize;

/// The two supported table sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SeatCount {
    /// Head to head, twenty cards each.
    Two,
    /// Two partnerships, ten cards each.
    Four,
}
impl Default for SeatCount {
    fn default() -> Self {
        SeatCount::Four
    }
}
impl Display for SeatCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.len())
    }
}
impl TryFrom<u8> for SeatCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(SeatCount::Two),
            4 => Ok(SeatCount::Four),
            n => Err(format!("unsupported number of seats: {n}")),
        }
    }
}
impl From<SeatCount> for u8 {
    fn from(count: SeatCount) -> Self {
        match count {
            SeatCount::Two => 2,
            SeatCount::Four => 4,
        }
    }
}
impl SeatCount {
    /// Number of seats at the table.
    pub fn len(self) -> usize {
        usize::from(u8::from(self))
    }

    /// Number of cards dealt to each seat at the start of a hand.
    pub fn hand_size(self) -> usize {
        40 / self.len()
    }

    /// Number of tricks in a hand; equal to the hand size.
    pub fn tricks_per_hand(self) -> usize {
        self.hand_size()
    }

    /// The seat after `seat`, in playing order.
    pub fn next(self, seat: Seat) -> Seat {
        (seat + 1) % self.len()
    }

    /// All seats in table order.
    pub fn seats(self) -> std::ops::Range<Seat> {
        0..self.len()
    }

    /// The seats belonging to `side`.
    pub fn members(self, side: Side) -> impl Iterator<Item = Seat> {
        self.seats().filter(move |&seat| Side::of(seat) == side)
    }
}

/// A side is a partnership in the four-seat game (0 & 2 vs 1 & 3), or a single
/// player in the two-seat game (0 vs 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The human player's side.
    First,
    /// The opposing side.
    Second,
}
impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Side::First => "Side 1",
            Side::Second => "Side 2",
        })
    }
}
impl Side {
    /// The side that `seat` plays for.
    pub fn of(seat: Seat) -> Side {
        if seat % 2 == 0 {
            Side::First
        } else {
            Side::Second
        }
    }

    /// Index into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}
