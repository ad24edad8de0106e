//! Italian 40-card deck.

use std::convert::{TryFrom, TryInto};
use std::fmt::Display;
use std::str::FromStr;

use ansi_term::{ANSIString, Colour};
use serde::{Deserialize, Serialize};

use crate::deck;

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Coins,
    Cups,
    Swords,
    Batons,
}
impl Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Suit::Coins => "C",
            Suit::Cups => "U",
            Suit::Swords => "S",
            Suit::Batons => "B",
        })
    }
}
impl TryFrom<char> for Suit {
    type Error = ();

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c {
            'C' | 'c' => Suit::Coins,
            'U' | 'u' => Suit::Cups,
            'S' | 's' => Suit::Swords,
            'B' | 'b' => Suit::Batons,
            _ => return Err(()),
        })
    }
}
impl FromStr for Suit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Suit::try_from(c),
            _ => Err(()),
        }
    }
}
impl Suit {
    /// Returns an array of all suits.
    pub fn all_suits() -> &'static [Suit; 4] {
        static SUITS: [Suit; 4] = [Suit::Coins, Suit::Cups, Suit::Swords, Suit::Batons];
        &SUITS
    }

    /// The full name of the suit.
    pub fn name(self) -> &'static str {
        match self {
            Suit::Coins => "Coins",
            Suit::Cups => "Cups",
            Suit::Swords => "Swords",
            Suit::Batons => "Batons",
        }
    }

    /// The colour used when printing cards of this suit.
    fn colour(self) -> Colour {
        match self {
            Suit::Coins => Colour::Yellow,
            Suit::Cups => Colour::Red,
            Suit::Swords => Colour::Blue,
            Suit::Batons => Colour::Green,
        }
    }

    /// Returns a string representation of the suit, decorated with ANSI color codes.
    pub fn to_ansi_string(self) -> ANSIString<'static> {
        self.colour().paint(self.to_string())
    }
}

/// Card rank, from ace (1) up to king (10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Jack,
    Knight,
    King,
}
impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Jack => "J",
            Rank::Knight => "N",
            Rank::King => "K",
        })
    }
}
impl TryFrom<char> for Rank {
    type Error = ();

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c {
            'A' | 'a' | '1' => Rank::Ace,
            '2' => Rank::Two,
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            'J' | 'j' => Rank::Jack,
            'N' | 'n' => Rank::Knight,
            'K' | 'k' => Rank::King,
            _ => return Err(()),
        })
    }
}
impl TryFrom<u8> for Rank {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::all_ranks()
            .get(usize::from(value).wrapping_sub(1))
            .copied()
            .ok_or(())
    }
}
impl Rank {
    /// Returns an array of all ranks, in ascending face value.
    pub fn all_ranks() -> &'static [Rank; 10] {
        static RANKS: [Rank; 10] = [
            Rank::Ace,
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Jack,
            Rank::Knight,
            Rank::King,
        ];
        &RANKS
    }

    /// Face value, 1 through 10.
    pub fn value(self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Jack => 8,
            Rank::Knight => 9,
            Rank::King => 10,
        }
    }

    /// Score value in hundredths of a game point.
    pub fn points(self) -> u32 {
        match self {
            Rank::Ace => 100,
            Rank::Two | Rank::Three | Rank::Jack | Rank::Knight | Rank::King => 33,
            Rank::Four | Rank::Five | Rank::Six | Rank::Seven => 0,
        }
    }

    /// Strength when competing for a trick: 3 > 2 > A > K > N > J > 7 > 6 > 5 > 4.
    pub fn strength(self) -> u8 {
        match self {
            Rank::Three => 10,
            Rank::Two => 9,
            Rank::Ace => 8,
            Rank::King => 7,
            Rank::Knight => 6,
            Rank::Jack => 5,
            Rank::Seven => 4,
            Rank::Six => 3,
            Rank::Five => 2,
            Rank::Four => 1,
        }
    }
}

/// A card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    /// Card rank.
    pub rank: Rank,
    /// Card suit.
    pub suit: Suit,
}
impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
impl FromStr for Card {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let rank = chars.next().ok_or(())?.try_into()?;
        let suit = chars.next().ok_or(())?.try_into()?;
        if chars.next().is_some() {
            return Err(());
        }
        Ok(Card { rank, suit })
    }
}
impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Card::from_str(&s).map_err(|()| serde::de::Error::custom("not a tresette card"))
    }
}
impl Card {
    /// Creates a new [`Card`].
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Score value in hundredths of a game point.
    pub fn points(self) -> u32 {
        self.rank.points()
    }

    /// Strength of the card when competing for a trick.
    pub fn strength(self) -> u8 {
        self.rank.strength()
    }

    /// Returns a string representation of the card, decorated with ANSI color codes.
    pub fn to_ansi_string(self) -> ANSIString<'static> {
        self.suit.colour().paint(self.to_string())
    }
}

/// A tresette deck.
pub type Deck = deck::Deck<Card>;
impl Default for Deck {
    fn default() -> Self {
        itertools::iproduct!(Suit::all_suits(), Rank::all_ranks())
            .map(|(&suit, &rank)| Card { rank, suit })
            .collect()
    }
}
