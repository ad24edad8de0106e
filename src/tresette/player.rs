//! A player seated at the table.

use std::fmt::Display;

use delegate::delegate;
use serde::Serialize;

use super::{Card, Points};

/// Who controls a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Control {
    /// Moves arrive as commands from the front-end.
    Human,
    /// Moves are chosen by the table's strategy.
    Robot,
}

/// A seat's hand and the cards it has captured.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    name: String,
    control: Control,
    hand: Vec<Card>,
    captured: Vec<Card>,
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.control {
            Control::Human => write!(f, "{} (human)", self.name),
            Control::Robot => write!(f, "{} (robot)", self.name),
        }
    }
}

impl Player {
    /// Creates a human player with empty hand and pile.
    pub fn human<S: Into<String>>(name: S) -> Self {
        Self::new(name.into(), Control::Human)
    }

    /// Creates an automated player with empty hand and pile.
    pub fn robot<S: Into<String>>(name: S) -> Self {
        Self::new(name.into(), Control::Robot)
    }

    fn new(name: String, control: Control) -> Self {
        Self {
            name,
            control,
            hand: vec![],
            captured: vec![],
        }
    }

    delegate! {
        to self.hand {
            /// Number of cards still in hand.
            #[call(len)]
            pub fn hand_len(&self) -> usize;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_human(&self) -> bool {
        self.control == Control::Human
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn captured(&self) -> &[Card] {
        &self.captured
    }

    /// Replaces the hand with a freshly dealt one. The previous hand must be
    /// exhausted.
    pub fn take_deal(&mut self, cards: Vec<Card>) {
        assert!(self.hand.is_empty(), "{} still holds cards", self.name);
        self.hand = cards;
    }

    /// Removes and returns the card at `index`.
    pub fn play(&mut self, index: usize) -> Card {
        self.hand.remove(index)
    }

    /// Adds a whole trick to the captured pile.
    pub fn capture<I: IntoIterator<Item = Card>>(&mut self, trick: I) {
        self.captured.extend(trick);
    }

    /// Sum of the captured cards' points.
    pub fn captured_points(&self) -> Points {
        self.captured.iter().map(|c| Points::from_cents(c.points())).sum()
    }
}
