//! Dealing a hand.

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use super::{Card, DealError, Deck, SeatCount};

/// The cards dealt to each seat at the start of a hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    seats: SeatCount,
    hands: Vec<Vec<Card>>,
}

impl Deal {
    /// Builds a fresh deck, shuffles it and deals it out completely.
    pub fn shuffled<R: Rng + ?Sized>(seats: SeatCount, rng: &mut R) -> Self {
        Self::from_deck(seats, Deck::shuffled(rng)).expect("a full deck deals evenly")
    }

    /// Deals `deck` round-robin. The deck must hold exactly the 40 distinct
    /// cards, and is consumed by the deal.
    pub fn from_deck(seats: SeatCount, mut deck: Deck) -> Result<Self, DealError> {
        if deck.len() != 40 {
            return Err(DealError::IncompleteDeck);
        }
        let hands = deck.deal(seats.len(), seats.hand_size());
        assert!(deck.is_empty());
        Self::from_hands(seats, hands)
    }

    /// Uses pre-arranged hands, as for replaying a recorded game.
    pub fn from_hands(seats: SeatCount, hands: Vec<Vec<Card>>) -> Result<Self, DealError> {
        let deal = Self { seats, hands };
        deal.validate()?;
        Ok(deal)
    }

    /// Checks that every seat holds a full hand and the hands form a
    /// complete deck.
    pub fn validate(&self) -> Result<(), DealError> {
        if self.hands.len() != self.seats.len()
            || self
                .hands
                .iter()
                .any(|hand| hand.len() != self.seats.hand_size())
        {
            return Err(DealError::InvalidHandSize);
        }
        let seen: HashSet<&Card> = self.hands.iter().flatten().collect();
        if seen.len() == 40 {
            Ok(())
        } else {
            Err(DealError::DuplicateCard)
        }
    }

    pub fn seats(&self) -> SeatCount {
        self.seats
    }

    /// Consumes the deal, returning one hand per seat.
    pub fn into_hands(self) -> Vec<Vec<Card>> {
        self.hands
    }
}
