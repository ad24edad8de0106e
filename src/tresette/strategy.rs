//! Card selection for automated seats.

use clap::ValueEnum;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{rules, Card, Suit};

#[cfg(test)]
mod scripted;
#[cfg(test)]
pub use scripted::ScriptedStrategy;

/// A policy that picks the card an automated seat plays.
pub trait Strategy {
    /// Returns the index into `hand` of the card to play.
    ///
    /// `requested` is the suit of the trick's lead card, or `None` when this
    /// seat opens the trick. `played` lists the trick's cards so far. The
    /// returned index must be legal under [`rules::is_legal`].
    fn select_card(&mut self, hand: &[Card], requested: Option<Suit>, played: &[Card]) -> usize;
}

/// Available strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Uniformly random among the legal cards.
    #[default]
    Random,
    /// Follows cheaply, wins when it can, discards low.
    Basic,
}

impl StrategyKind {
    /// Builds the strategy. `seed` makes the random strategy reproducible.
    pub fn build(self, seed: Option<u64>) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
            StrategyKind::Basic => Box::new(BasicStrategy),
        }
    }
}

/// Picks uniformly among the currently legal cards.
#[derive(Debug)]
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Strategy for RandomStrategy {
    fn select_card(&mut self, hand: &[Card], requested: Option<Suit>, _: &[Card]) -> usize {
        *rules::legal_indices(hand, requested)
            .choose(&mut self.rng)
            .expect("a non-empty hand always has a legal card")
    }
}

/// A simple heuristic player.
///
/// Leads a middling card so as not to give away its strongest. When following
/// it plays the cheapest card that takes the trick so far, or its weakest card
/// of the suit if it cannot win. When void it throws its least valuable card.
#[derive(Debug, Default)]
pub struct BasicStrategy;

impl Strategy for BasicStrategy {
    fn select_card(&mut self, hand: &[Card], requested: Option<Suit>, played: &[Card]) -> usize {
        assert!(!hand.is_empty(), "asked to play from an empty hand");
        let suit = match requested {
            None => return median_lead(hand),
            Some(suit) => suit,
        };
        let following: Vec<(usize, Card)> = hand
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, c)| c.suit == suit)
            .collect();
        if following.is_empty() {
            return cheapest(hand.iter().copied().enumerate());
        }
        let best_on_table = played
            .iter()
            .filter(|c| c.suit == suit)
            .map(|c| c.strength())
            .max()
            .unwrap_or(0);
        following
            .iter()
            .filter(|(_, c)| c.strength() > best_on_table)
            .min_by_key(|(_, c)| c.strength())
            .or_else(|| following.iter().min_by_key(|(_, c)| c.strength()))
            .map(|&(i, _)| i)
            .expect("following is non-empty")
    }
}

/// The card of median strength.
fn median_lead(hand: &[Card]) -> usize {
    let sorted = hand
        .iter()
        .enumerate()
        .sorted_by_key(|(_, c)| c.strength())
        .map(|(i, _)| i)
        .collect_vec();
    sorted[sorted.len() / 2]
}

/// The least valuable card: fewest points, then weakest.
fn cheapest<I: Iterator<Item = (usize, Card)>>(cards: I) -> usize {
    cards
        .min_by_key(|(_, c)| (c.points(), c.strength()))
        .map(|(i, _)| i)
        .expect("non-empty")
}
