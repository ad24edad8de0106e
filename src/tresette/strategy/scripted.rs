//! A scripted strategy, for testing.

use std::collections::VecDeque;
use std::str::FromStr;

use super::{rules, Card, Strategy, Suit};

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Play this card, wherever it sits in the hand.
    Card(Card),
    /// Return this raw index, legal or not.
    Index(usize),
}

/// Plays a queue of predetermined moves, then falls back to the first legal
/// card.
#[derive(Debug, Default)]
pub struct ScriptedStrategy {
    steps: VecDeque<Step>,
}

impl Strategy for ScriptedStrategy {
    fn select_card(&mut self, hand: &[Card], requested: Option<Suit>, _: &[Card]) -> usize {
        match self.steps.pop_front() {
            Some(Step::Card(card)) => hand
                .iter()
                .position(|&c| c == card)
                .unwrap_or_else(|| panic!("scripted card {} is not in hand", card)),
            Some(Step::Index(index)) => index,
            None => rules::legal_indices(hand, requested)[0],
        }
    }
}

impl ScriptedStrategy {
    pub fn plays(mut self, card: &str) -> Self {
        self.steps
            .push_back(Step::Card(Card::from_str(card).unwrap()));
        self
    }

    pub fn picks_index(mut self, index: usize) -> Self {
        self.steps.push_back(Step::Index(index));
        self
    }
}
