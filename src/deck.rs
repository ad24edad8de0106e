//! A deck of cards.

use std::iter::FromIterator;

use rand::distributions::{Distribution, Standard};
use rand::seq::SliceRandom;
use rand::Rng;

/// A deck of cards.
#[derive(Debug, Clone)]
pub struct Deck<C> {
    cards: Vec<C>,
}

impl<C> Distribution<Deck<C>> for Standard
where
    Deck<C>: Default,
{
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Deck<C> {
        Deck::shuffled(rng)
    }
}

impl<C> FromIterator<C> for Deck<C> {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        let cards = iter.into_iter().collect();
        Self { cards }
    }
}

impl<C> Deck<C>
where
    Deck<C>: Default,
{
    /// A full deck, shuffled with the provided generator.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::default();
        deck.cards.shuffle(rng);
        deck
    }
}

impl<C> Deck<C> {
    /// The number of cards remaining in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns true if every card has been handed out.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Removes `n` cards from the top of the deck.
    pub fn take(&mut self, n: usize) -> Vec<C> {
        let idx = self.cards.len().saturating_sub(n);
        self.cards.split_off(idx)
    }

    /// Deals the deck round-robin, one card at a time, into `seats` hands of
    /// `per_seat` cards. Cards beyond `seats * per_seat` stay in the deck.
    pub fn deal(&mut self, seats: usize, per_seat: usize) -> Vec<Vec<C>> {
        let mut hands: Vec<Vec<C>> = (0..seats).map(|_| Vec::with_capacity(per_seat)).collect();
        let dealt = (seats * per_seat).min(self.cards.len());
        for (i, card) in self.cards.drain(..dealt).enumerate() {
            hands[i % seats].push(card);
        }
        hands
    }
}
