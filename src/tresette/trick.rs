//! Trick

use std::fmt::Display;

use delegate::delegate;
use serde::Serialize;

use super::{rules, score, Card, Points, Seat, SeatCount, Suit};

/// The cards played into the trick in progress.
#[derive(Debug, Clone, Serialize)]
pub struct Trick {
    /// The seat that opened the trick.
    leader: Seat,
    /// The table size, which fixes the number of cards in a trick.
    seats: SeatCount,
    /// The cards played so far, in play order.
    cards: Vec<Card>,
}

impl Display for Trick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, (seat, card)) in self.plays().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{seat}:{card}")?;
        }
        write!(f, "]")
    }
}

impl Trick {
    delegate! {
        to self.cards {
            /// The number of cards played into this trick.
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
        }
    }

    /// Creates an empty trick to be opened by `leader`.
    pub fn new(seats: SeatCount, leader: Seat) -> Self {
        Self {
            leader,
            seats,
            cards: Vec::with_capacity(seats.len()),
        }
    }

    /// The suit set by the lead card; `None` while the trick is empty.
    pub fn requested_suit(&self) -> Option<Suit> {
        self.cards.first().map(|c| c.suit)
    }

    /// The cards played so far, in play order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The cards played so far, paired with the seats that played them.
    pub fn plays(&self) -> impl Iterator<Item = (Seat, Card)> + '_ {
        let seats = self.seats;
        self.cards
            .iter()
            .enumerate()
            .map(move |(i, &c)| ((self.leader + i) % seats.len(), c))
    }

    /// The seat expected to play next, or `None` if the trick is complete.
    pub fn next_seat(&self) -> Option<Seat> {
        if self.is_complete() {
            None
        } else {
            Some((self.leader + self.cards.len()) % self.seats.len())
        }
    }

    /// Returns true once every seat has played.
    pub fn is_complete(&self) -> bool {
        self.cards.len() == self.seats.len()
    }

    /// Plays a card into the trick on behalf of `seat`.
    pub fn play(&mut self, seat: Seat, card: Card) {
        assert_eq!(Some(seat), self.next_seat(), "{seat} played out of turn");
        self.cards.push(card);
    }

    /// The seat taking this trick. The trick must be complete.
    pub fn winner(&self) -> Seat {
        assert!(self.is_complete(), "trick resolved with {} cards", self.len());
        let requested = self.requested_suit().expect("complete trick has a lead");
        rules::trick_winner(&self.cards, self.leader, requested)
    }

    /// Points carried by the cards in the trick.
    pub fn points(&self) -> Points {
        score::trick_points(&self.cards)
    }

    /// Empties the trick, returning its cards.
    pub fn take(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    fn trick(seats: SeatCount, leader: Seat, cards: &[&str]) -> Trick {
        let mut trick = Trick::new(seats, leader);
        for s in cards {
            let seat = trick.next_seat().unwrap();
            trick.play(seat, Card::from_str(s).unwrap());
        }
        trick
    }

    #[test]
    fn test_requested_suit_tracks_lead() {
        let mut t = Trick::new(SeatCount::Four, 1);
        assert_eq!(t.requested_suit(), None);
        t.play(1, Card::from_str("5S").unwrap());
        assert_eq!(t.requested_suit(), Some(Suit::Swords));
        t.play(2, Card::from_str("3C").unwrap());
        assert_eq!(t.requested_suit(), Some(Suit::Swords));
        t.take();
        assert_eq!(t.requested_suit(), None);
    }

    #[test]
    fn test_plays_wrap_around() {
        let t = trick(SeatCount::Four, 2, &["4C", "5C", "6C"]);
        let seats: Vec<Seat> = t.plays().map(|(s, _)| s).collect();
        assert_eq!(seats, vec![2, 3, 0]);
        assert_eq!(t.next_seat(), Some(1));
        assert_eq!(t.to_string(), "[2:4C, 3:5C, 0:6C]");
    }

    #[test]
    fn test_winner_and_points() {
        let t = trick(SeatCount::Four, 0, &["3C", "2C", "AU", "KC"]);
        assert!(t.is_complete());
        assert_eq!(t.next_seat(), None);
        assert_eq!(t.winner(), 0);
        assert_eq!(t.points(), Points::from_cents(199));

        let t = trick(SeatCount::Two, 1, &["7B", "KB"]);
        assert_eq!(t.winner(), 0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_turn() {
        let mut t = Trick::new(SeatCount::Four, 0);
        t.play(1, Card::from_str("4C").unwrap());
    }

    #[test]
    #[should_panic]
    fn test_incomplete_winner() {
        trick(SeatCount::Four, 0, &["3C", "2C"]).winner();
    }
}
