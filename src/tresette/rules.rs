//! Move legality and trick resolution.

use super::{Card, Seat, Suit};

/// Returns true if `candidate` may be played from `hand`.
///
/// With no requested suit (the trick is being opened) any card is legal.
/// Otherwise a player holding the requested suit must play it; a player void
/// in it may play anything.
pub fn is_legal(hand: &[Card], candidate: Card, requested: Option<Suit>) -> bool {
    match requested {
        None => true,
        Some(suit) => candidate.suit == suit || !hand.iter().any(|c| c.suit == suit),
    }
}

/// Indices of the cards in `hand` that may legally be played.
pub fn legal_indices(hand: &[Card], requested: Option<Suit>) -> Vec<usize> {
    hand.iter()
        .enumerate()
        .filter(|(_, &c)| is_legal(hand, c, requested))
        .map(|(i, _)| i)
        .collect()
}

/// Determines which seat takes a complete trick.
///
/// `cards` are in play order, starting with `first`, one card per seat. Only
/// cards of the requested suit compete, and the strongest of them wins.
pub fn trick_winner(cards: &[Card], first: Seat, requested: Suit) -> Seat {
    let seats = cards.len();
    assert!(seats > 0, "cannot resolve an empty trick");
    let (offset, _) = cards
        .iter()
        .enumerate()
        .filter(|(_, c)| c.suit == requested)
        .max_by_key(|(_, c)| c.strength())
        .expect("the lead card always follows the requested suit");
    (first + offset) % seats
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    fn cards(cards: &[&str]) -> Vec<Card> {
        cards.iter().map(|s| Card::from_str(s).unwrap()).collect()
    }

    #[test]
    fn test_open_trick_anything_goes() {
        let hand = cards(&["AC", "4U", "KS"]);
        for &card in &hand {
            assert!(is_legal(&hand, card, None));
        }
    }

    #[test]
    fn test_must_follow_suit() {
        let hand = cards(&["AC", "4U", "KS", "7C"]);
        let legal: Vec<_> = hand
            .iter()
            .filter(|&&c| is_legal(&hand, c, Some(Suit::Coins)))
            .copied()
            .collect();
        assert_eq!(legal, cards(&["AC", "7C"]));
        assert_eq!(legal_indices(&hand, Some(Suit::Coins)), vec![0, 3]);
    }

    #[test]
    fn test_void_plays_anything() {
        let hand = cards(&["4U", "KS"]);
        assert_eq!(legal_indices(&hand, Some(Suit::Batons)), vec![0, 1]);
    }

    #[test]
    fn test_suit_following_exhaustive() {
        let hand = cards(&["AC", "2U", "3S", "4B", "5C"]);
        for &suit in Suit::all_suits() {
            let holds = hand.iter().any(|c| c.suit == suit);
            for &card in &hand {
                let legal = is_legal(&hand, card, Some(suit));
                if holds {
                    assert_eq!(legal, card.suit == suit, "{card} on {suit}");
                } else {
                    assert!(legal);
                }
            }
        }
    }

    #[test]
    fn test_trick_winner() {
        struct Case {
            cards: &'static [&'static str],
            first: Seat,
            expect: Seat,
        }

        let cases = [
            // 3 beats 2 beats king; the off-suit ace cannot win.
            Case {
                cards: &["3C", "2C", "AU", "KC"],
                first: 0,
                expect: 0,
            },
            Case {
                cards: &["4C", "2C", "AU", "KC"],
                first: 0,
                expect: 1,
            },
            Case {
                cards: &["4C", "3U", "3S", "3B"],
                first: 2,
                expect: 2,
            },
            Case {
                cards: &["4C", "5C", "6U", "AC"],
                first: 3,
                expect: 2,
            },
            Case {
                cards: &["NB", "JB"],
                first: 1,
                expect: 1,
            },
            Case {
                cards: &["NB", "3B"],
                first: 1,
                expect: 0,
            },
        ];
        for case in cases.iter() {
            let trick = cards(case.cards);
            let requested = trick[0].suit;
            assert_eq!(
                trick_winner(&trick, case.first, requested),
                case.expect,
                "{:?}",
                case.cards
            );
        }
    }

    #[test]
    #[should_panic]
    fn test_no_eligible_card_is_a_bug() {
        trick_winner(&cards(&["4C", "5U"]), 0, Suit::Swords);
    }
}
