use std::collections::HashMap;
use std::str::FromStr;

use assert_matches::assert_matches;

use crate::tresette::{History, MemoryStats, ScriptedStrategy};

use super::*;

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

fn cards(cards: &[&str]) -> Vec<Card> {
    cards.iter().map(|s| Card::from_str(s).unwrap()).collect()
}

fn table_with(strategy: ScriptedStrategy) -> (Table, History) {
    let mut table = Table::new(
        Timing::default(),
        Box::new(strategy),
        Box::new(MemoryStats::default()),
        Some(7),
    );
    let history = History::default();
    table.subscribe(Arc::new(history.clone()));
    (table, history)
}

fn setup(target: u32, seats: SeatCount) -> GameSetup {
    GameSetup::new("Ada", target, seats).unwrap()
}

/// Seat 2 holds every Cups card and no Coins.
fn coins_deal() -> Deal {
    Deal::from_hands(
        SeatCount::Four,
        vec![
            cards(&["3C", "AC", "4C", "5C", "6C", "AS", "2S", "3S", "4S", "5S"]),
            cards(&["2C", "7C", "JC", "NC", "AB", "2B", "3B", "4B", "5B", "6B"]),
            cards(&["4U", "AU", "2U", "3U", "5U", "6U", "7U", "JU", "NU", "KU"]),
            cards(&["KC", "6S", "7S", "JS", "NS", "KS", "7B", "JB", "NB", "KB"]),
        ],
    )
    .unwrap()
}

/// Runs continuations until none are pending.
fn settle(table: &mut Table) {
    while let Some(at) = table.next_deadline() {
        table.advance_to(at).unwrap();
    }
}

fn play_first_legal(table: &mut Table) -> Card {
    let index = table.legal_indices(0)[0];
    table.play_card(0, index).unwrap()
}

/// Plays the human seat's first legal card whenever it is on turn, until
/// `done` holds or the game ends. Checks card conservation along the way.
fn play_until<F: Fn(&Table, &[Event]) -> bool>(table: &mut Table, history: &History, done: F) {
    loop {
        while let Some(at) = table.next_deadline() {
            table.advance_to(at).unwrap();
            assert_conserved(table);
        }
        if done(table, &history.events()) || table.phase() == Phase::GameOver {
            return;
        }
        play_first_legal(table);
        assert_conserved(table);
    }
}

/// Every card of every deck dealt so far is in exactly one hand, pile or
/// the open trick.
fn assert_conserved(table: &Table) {
    if !table.in_progress() {
        return;
    }
    let mut counts: HashMap<Card, u32> = HashMap::new();
    let held = table
        .players()
        .iter()
        .flat_map(|p| p.hand().iter().chain(p.captured()));
    for &card in held.chain(table.trick().cards()) {
        *counts.entry(card).or_default() += 1;
    }
    assert_eq!(counts.len(), 40);
    assert!(
        counts.values().all(|&n| n == table.hand_number()),
        "{:?}",
        counts
    );
}

fn card_plays(events: &[Event]) -> Vec<(Seat, Card)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::CardPlayed { seat, card, .. } => Some((*seat, *card)),
            _ => None,
        })
        .collect()
}

fn finished_hands(events: &[Event]) -> Vec<Scores> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::HandFinished { scores, .. } => Some(*scores),
            _ => None,
        })
        .collect()
}

#[test]
fn test_new_game_deals() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    assert_eq!(table.stage(), Stage::NotStarted);
    table.start_new_game(setup(41, SeatCount::Four)).unwrap();

    let names: Vec<_> = table.players().iter().map(Player::name).collect();
    assert_eq!(names, vec!["Ada", "Marcovaldo", "Viligelmo", "Astolfo"]);
    assert!(table.players().iter().all(|p| p.hand_len() == 10));
    assert_eq!(table.current_seat(), Some(0));
    assert_eq!(table.hand_number(), 1);
    assert_eq!(table.trick_number(), 1);
    assert_eq!(table.requested_suit(), None);
    assert_eq!(table.stage(), Stage::HumanTurn);
    assert_eq!(table.next_deadline(), None);
    assert_conserved(&table);

    assert_eq!(
        history.events(),
        vec![
            Event::StateChanged {
                stage: Stage::Dealing
            },
            Event::StateChanged {
                stage: Stage::HumanTurn
            },
            Event::TurnChanged {
                seat: 0,
                name: "Ada".into()
            },
        ]
    );
}

#[test]
fn test_coins_trick() {
    let strategy = ScriptedStrategy::default()
        .plays("2C")
        .plays("4U")
        .plays("KC");
    let (mut table, history) = table_with(strategy);
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();

    assert_eq!(table.play_card(0, 0).unwrap(), Card::from_str("3C").unwrap());
    assert_eq!(table.requested_suit(), Some(Suit::Coins));
    assert_eq!(table.current_seat(), Some(1));
    assert_eq!(table.stage(), Stage::RobotTurn);

    // Automated seats wait for their think time.
    table.advance(ms(999)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 1);
    table.advance(ms(1)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 2);
    table.advance(ms(2000)).unwrap();

    assert_eq!(
        card_plays(&history.events()),
        vec![
            (0, Card::from_str("3C").unwrap()),
            (1, Card::from_str("2C").unwrap()),
            (2, Card::from_str("4U").unwrap()),
            (3, Card::from_str("KC").unwrap()),
        ]
    );
    assert_eq!(table.phase(), Phase::Evaluating);
    assert_eq!(table.requested_suit(), None);
    assert_eq!(table.last_trick().unwrap().winner(), 0);
    assert_eq!(table.player(0).captured().len(), 4);
    assert_eq!(table.scores().first, Points::from_cents(99));
    assert_eq!(table.scores().second, Points::ZERO);
    assert!(history.events().contains(&Event::TrickFinished {
        winner: 0,
        name: "Ada".into(),
        points: Points::from_cents(99),
        last: false,
    }));
    assert_conserved(&table);

    // Nothing moves while the trick is on display.
    assert_matches!(table.play_card(0, 0), Err(TableError::TrickEvaluating));
    assert_matches!(table.toggle_pause(), Err(TableError::TrickEvaluating));
    assert_matches!(
        table.start_new_game(setup(41, SeatCount::Four)),
        Err(TableError::TrickEvaluating)
    );

    table.advance(ms(2000)).unwrap();
    assert_eq!(table.phase(), Phase::TrickOpen);
    assert_eq!(table.current_seat(), Some(0));
    assert_eq!(table.trick_number(), 2);
    assert_eq!(table.stage(), Stage::HumanTurn);
}

#[test]
fn test_rejected_moves_change_nothing() {
    // One script serves every automated seat, in turn order.
    let (mut table, history) = table_with(
        ScriptedStrategy::default()
            .plays("2C")
            .plays("4U")
            .plays("KC")
            .plays("7C"),
    );
    assert_matches!(table.play_card(0, 0), Err(TableError::NotInProgress));
    assert_matches!(table.toggle_pause(), Err(TableError::NotInProgress));

    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    assert_matches!(
        table.play_card(0, 10),
        Err(TableError::Player(PlayerError::CardIndexOutOfRange {
            index: 10,
            len: 10
        }))
    );
    assert_matches!(
        table.play_card(2, 0),
        Err(TableError::Player(PlayerError::NotYourTurn {
            seat: 2,
            current: 0
        }))
    );

    // Lead the weak 4C; Marcovaldo takes it with the 2 and leads 7C.
    table.play_card(0, 2).unwrap();
    assert_matches!(
        table.play_card(1, 0),
        Err(TableError::Player(PlayerError::NotHuman(1)))
    );
    settle(&mut table);
    assert_eq!(table.last_trick().unwrap().winner(), 1);
    assert_eq!(table.requested_suit(), Some(Suit::Coins));
    assert_eq!(table.current_seat(), Some(0));

    let hand = table.player(0).hand().to_vec();
    assert_eq!(hand[4], Card::from_str("AS").unwrap());
    assert_eq!(table.legal_indices(0), vec![0, 1, 2, 3]);
    assert!(table.is_playable(0, 0));
    assert!(!table.is_playable(0, 4));
    assert!(!table.is_playable(1, 0));

    let before = history.events().len();
    assert_matches!(
        table.play_card(0, 4),
        Err(TableError::Player(PlayerError::MustFollowSuit {
            seat: 0,
            suit: Suit::Coins,
            ..
        }))
    );
    assert_eq!(table.player(0).hand(), &hand[..]);
    assert_eq!(table.trick().len(), 3);
    assert_eq!(history.events().len(), before);
    assert_conserved(&table);

    table.play_card(0, 0).unwrap();
}

#[test]
fn test_pause_keeps_turn_context() {
    let (mut table, history) = table_with(ScriptedStrategy::default().plays("2C"));
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    table.play_card(0, 0).unwrap();

    assert_eq!(table.toggle_pause(), Ok(true));
    assert_eq!(table.stage(), Stage::Paused);
    let generation = table.generation();

    // The pending turn fires, sees the pause and does nothing.
    table.advance(ms(5000)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 1);
    assert_eq!(table.current_seat(), Some(1));
    assert_eq!(table.requested_suit(), Some(Suit::Coins));
    assert_eq!(table.generation(), generation);
    assert_matches!(table.play_card(0, 0), Err(TableError::Paused));

    assert_eq!(table.toggle_pause(), Ok(false));
    assert_eq!(table.current_seat(), Some(1));
    assert_eq!(table.requested_suit(), Some(Suit::Coins));
    let events = history.events();
    assert_eq!(
        &events[events.len() - 2..],
        &[
            Event::StateChanged {
                stage: Stage::RobotTurn
            },
            Event::TurnChanged {
                seat: 1,
                name: "Marcovaldo".into()
            },
        ]
    );

    // Resuming uses the shorter resume delay.
    table.advance(ms(499)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 1);
    table.advance(ms(1)).unwrap();
    assert_eq!(
        card_plays(&history.events())[1],
        (1, Card::from_str("2C").unwrap())
    );
}

#[test]
fn test_pause_round_trip_is_idempotent() {
    let (mut table, _) = table_with(ScriptedStrategy::default());
    table.start_new_game(setup(41, SeatCount::Four)).unwrap();
    let hand = table.player(0).hand().to_vec();
    for _ in 0..3 {
        assert_eq!(table.toggle_pause(), Ok(true));
        assert_eq!(table.toggle_pause(), Ok(false));
    }
    assert_eq!(table.current_seat(), Some(0));
    assert_eq!(table.requested_suit(), None);
    assert_eq!(table.player(0).hand(), &hand[..]);
    assert_eq!(table.next_deadline(), None);
    play_first_legal(&mut table);
}

#[test]
fn test_no_duplicate_automated_turns() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    table.play_card(0, 0).unwrap();

    // Each resume posts another wake-up for the same turn.
    for _ in 0..2 {
        table.toggle_pause().unwrap();
        table.toggle_pause().unwrap();
    }
    assert_eq!(table.timeline.len(), 3);

    table.advance_to(ms(1000)).unwrap();
    let plays = card_plays(&history.events());
    assert_eq!(plays.iter().filter(|(seat, _)| *seat == 1).count(), 1);
    assert_eq!(plays.len(), 2);
    assert_eq!(table.current_seat(), Some(2));
}

#[test]
fn test_guard_blocks_reentry() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    table.play_card(0, 0).unwrap();

    table.robot_turn_running = true;
    table.advance(ms(1000)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 1);
    table.current = 0;
    assert_matches!(
        table.play_card(0, 0),
        Err(TableError::AutomatedTurnRunning)
    );
    table.current = 1;
    table.robot_turn_running = false;

    table.toggle_pause().unwrap();
    table.toggle_pause().unwrap();
    table.advance(ms(500)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 2);
}

#[test]
fn test_stale_continuation_is_dropped() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    let stale = table.generation();
    table.play_card(0, 0).unwrap();
    table.timeline.schedule(
        ms(10),
        Wake::RobotTurn {
            seat: 1,
            generation: stale,
        },
    );
    table.advance(ms(10)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 1);

    table.abandon();
    assert_eq!(table.phase(), Phase::NotStarted);
    assert_eq!(table.current_seat(), None);
    assert!(table.players().is_empty());
    table.advance(ms(10_000)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 1);
    assert_eq!(
        history.events().last(),
        Some(&Event::StateChanged {
            stage: Stage::NotStarted
        })
    );
}

#[test]
fn test_listener_failures_are_isolated() {
    struct Panicking;
    impl Listener for Panicking {
        fn notify(&self, event: &Event) -> anyhow::Result<()> {
            if let Event::CardPlayed { .. } = event {
                panic!("view crashed");
            }
            anyhow::bail!("ignored")
        }
    }

    let (mut table, history) = table_with(ScriptedStrategy::default());
    table.subscribe(Arc::new(Panicking));
    table.start_new_game(setup(41, SeatCount::Four)).unwrap();
    play_first_legal(&mut table);
    settle(&mut table);
    assert_eq!(table.trick_number(), 2);
    assert!(card_plays(&history.events()).len() >= 4);
}

#[test]
fn test_broken_strategy_is_reported() {
    let (mut table, history) = table_with(ScriptedStrategy::default().picks_index(99));
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    table.play_card(0, 0).unwrap();

    assert_matches!(
        table.advance(ms(1000)),
        Err(TableError::Strategy {
            seat: 1,
            error: PlayerError::CardIndexOutOfRange { index: 99, len: 10 }
        })
    );
    assert_eq!(table.current_seat(), Some(1));
    assert_eq!(table.player(1).hand_len(), 10);
    assert!(!table.robot_turn_running);
    assert_eq!(card_plays(&history.events()).len(), 1);

    // Resuming retries the turn.
    table.toggle_pause().unwrap();
    table.toggle_pause().unwrap();
    table.advance(ms(500)).unwrap();
    assert_eq!(card_plays(&history.events()).len(), 2);
}

struct Panicking;

impl Strategy for Panicking {
    fn select_card(&mut self, _: &[Card], _: Option<Suit>, _: &[Card]) -> usize {
        panic!("no idea what to play")
    }
}

#[test]
fn test_panicking_strategy_releases_guard() {
    let mut table = Table::new(
        Timing::default(),
        Box::new(Panicking),
        Box::new(MemoryStats::default()),
        Some(7),
    );
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    table.play_card(0, 0).unwrap();

    assert_eq!(table.advance(ms(1000)), Err(TableError::StrategyPanicked(1)));
    assert!(!table.robot_turn_running);
    assert_eq!(table.current_seat(), Some(1));
    assert_eq!(table.player(1).hand_len(), 10);
    assert_eq!(table.trick().len(), 1);
    assert_matches!(
        table.play_card(0, 0),
        Err(TableError::Player(PlayerError::NotYourTurn {
            seat: 0,
            current: 1
        }))
    );
    assert_eq!(table.toggle_pause(), Ok(true));
    assert_eq!(table.toggle_pause(), Ok(false));
}

#[test]
fn test_illegal_strategy_choice_is_rejected() {
    // Marcovaldo holds Coins, so the ace of Batons may not follow 3C.
    let (mut table, _) = table_with(ScriptedStrategy::default().plays("AB"));
    table
        .start_new_game_with(setup(41, SeatCount::Four), coins_deal())
        .unwrap();
    table.play_card(0, 0).unwrap();
    assert_matches!(
        table.advance(ms(1000)),
        Err(TableError::Strategy {
            seat: 1,
            error: PlayerError::MustFollowSuit { .. }
        })
    );
    assert_eq!(table.trick().len(), 1);
}

#[test]
fn test_full_hand_scores_and_bonus() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    table.start_new_game(setup(41, SeatCount::Four)).unwrap();
    play_until(&mut table, &history, |_, events| {
        !finished_hands(events).is_empty()
    });

    let events = history.events();
    let tricks: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            Event::TrickFinished { last, .. } => Some(*last),
            _ => None,
        })
        .take(10)
        .collect();
    assert_eq!(tricks.len(), 10);
    assert_eq!(tricks.iter().filter(|&&last| last).count(), 1);
    assert!(tricks[9]);

    // 10.60 in the cards plus the bonus.
    let card_points: Points = events
        .iter()
        .filter_map(|e| match e {
            Event::TrickFinished { points, .. } => Some(*points),
            _ => None,
        })
        .take(10)
        .sum();
    assert_eq!(card_points, Points::from_cents(1060));
    let scores = finished_hands(&events)[0];
    assert_eq!(scores.first + scores.second, Points::from_cents(1160));
    let bonuses = table.bonuses();
    assert_eq!(bonuses.count(Side::First) + bonuses.count(Side::Second), 1);

    // The next hand is led by the seat after the previous leader.
    let hand_finished = events
        .iter()
        .position(|e| matches!(e, Event::HandFinished { hand: 1, .. }))
        .unwrap();
    let next_lead = events[hand_finished..]
        .iter()
        .find_map(|e| match e {
            Event::CardPlayed { seat, .. } => Some(*seat),
            _ => None,
        });
    assert_eq!(table.hand_number(), 2);
    assert_eq!(next_lead, Some(1));
}

#[test]
fn test_scores_accumulate_across_hands() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    table.start_new_game(setup(41, SeatCount::Four)).unwrap();
    play_until(&mut table, &history, |_, events| {
        finished_hands(events).len() == 2
    });

    let hands = finished_hands(&history.events());
    assert_eq!(hands[1].first + hands[1].second, Points::from_cents(2320));
    assert!(hands[1].first >= hands[0].first);
    assert!(hands[1].second >= hands[0].second);
    assert_eq!(
        table.scores(),
        score::totals(table.players(), &table.bonuses())
    );
}

#[test]
fn test_two_seats() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    table.start_new_game(setup(41, SeatCount::Two)).unwrap();
    let names: Vec<_> = table.players().iter().map(Player::name).collect();
    assert_eq!(names, vec!["Ada", "Marcovaldo"]);
    assert!(table.players().iter().all(|p| p.hand_len() == 20));

    play_until(&mut table, &history, |_, events| {
        !finished_hands(events).is_empty()
    });
    let events = history.events();
    let last = events
        .iter()
        .filter_map(|e| match e {
            Event::TrickFinished { last, .. } => Some(*last),
            _ => None,
        })
        .take(20)
        .collect::<Vec<_>>();
    assert_eq!(last.len(), 20);
    assert!(last[19] && !last[..19].iter().any(|&l| l));
    let scores = finished_hands(&events)[0];
    assert_eq!(scores.first + scores.second, Points::from_cents(1160));
}

#[test]
fn test_game_over_records_stats() {
    let (mut table, history) = table_with(ScriptedStrategy::default());
    table.start_new_game(setup(21, SeatCount::Four)).unwrap();
    play_until(&mut table, &history, |_, _| false);

    assert_eq!(table.phase(), Phase::GameOver);
    assert!(!table.in_progress());
    assert_eq!(table.stage(), Stage::GameOver);
    assert_eq!(table.next_deadline(), None);

    let events = history.events();
    let winner = events
        .iter()
        .find_map(|e| match e {
            Event::GameOver { winner, scores } => {
                assert_eq!(*scores, table.scores());
                Some(*winner)
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(
        table.scores().winner(Points::whole(21)),
        Some(winner)
    );

    let stats = table.human_stats().unwrap();
    assert_eq!(stats.played, 1);
    assert_eq!(stats.won, u32::from(winner == Side::First));
    assert_eq!(stats.lost, u32::from(winner == Side::Second));

    assert_matches!(table.play_card(0, 0), Err(TableError::GameOver));
    assert_matches!(table.toggle_pause(), Err(TableError::GameOver));

    // A new game can follow.
    table.start_new_game(setup(21, SeatCount::Four)).unwrap();
    assert_eq!(table.hand_number(), 1);
    assert_eq!(table.scores(), Scores::default());
}
