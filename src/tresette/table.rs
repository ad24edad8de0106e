//! The table: game state and turn orchestration.
//!
//! A [`Table`] is the single owner of the game. Commands arrive as method
//! calls; anything that must happen later (an automated seat thinking, the
//! pause after a trick) is posted to its [`Timeline`] and runs when the driver
//! advances the clock. Nothing here blocks or spawns.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::{
    rules, score, Bonuses, Card, Deal, Event, GameSetup, Listener, Notifier, Player,
    PlayerError, PlayerStats, Points, Scores, Seat, SeatCount, Side, Stage, StatsStore, Strategy,
    Suit, TableError, Timeline, Timing, Trick, Wake, ROBOT_NAMES,
};

#[cfg(test)]
mod test;

/// Where the table is in the life of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// Cards are being handed out.
    Dealing,
    /// A trick is being played; `current` is on turn.
    TrickOpen,
    /// A trick has been resolved and stays on display until it is cleared.
    Evaluating,
    /// Every trick of the hand has been played.
    HandComplete,
    GameOver,
}

pub struct Table {
    timing: Timing,
    strategy: Box<dyn Strategy>,
    stats: Box<dyn StatsStore>,
    notifier: Notifier,
    timeline: Timeline,
    rng: StdRng,

    setup: Option<GameSetup>,
    seats: SeatCount,
    players: Vec<Player>,
    phase: Phase,
    paused: bool,
    robot_turn_running: bool,
    current: Seat,
    hand_leader: Seat,
    trick: Trick,
    last_trick: Option<Trick>,
    tricks_played: usize,
    hand_number: u32,
    bonuses: Bonuses,
    scores: Scores,
    generation: u64,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .field("current", &self.current)
            .field("trick", &self.trick)
            .field("hand_number", &self.hand_number)
            .field("scores", &self.scores)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Table {
    pub fn new(
        timing: Timing,
        strategy: Box<dyn Strategy>,
        stats: Box<dyn StatsStore>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seats = SeatCount::default();
        Self {
            timing,
            strategy,
            stats,
            notifier: Notifier::default(),
            timeline: Timeline::default(),
            rng,
            setup: None,
            seats,
            players: vec![],
            phase: Phase::NotStarted,
            paused: false,
            robot_turn_running: false,
            current: 0,
            hand_leader: 0,
            trick: Trick::new(seats, 0),
            last_trick: None,
            tricks_played: 0,
            hand_number: 0,
            bonuses: Bonuses::default(),
            scores: Scores::default(),
            generation: 0,
        }
    }

    pub fn subscribe(&mut self, listener: Arc<dyn Listener>) {
        self.notifier.subscribe(listener);
    }

    // Queries

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The stage an observer would see right now.
    pub fn stage(&self) -> Stage {
        match self.phase {
            _ if self.paused => Stage::Paused,
            Phase::NotStarted => Stage::NotStarted,
            Phase::Dealing => Stage::Dealing,
            Phase::TrickOpen if self.players[self.current].is_human() => Stage::HumanTurn,
            Phase::TrickOpen => Stage::RobotTurn,
            Phase::Evaluating => Stage::Evaluating,
            Phase::HandComplete => Stage::HandComplete,
            Phase::GameOver => Stage::GameOver,
        }
    }

    pub fn in_progress(&self) -> bool {
        !matches!(self.phase, Phase::NotStarted | Phase::GameOver)
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_evaluating(&self) -> bool {
        self.phase == Phase::Evaluating
    }

    pub fn seat_count(&self) -> SeatCount {
        self.seats
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat]
    }

    /// The seat on turn, while a game is in progress.
    #[cfg(test)]
    pub fn current_seat(&self) -> Option<Seat> {
        if self.in_progress() {
            Some(self.current)
        } else {
            None
        }
    }

    pub fn requested_suit(&self) -> Option<Suit> {
        self.trick.requested_suit()
    }

    /// The trick being played.
    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    /// The most recently resolved trick.
    pub fn last_trick(&self) -> Option<&Trick> {
        self.last_trick.as_ref()
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn bonuses(&self) -> Bonuses {
        self.bonuses
    }

    pub fn target(&self) -> Option<Points> {
        self.setup.as_ref().map(GameSetup::target)
    }

    /// 1-based number of the hand being played.
    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }

    /// 1-based number of the trick being played within the hand.
    pub fn trick_number(&self) -> usize {
        self.tricks_played + 1
    }

    /// Bumped whenever pending continuations must be invalidated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the next continuation is due, on the table's clock.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }

    /// Statistics for the human player of the current (or last) game.
    pub fn human_stats(&self) -> Option<PlayerStats> {
        let setup = self.setup.as_ref()?;
        self.stats.load(setup.name()).ok()
    }

    /// Everyone the statistics store has a record for.
    pub fn players_on_record(&self) -> Vec<String> {
        self.stats.list_players().unwrap_or_else(|err| {
            warn!("cannot list players: {err}");
            vec![]
        })
    }

    /// Returns true if `seat` could play the card at `index` right now.
    #[cfg(test)]
    pub fn is_playable(&self, seat: Seat, index: usize) -> bool {
        self.check_human_move(seat).is_ok() && self.legal_indices(seat).contains(&index)
    }

    /// Indices of the legal cards in `seat`'s hand, ignoring whose turn it is.
    pub fn legal_indices(&self, seat: Seat) -> Vec<usize> {
        match self.players.get(seat) {
            Some(player) => rules::legal_indices(player.hand(), self.requested_suit()),
            None => vec![],
        }
    }

    // Commands

    /// Starts a game with a freshly shuffled deck, discarding any game in
    /// progress.
    pub fn start_new_game(&mut self, setup: GameSetup) -> Result<(), TableError> {
        if self.is_evaluating() {
            return Err(TableError::TrickEvaluating);
        }
        let deal = Deal::shuffled(setup.seats(), &mut self.rng);
        self.start_new_game_with(setup, deal)
    }

    /// Starts a game whose first hand is `deal`.
    pub fn start_new_game_with(&mut self, setup: GameSetup, deal: Deal) -> Result<(), TableError> {
        if self.is_evaluating() {
            return Err(TableError::TrickEvaluating);
        }
        assert_eq!(deal.seats(), setup.seats(), "deal is for another table");
        self.reset();
        self.seats = setup.seats();
        self.players = Some(Player::human(setup.name()))
            .into_iter()
            .chain(ROBOT_NAMES.iter().map(|&n| Player::robot(n)))
            .take(self.seats.len())
            .collect();
        info!(
            target = %setup.target(),
            seats = self.seats.len(),
            "new game for {}",
            setup.name()
        );
        self.setup = Some(setup);
        self.begin_hand(deal);
        Ok(())
    }

    /// Plays the card at `index` from the human `seat`'s hand.
    pub fn play_card(&mut self, seat: Seat, index: usize) -> Result<Card, TableError> {
        let result = self
            .check_human_move(seat)
            .and_then(|()| self.apply_play(seat, index).map_err(TableError::from));
        if let Err(err) = &result {
            warn!(seat, index, "rejected: {err}");
        }
        result
    }

    /// Pauses or resumes the game, returning the new paused state.
    pub fn toggle_pause(&mut self) -> Result<bool, TableError> {
        match self.phase {
            Phase::NotStarted => return Err(TableError::NotInProgress),
            Phase::GameOver => return Err(TableError::GameOver),
            Phase::Evaluating => return Err(TableError::TrickEvaluating),
            _ => (),
        }
        self.paused = !self.paused;
        info!(paused = self.paused, "pause toggled");
        self.emit(Event::PauseToggled {
            paused: self.paused,
        });
        if self.paused {
            self.emit(Event::StateChanged {
                stage: Stage::Paused,
            });
        } else {
            self.announce_turn(self.timing.resume);
        }
        Ok(self.paused)
    }

    /// Throws the game away. Pending continuations become stale.
    pub fn abandon(&mut self) {
        if self.phase == Phase::NotStarted {
            return;
        }
        info!("game abandoned");
        self.reset();
        self.emit(Event::StateChanged {
            stage: Stage::NotStarted,
        });
    }

    /// Runs every continuation due by `now`. Stops at the first one that
    /// fails; the rest stay queued.
    pub fn advance_to(&mut self, now: Duration) -> Result<(), TableError> {
        while let Some(wake) = self.timeline.pop_due(now) {
            self.wake(wake)?;
        }
        self.timeline.set_now(now);
        Ok(())
    }

    /// Moves the clock forward by `dt`.
    #[cfg(test)]
    pub fn advance(&mut self, dt: Duration) -> Result<(), TableError> {
        self.advance_to(self.timeline.now() + dt)
    }

    // Internals

    fn emit(&self, event: Event) {
        self.notifier.emit(&event);
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    fn reset(&mut self) {
        self.invalidate();
        self.timeline.clear();
        self.players.clear();
        self.phase = Phase::NotStarted;
        self.paused = false;
        self.robot_turn_running = false;
        self.current = 0;
        self.hand_leader = 0;
        self.trick = Trick::new(self.seats, 0);
        self.last_trick = None;
        self.tricks_played = 0;
        self.hand_number = 0;
        self.bonuses = Bonuses::default();
        self.scores = Scores::default();
    }

    /// Whether a move may be accepted at all right now.
    fn check_accepting(&self) -> Result<(), TableError> {
        match self.phase {
            Phase::NotStarted => Err(TableError::NotInProgress),
            Phase::GameOver => Err(TableError::GameOver),
            _ if self.paused => Err(TableError::Paused),
            Phase::Evaluating => Err(TableError::TrickEvaluating),
            _ if self.robot_turn_running => Err(TableError::AutomatedTurnRunning),
            Phase::TrickOpen => Ok(()),
            Phase::Dealing | Phase::HandComplete => Err(TableError::NotInProgress),
        }
    }

    fn check_human_move(&self, seat: Seat) -> Result<(), TableError> {
        self.check_accepting()?;
        if seat != self.current {
            return Err(PlayerError::NotYourTurn {
                seat,
                current: self.current,
            }
            .into());
        }
        if !self.players[seat].is_human() {
            return Err(PlayerError::NotHuman(seat).into());
        }
        Ok(())
    }

    fn begin_hand(&mut self, deal: Deal) {
        self.hand_number += 1;
        self.tricks_played = 0;
        self.phase = Phase::Dealing;
        self.emit(Event::StateChanged {
            stage: Stage::Dealing,
        });
        for (player, hand) in self.players.iter_mut().zip(deal.into_hands()) {
            player.take_deal(hand);
        }
        debug!(
            hand = self.hand_number,
            leader = self.hand_leader,
            "cards dealt"
        );
        self.current = self.hand_leader;
        self.trick = Trick::new(self.seats, self.hand_leader);
        self.phase = Phase::TrickOpen;
        self.announce_turn(self.timing.think);
    }

    /// Tells observers whose turn it is, and wakes an automated seat after
    /// `delay` unless the game is paused.
    fn announce_turn(&mut self, delay: Duration) {
        let seat = self.current;
        let player = &self.players[seat];
        let (stage, name, human) = if player.is_human() {
            (Stage::HumanTurn, player.name().to_string(), true)
        } else {
            (Stage::RobotTurn, player.name().to_string(), false)
        };
        self.emit(Event::StateChanged { stage });
        self.emit(Event::TurnChanged { seat, name });
        if !human && !self.paused {
            self.timeline.schedule(
                delay,
                Wake::RobotTurn {
                    seat,
                    generation: self.generation,
                },
            );
        }
    }

    /// The single mutation path for a card leaving a hand.
    fn apply_play(&mut self, seat: Seat, index: usize) -> Result<Card, PlayerError> {
        let hand = self.players[seat].hand();
        let card = *hand.get(index).ok_or(PlayerError::CardIndexOutOfRange {
            index,
            len: hand.len(),
        })?;
        let requested = self.trick.requested_suit();
        if !rules::is_legal(hand, card, requested) {
            return Err(PlayerError::MustFollowSuit {
                seat,
                card,
                suit: requested.expect("anything is legal on an empty trick"),
            });
        }

        let played = self.players[seat].play(index);
        debug_assert_eq!(played, card);
        self.trick.play(seat, card);
        self.invalidate();
        debug!(seat, %card, trick = %self.trick, "card played");
        self.emit(Event::CardPlayed {
            seat,
            name: self.players[seat].name().to_string(),
            card,
        });

        if self.trick.is_complete() {
            self.evaluate_trick();
        } else {
            self.current = self.seats.next(seat);
            self.announce_turn(self.timing.think);
        }
        Ok(card)
    }

    fn evaluate_trick(&mut self) {
        self.phase = Phase::Evaluating;
        self.emit(Event::StateChanged {
            stage: Stage::Evaluating,
        });

        let winner = self.trick.winner();
        let points = self.trick.points();
        self.tricks_played += 1;
        let last = score::is_last_trick(self.tricks_played, self.seats);

        self.last_trick = Some(self.trick.clone());
        let cards = self.trick.take();
        self.players[winner].capture(cards);
        if last {
            self.bonuses.award(Side::of(winner));
        }
        debug!(winner, %points, last, "trick resolved");
        self.emit(Event::TrickFinished {
            winner,
            name: self.players[winner].name().to_string(),
            points,
            last,
        });

        self.scores = score::totals(&self.players, &self.bonuses);
        self.emit(Event::ScoresUpdated {
            scores: self.scores,
        });

        self.current = winner;
        self.trick = Trick::new(self.seats, winner);
        self.timeline.schedule(
            self.timing.clear,
            Wake::ClearTrick {
                generation: self.generation,
            },
        );
    }

    fn wake(&mut self, wake: Wake) -> Result<(), TableError> {
        if wake.generation() != self.generation {
            debug!(?wake, generation = self.generation, "dropping stale continuation");
            return Ok(());
        }
        match wake {
            Wake::RobotTurn { seat, .. } => self.robot_turn(seat),
            Wake::ClearTrick { .. } => {
                self.clear_trick();
                Ok(())
            }
        }
    }

    fn robot_turn(&mut self, seat: Seat) -> Result<(), TableError> {
        if self.robot_turn_running {
            debug!(seat, "automated turn already running");
            return Ok(());
        }
        if self.phase != Phase::TrickOpen
            || self.paused
            || seat != self.current
            || self.players[seat].is_human()
        {
            debug!(seat, phase = ?self.phase, paused = self.paused, "automated turn skipped");
            return Ok(());
        }

        self.robot_turn_running = true;
        let result = self.robot_play(seat);
        self.robot_turn_running = false;
        if let Err(err) = &result {
            warn!(seat, "automated turn failed: {err}");
        }
        result
    }

    fn robot_play(&mut self, seat: Seat) -> Result<(), TableError> {
        let strategy = &mut self.strategy;
        let hand = self.players[seat].hand();
        let requested = self.trick.requested_suit();
        let played = self.trick.cards();
        let index = panic::catch_unwind(AssertUnwindSafe(|| {
            strategy.select_card(hand, requested, played)
        }))
        .map_err(|_| TableError::StrategyPanicked(seat))?;
        self.apply_play(seat, index)
            .map(|_| ())
            .map_err(|error| TableError::Strategy { seat, error })
    }

    fn clear_trick(&mut self) {
        debug_assert_eq!(self.phase, Phase::Evaluating);
        self.invalidate();
        if self.players.iter().all(|p| p.hand_len() == 0) {
            self.end_hand();
        } else {
            self.phase = Phase::TrickOpen;
            self.announce_turn(self.timing.think);
        }
    }

    fn end_hand(&mut self) {
        self.phase = Phase::HandComplete;
        self.emit(Event::StateChanged {
            stage: Stage::HandComplete,
        });
        info!(hand = self.hand_number, scores = %self.scores, "hand finished");
        self.emit(Event::HandFinished {
            hand: self.hand_number,
            scores: self.scores,
        });

        let target = self
            .setup
            .as_ref()
            .map(GameSetup::target)
            .expect("a game in progress has a setup");
        match self.scores.winner(target) {
            Some(side) => self.finish_game(side),
            None => {
                self.hand_leader = self.seats.next(self.hand_leader);
                let deal = Deal::shuffled(self.seats, &mut self.rng);
                self.begin_hand(deal);
            }
        }
    }

    fn finish_game(&mut self, winner: Side) {
        self.phase = Phase::GameOver;
        self.invalidate();
        self.timeline.clear();
        info!(%winner, scores = %self.scores, "game over");
        self.emit(Event::StateChanged {
            stage: Stage::GameOver,
        });
        self.emit(Event::GameOver {
            winner,
            scores: self.scores,
        });

        let name = self.players[0].name().to_string();
        let recorded = if winner == Side::of(0) {
            self.stats.record_win(&name)
        } else {
            self.stats.record_loss(&name)
        };
        match recorded {
            Ok(stats) => info!(
                played = stats.played,
                won = stats.won,
                lost = stats.lost,
                "statistics updated for {name}"
            ),
            Err(err) => warn!("cannot record statistics for {name}: {err}"),
        }
    }
}
