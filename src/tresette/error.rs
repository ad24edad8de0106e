//! Error types

use std::path::PathBuf;

use super::{Card, Seat, Suit};

/// An illegal move. The table is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    /// Someone else is expected to play.
    #[error("it is seat {current}'s turn, not seat {seat}'s")]
    NotYourTurn { seat: Seat, current: Seat },

    /// Automated seats do not take commands.
    #[error("seat {0} is not controlled by a human")]
    NotHuman(Seat),

    /// The player attempted to play a card they don't hold.
    #[error("card index {index} is out of range for a hand of {len}")]
    CardIndexOutOfRange { index: usize, len: usize },

    /// The player must follow the requested suit for this trick.
    #[error("{card} does not follow {}, which seat {seat} holds", .suit.name())]
    MustFollowSuit { seat: Seat, card: Card, suit: Suit },
}

/// A command that cannot be carried out in the table's current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("no game in progress")]
    NotInProgress,
    #[error("the game is over")]
    GameOver,
    #[error("the game is paused")]
    Paused,
    #[error("a trick is being evaluated")]
    TrickEvaluating,
    #[error("an automated turn is running")]
    AutomatedTurnRunning,
    #[error(transparent)]
    Player(#[from] PlayerError),
    /// The automated strategy picked an illegal card.
    #[error("strategy chose an illegal card for seat {seat}: {error}")]
    Strategy { seat: Seat, error: PlayerError },
    /// The automated strategy panicked while choosing.
    #[error("strategy failed to choose a card for seat {0}")]
    StrategyPanicked(Seat),
}

/// A deal that does not distribute the full deck evenly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DealError {
    #[error("deck is missing cards")]
    IncompleteDeck,
    #[error("deck contains duplicate card")]
    DuplicateCard,
    #[error("hands are not all full")]
    InvalidHandSize,
}

/// A failure to load or store player statistics.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed statistics in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A configuration that cannot be used to start a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("unsupported victory target {0}")]
    UnsupportedTarget(u32),
}
