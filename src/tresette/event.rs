//! Game events and their observers.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Card, Points, Scores, Seat, Side};

/// The coarse state of the table, as announced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    NotStarted,
    Dealing,
    HumanTurn,
    RobotTurn,
    Evaluating,
    HandComplete,
    Paused,
    GameOver,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::NotStarted => "not started",
            Stage::Dealing => "dealing",
            Stage::HumanTurn => "human turn",
            Stage::RobotTurn => "robot turn",
            Stage::Evaluating => "evaluating trick",
            Stage::HandComplete => "hand complete",
            Stage::Paused => "paused",
            Stage::GameOver => "game over",
        })
    }
}

/// Something that happened at the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    StateChanged {
        stage: Stage,
    },
    CardPlayed {
        seat: Seat,
        name: String,
        card: Card,
    },
    TurnChanged {
        seat: Seat,
        name: String,
    },
    ScoresUpdated {
        scores: Scores,
    },
    /// A trick was resolved. `points` counts the cards only; `last` marks the
    /// hand's final trick, whose bonus point is credited on top.
    TrickFinished {
        winner: Seat,
        name: String,
        points: Points,
        last: bool,
    },
    PauseToggled {
        paused: bool,
    },
    HandFinished {
        hand: u32,
        scores: Scores,
    },
    GameOver {
        winner: Side,
        scores: Scores,
    },
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::StateChanged { stage } => write!(f, "state: {stage}"),
            Event::CardPlayed { seat, name, card } => {
                write!(f, "{name} (seat {seat}) plays {card}")
            }
            Event::TurnChanged { seat, name } => write!(f, "{name} (seat {seat}) to play"),
            Event::ScoresUpdated { scores } => write!(f, "scores: {scores}"),
            Event::TrickFinished {
                winner,
                name,
                points,
                last,
            } => {
                write!(f, "{name} (seat {winner}) takes the trick for {points}")?;
                if *last {
                    write!(f, " plus the last-trick bonus")?;
                }
                Ok(())
            }
            Event::PauseToggled { paused: true } => write!(f, "paused"),
            Event::PauseToggled { paused: false } => write!(f, "resumed"),
            Event::HandFinished { hand, scores } => write!(f, "hand {hand} finished: {scores}"),
            Event::GameOver { winner, scores } => write!(f, "{winner} wins {scores}"),
        }
    }
}

/// An observer of table events.
///
/// Listeners run synchronously, in subscription order, while the table is
/// mid-update. A listener that fails or panics is logged and skipped; the table
/// carries on.
pub trait Listener {
    fn notify(&self, event: &Event) -> anyhow::Result<()>;
}

/// Fans events out to the subscribed listeners.
#[derive(Default)]
pub struct Notifier {
    listeners: Vec<Arc<dyn Listener>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Notifier {
    pub fn subscribe(&mut self, listener: Arc<dyn Listener>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &Event) {
        for (i, listener) in self.listeners.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.notify(event))) {
                Ok(Ok(())) => (),
                Ok(Err(err)) => warn!(listener = i, %event, "listener failed: {err:#}"),
                Err(_) => warn!(listener = i, %event, "listener panicked"),
            }
        }
    }
}

/// Forwards events into `tracing`.
#[derive(Debug, Default)]
pub struct LogListener;

impl Listener for LogListener {
    fn notify(&self, event: &Event) -> anyhow::Result<()> {
        match event {
            Event::HandFinished { .. } | Event::GameOver { .. } => info!("{event}"),
            _ => debug!("{event}"),
        }
        Ok(())
    }
}

/// Records every event, in order.
#[derive(Debug, Default, Clone)]
pub struct History(Arc<Mutex<Vec<Event>>>);

impl Listener for History {
    fn notify(&self, event: &Event) -> anyhow::Result<()> {
        self.0
            .lock()
            .map_err(|_| anyhow::anyhow!("history lock poisoned"))?
            .push(event.clone());
        Ok(())
    }
}

impl History {
    /// A copy of the events recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Serializes the recorded events as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events())
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    struct Failing;
    impl Listener for Failing {
        fn notify(&self, _: &Event) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    struct Panicking;
    impl Listener for Panicking {
        fn notify(&self, _: &Event) -> anyhow::Result<()> {
            panic!("boom")
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let history = History::default();
        let mut notifier = Notifier::default();
        notifier.subscribe(Arc::new(Failing));
        notifier.subscribe(Arc::new(Panicking));
        notifier.subscribe(Arc::new(history.clone()));
        notifier.emit(&Event::PauseToggled { paused: true });
        assert_eq!(history.events(), vec![Event::PauseToggled { paused: true }]);
    }

    #[test]
    fn test_json() {
        let history = History::default();
        history
            .notify(&Event::CardPlayed {
                seat: 2,
                name: "Viligelmo".into(),
                card: Card::from_str("3C").unwrap(),
            })
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&history.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["event"], "card_played");
        assert_eq!(json[0]["card"], "3C");
        assert_eq!(json[0]["seat"], 2);
    }

    #[test]
    fn test_display() {
        let event = Event::TrickFinished {
            winner: 0,
            name: "Ada".into(),
            points: Points::from_cents(99),
            last: true,
        };
        assert_eq!(
            event.to_string(),
            "Ada (seat 0) takes the trick for 0.99 plus the last-trick bonus"
        );
    }
}
