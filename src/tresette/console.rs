//! Console front-end.

use std::str::FromStr;

use ansi_term::{ANSIString, ANSIStrings, Style};

use super::{Card, Event, Listener, Side, Stage, Table, Trick};

pub const HELP: &str = "\
Commands:
  <n>  play the n-th card of your hand
  p    pause or resume
  n    start a new game
  s    show scores and statistics
  l    show the last trick
  h    show this help
  q    quit";

/// A line typed by the human player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Play the card at this (0-based) index.
    Play(usize),
    Pause,
    New,
    Scores,
    Last,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command {0:?}, type h for help")]
pub struct UnknownCommand(String);

impl FromStr for Command {
    type Err = UnknownCommand;

    /// Cards are numbered from 1 on screen.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "p" | "pause" => Ok(Command::Pause),
            "n" | "new" => Ok(Command::New),
            "s" | "scores" => Ok(Command::Scores),
            "l" | "last" => Ok(Command::Last),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" => Ok(Command::Quit),
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Play(n - 1)),
                _ => Err(UnknownCommand(s.to_string())),
            },
        }
    }
}

/// Renders the table as text.
#[derive(Debug, Clone)]
pub struct ConsoleView {
    color: bool,
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self { color: true }
    }
}

impl ConsoleView {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn format(&self, s: &ANSIStrings) -> String {
        if self.color {
            s.to_string()
        } else {
            ansi_term::unstyle(s)
        }
    }

    fn format_card(&self, card: Card) -> String {
        self.format(&ANSIStrings(&[card.to_ansi_string()]))
    }

    /// The hand, numbered from 1. Cards that may not be played are dimmed.
    pub fn format_hand(&self, hand: &[Card], legal: &[usize]) -> String {
        let mut parts: Vec<ANSIString> = vec![];
        for (i, &card) in hand.iter().enumerate() {
            if i > 0 {
                parts.push(" ".into());
            }
            parts.push(format!("{}:", i + 1).into());
            if legal.contains(&i) {
                parts.push(card.to_ansi_string());
            } else {
                parts.push(Style::new().dimmed().paint(card.to_string()));
            }
        }
        self.format(&ANSIStrings(&parts))
    }

    pub fn format_trick(&self, table: &Table, trick: &Trick) -> String {
        let mut parts: Vec<ANSIString> = vec!["[".into()];
        for (i, (seat, card)) in trick.plays().enumerate() {
            if i != 0 {
                parts.push(", ".into());
            }
            parts.push(format!("{}:", table.player(seat).name()).into());
            parts.push(card.to_ansi_string());
        }
        parts.push("]".into());
        self.format(&ANSIStrings(&parts))
    }

    /// What the human needs to see before choosing a card.
    pub fn prompt(&self, table: &Table) -> String {
        let mut lines = vec![];
        if !table.trick().is_empty() {
            lines.push(format!("Trick: {}", self.format_trick(table, table.trick())));
        }
        let hand = table.player(0).hand();
        lines.push(format!(
            "Hand: {}",
            self.format_hand(hand, &table.legal_indices(0))
        ));
        lines.push("Your move? ".to_string());
        lines.join("\n")
    }

    pub fn scoreboard(&self, table: &Table) -> String {
        let mut lines = vec![];
        let seats = table.seat_count();
        for &side in &[Side::First, Side::Second] {
            let names: Vec<_> = seats
                .members(side)
                .map(|s| table.player(s).name())
                .collect();
            lines.push(format!(
                "{side} ({}): {}",
                names.join(" & "),
                table.scores().side(side)
            ));
        }
        if let Some(target) = table.target() {
            lines.push(format!(
                "Hand {}, trick {}, playing to {}",
                table.hand_number(),
                table.trick_number(),
                target
            ));
        }
        if let Some(stats) = table.human_stats() {
            lines.push(format!(
                "{}: {} played, {} won, {} lost ({:.1}%)",
                table.player(0).name(),
                stats.played,
                stats.won,
                stats.lost,
                stats.win_rate()
            ));
        }
        let known = table.players_on_record();
        if !known.is_empty() {
            lines.push(format!("Players on record: {}", known.join(", ")));
        }
        lines.join("\n")
    }

    /// One line for an event, if it is worth showing.
    pub fn render(&self, event: &Event) -> Option<String> {
        let bold = Style::new().bold();
        match event {
            Event::CardPlayed { name, card, .. } => {
                Some(format!("{name} plays {}", self.format_card(*card)))
            }
            Event::TrickFinished {
                name, points, last, ..
            } => Some(format!(
                "{name} takes the trick ({points}){}",
                if *last { ", last trick: +1" } else { "" }
            )),
            Event::ScoresUpdated { scores } => Some(format!("Score: {scores}")),
            Event::PauseToggled { paused } => Some(
                if *paused {
                    "Game paused, p to resume"
                } else {
                    "Game resumed"
                }
                .to_string(),
            ),
            Event::HandFinished { hand, scores } => Some(
                self.format(&ANSIStrings(&[
                    bold.paint(format!("=== End of hand {hand} === ")),
                    format!("{scores}").into(),
                ])),
            ),
            Event::GameOver { winner, scores } => {
                let verdict = if *winner == Side::First {
                    "You win!"
                } else {
                    "You lose."
                };
                Some(self.format(&ANSIStrings(&[
                    bold.paint(format!("{verdict} ")),
                    format!("Final score {scores}, n for a new game").into(),
                ])))
            }
            Event::StateChanged {
                stage: Stage::Dealing,
            } => Some("Dealing...".to_string()),
            Event::StateChanged { .. } | Event::TurnChanged { .. } => None,
        }
    }
}

impl Listener for ConsoleView {
    fn notify(&self, event: &Event) -> anyhow::Result<()> {
        if let Some(line) = self.render(event) {
            println!("{line}");
        }
        Ok(())
    }
}
