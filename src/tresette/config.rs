//! Table and game configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{ConfigError, Points, SeatCount, StrategyKind};

/// The victory targets offered by the front-end.
pub const TARGETS: [u32; 3] = [21, 31, 41];

/// Names given to the automated seats, in seat order.
pub const ROBOT_NAMES: [&str; 3] = ["Marcovaldo", "Viligelmo", "Astolfo"];

/// Delays used for deferred continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Before an automated seat plays.
    pub think: Duration,
    /// Before an automated seat plays after the game is resumed.
    pub resume: Duration,
    /// How long a resolved trick stays on the table.
    pub clear: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            think: Duration::from_millis(1000),
            resume: Duration::from_millis(500),
            clear: Duration::from_millis(2000),
        }
    }
}

/// What a new game is played for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    name: String,
    target: Points,
    seats: SeatCount,
}

impl GameSetup {
    /// `target` is in whole game points and must be one of [`TARGETS`].
    pub fn new<S: Into<String>>(
        name: S,
        target: u32,
        seats: SeatCount,
    ) -> Result<Self, ConfigError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !TARGETS.contains(&target) {
            return Err(ConfigError::UnsupportedTarget(target));
        }
        Ok(Self {
            name,
            target: Points::whole(target),
            seats,
        })
    }

    /// The human player's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Points {
        self.target
    }

    pub fn seats(&self) -> SeatCount {
        self.seats
    }
}

/// Everything needed to set up a table, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    pub name: String,
    pub target: u32,
    pub seats: SeatCount,
    pub seed: Option<u64>,
    pub think_ms: u64,
    pub resume_ms: u64,
    pub clear_ms: u64,
    pub strategy: StrategyKind,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Player".into(),
            target: 41,
            seats: SeatCount::Four,
            seed: None,
            think_ms: 1000,
            resume_ms: 500,
            clear_ms: 2000,
            strategy: StrategyKind::default(),
        }
    }
}

impl TableConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn setup(&self) -> Result<GameSetup, ConfigError> {
        GameSetup::new(self.name.as_str(), self.target, self.seats)
    }

    pub fn timing(&self) -> Timing {
        Timing {
            think: Duration::from_millis(self.think_ms),
            resume: Duration::from_millis(self.resume_ms),
            clear: Duration::from_millis(self.clear_ms),
        }
    }
}
