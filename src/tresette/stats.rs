//! Per-player win/loss counters.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::StatsError;

/// Games played, won and lost by one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
}

impl PlayerStats {
    /// Percentage of games won, or zero before the first game.
    pub fn win_rate(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            f64::from(self.won) * 100.0 / f64::from(self.played)
        }
    }

    fn record(&mut self, won: bool) {
        self.played += 1;
        if won {
            self.won += 1;
        } else {
            self.lost += 1;
        }
    }
}

/// Where finished games are tallied.
pub trait StatsStore {
    fn load(&self, name: &str) -> Result<PlayerStats, StatsError>;

    /// Sanitized names of every player on record, sorted.
    fn list_players(&self) -> Result<Vec<String>, StatsError>;

    /// Counts a finished game for `name`, returning the updated totals.
    fn record(&mut self, name: &str, won: bool) -> Result<PlayerStats, StatsError>;

    fn record_win(&mut self, name: &str) -> Result<PlayerStats, StatsError> {
        self.record(name, true)
    }

    fn record_loss(&mut self, name: &str) -> Result<PlayerStats, StatsError> {
        self.record(name, false)
    }
}

/// Makes a player name safe to use in a file name: anything outside
/// `[A-Za-z0-9_-]` becomes `_`, and the result is cut to 20 characters.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(20)
        .collect()
}

/// Keeps counters in memory only.
#[derive(Debug, Default)]
pub struct MemoryStats(HashMap<String, PlayerStats>);

impl StatsStore for MemoryStats {
    fn load(&self, name: &str) -> Result<PlayerStats, StatsError> {
        Ok(self.0.get(&sanitize(name)).copied().unwrap_or_default())
    }

    fn list_players(&self) -> Result<Vec<String>, StatsError> {
        Ok(self.0.keys().cloned().sorted().collect())
    }

    fn record(&mut self, name: &str, won: bool) -> Result<PlayerStats, StatsError> {
        let stats = self.0.entry(sanitize(name)).or_default();
        stats.record(won);
        Ok(*stats)
    }
}

/// One `stats_<name>.json` file per player under a directory.
#[derive(Debug, Clone)]
pub struct JsonStatsStore {
    dir: PathBuf,
}

const PREFIX: &str = "stats_";
const SUFFIX: &str = ".json";

impl JsonStatsStore {
    /// The directory is created on first write.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", PREFIX, sanitize(name), SUFFIX))
    }

    fn store(&self, name: &str, stats: &PlayerStats) -> Result<(), StatsError> {
        let path = self.path(name);
        fs::create_dir_all(&self.dir).map_err(|source| StatsError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(stats).map_err(|source| StatsError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StatsError::Io { path, source })
    }
}

impl StatsStore for JsonStatsStore {
    fn load(&self, name: &str) -> Result<PlayerStats, StatsError> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| StatsError::Json { path, source }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(PlayerStats::default()),
            Err(source) => Err(StatsError::Io { path, source }),
        }
    }

    fn list_players(&self) -> Result<Vec<String>, StatsError> {
        let io = |source| StatsError::Io {
            path: self.dir.clone(),
            source,
        };
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(io(err)),
        };
        let mut names = vec![];
        for entry in entries {
            let file_name = entry.map_err(io)?.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(name) = file_name
                .strip_prefix(PREFIX)
                .and_then(|s| s.strip_suffix(SUFFIX))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn record(&mut self, name: &str, won: bool) -> Result<PlayerStats, StatsError> {
        let mut stats = self.load(name)?;
        stats.record(won);
        self.store(name, &stats)?;
        Ok(stats)
    }
}
