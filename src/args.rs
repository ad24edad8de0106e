//! Command line arguments

use std::convert::TryFrom;
use std::path::PathBuf;

use clap::Parser;

use crate::tresette::{Frontend, SeatCount, StrategyKind, TableConfig, TARGETS};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Play tresette against the computer", long_about = None)]
pub struct Args {
    /// Your name, as shown at the table and in the statistics.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Points needed to win the game (21, 31 or 41).
    #[arg(short, long, value_parser = parse_target)]
    pub target: Option<u32>,

    /// Number of seats at the table (2 or 4).
    #[arg(short, long, value_parser = parse_seats)]
    pub seats: Option<SeatCount>,

    /// Seed for shuffling and the automated players.
    #[arg(long)]
    pub seed: Option<u64>,

    /// How automated players choose their cards.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// Milliseconds an automated player thinks before playing.
    #[arg(long)]
    pub think_ms: Option<u64>,

    /// Milliseconds before an automated player moves after a resume.
    #[arg(long)]
    pub resume_ms: Option<u64>,

    /// Milliseconds a finished trick stays on the table.
    #[arg(long)]
    pub clear_ms: Option<u64>,

    /// Directory holding player statistics.
    #[arg(long, default_value = "player_stats")]
    pub stats_dir: PathBuf,

    /// Keep statistics in memory only.
    #[arg(long)]
    pub no_stats: bool,

    /// JSON file with table settings; command line flags take precedence.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the game's event history to this file on exit.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Log filter, used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Disable coloured output.
    #[arg(long)]
    pub no_color: bool,
}

fn parse_target(s: &str) -> Result<u32, String> {
    let target: u32 = s.parse().map_err(|_| format!("{s} is not a number"))?;
    if TARGETS.contains(&target) {
        Ok(target)
    } else {
        Err(format!("target must be one of {TARGETS:?}"))
    }
}

fn parse_seats(s: &str) -> Result<SeatCount, String> {
    let seats: u8 = s.parse().map_err(|_| format!("{s} is not a number"))?;
    SeatCount::try_from(seats)
}

impl Args {
    /// Loads the config file, if any, and applies the command line on top.
    pub fn table_config(&self) -> anyhow::Result<TableConfig> {
        let mut config = match &self.config {
            Some(path) => TableConfig::from_file(path)?,
            None => TableConfig::default(),
        };
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(seats) = self.seats {
            config.seats = seats;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(ms) = self.think_ms {
            config.think_ms = ms;
        }
        if let Some(ms) = self.resume_ms {
            config.resume_ms = ms;
        }
        if let Some(ms) = self.clear_ms {
            config.clear_ms = ms;
        }
        Ok(config)
    }

    pub fn frontend(&self) -> Frontend {
        Frontend {
            stats_dir: if self.no_stats {
                None
            } else {
                Some(self.stats_dir.clone())
            },
            history: self.history.clone(),
            color: !self.no_color,
        }
    }
}
