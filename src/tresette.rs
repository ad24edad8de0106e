//! The game of tresette.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

mod card;
mod config;
mod console;
mod deal;
mod driver;
mod error;
mod event;
mod player;
mod rules;
mod schedule;
mod score;
mod seat;
mod stats;
mod strategy;
mod table;
mod trick;
pub use self::card::{Card, Deck, Suit};
pub use self::config::{GameSetup, TableConfig, Timing, ROBOT_NAMES, TARGETS};
pub use self::console::{Command, ConsoleView, HELP};
pub use self::deal::Deal;
pub use self::error::{ConfigError, DealError, PlayerError, StatsError, TableError};
pub use self::event::{Event, History, Listener, LogListener, Notifier, Stage};
pub use self::player::Player;
pub use self::schedule::{Timeline, Wake};
pub use self::score::{Bonuses, Points, Scores};
pub use self::seat::{Seat, SeatCount, Side};
pub use self::stats::{JsonStatsStore, MemoryStats, PlayerStats, StatsStore};
#[cfg(test)]
pub use self::strategy::ScriptedStrategy;
pub use self::strategy::{Strategy, StrategyKind};
pub use self::table::{Phase, Table};
pub use self::trick::Trick;

/// How the console game is presented and what it keeps.
#[derive(Debug, Clone, Default)]
pub struct Frontend {
    /// Where win/loss counters are kept; `None` keeps them in memory.
    pub stats_dir: Option<PathBuf>,
    /// Where to write the game's event history on exit.
    pub history: Option<PathBuf>,
    pub color: bool,
}

/// Runs the game with a simple command-line interface.
pub fn cli_main(config: TableConfig, frontend: Frontend) -> anyhow::Result<()> {
    let setup = config.setup()?;
    let stats: Box<dyn StatsStore> = match &frontend.stats_dir {
        Some(dir) => Box::new(JsonStatsStore::new(dir)),
        None => Box::new(MemoryStats::default()),
    };
    let strategy = config
        .strategy
        .build(config.seed.map(|seed| seed.wrapping_add(1)));
    let mut table = Table::new(config.timing(), strategy, stats, config.seed);

    let view = Arc::new(ConsoleView::new(frontend.color));
    let history = History::default();
    table.subscribe(Arc::new(LogListener));
    table.subscribe(view.clone());
    if frontend.history.is_some() {
        table.subscribe(Arc::new(history.clone()));
    }

    println!("{HELP}");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("starting runtime")?;
    runtime.block_on(driver::run(
        table,
        setup,
        view,
        driver::spawn_stdin_reader(),
    ))?;

    if let Some(path) = frontend.history {
        fs::write(&path, history.to_json()?)
            .with_context(|| format!("writing history to {}", path.display()))?;
        info!("history written to {}", path.display());
    }
    Ok(())
}
