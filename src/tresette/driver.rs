//! Async driver: feeds console commands and the clock into a [`Table`].

use std::io::BufRead;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::{Command, ConsoleView, GameSetup, Phase, Stage, Table};

/// Reads stdin on its own thread and forwards each line.
///
/// The reader thread is detached; it ends with the process.
pub fn spawn_stdin_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("cannot read stdin: {err}");
                    break;
                }
            }
        }
    });
    rx
}

/// Runs games until the player quits or the input closes.
///
/// The table is owned by this loop alone. Each iteration waits for either a
/// line of input or the table's next deadline, whichever comes first.
pub async fn run(
    mut table: Table,
    setup: GameSetup,
    view: Arc<ConsoleView>,
    mut inbox: UnboundedReceiver<String>,
) -> anyhow::Result<Table> {
    let start = Instant::now();
    let mut prompted = None;
    table.start_new_game(setup.clone())?;
    show_prompt(&table, &view, &mut prompted);

    loop {
        let deadline = table.next_deadline().map(|at| start + at);
        tokio::select! {
            line = inbox.recv() => {
                let line = match line {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match Command::from_str(&line) {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                debug!(?command, "command");
                if command == Command::Quit {
                    break;
                }
                execute(&mut table, &setup, &view, command);
            }
            _ = sleep_until(deadline.unwrap_or(start)), if deadline.is_some() => {
                if let Err(err) = table.advance_to(start.elapsed()) {
                    println!("{err}");
                }
            }
        }
        show_prompt(&table, &view, &mut prompted);
    }
    table.abandon();
    Ok(table)
}

fn execute(table: &mut Table, setup: &GameSetup, view: &ConsoleView, command: Command) {
    let result = match command {
        Command::Play(index) => table.play_card(0, index).map(|_| ()),
        Command::Pause => table.toggle_pause().map(|_| ()),
        Command::New => table.start_new_game(setup.clone()),
        Command::Scores => {
            if table.phase() != Phase::NotStarted {
                println!("{}", view.scoreboard(table));
            }
            Ok(())
        }
        Command::Last => {
            match table.last_trick() {
                Some(trick) => println!("Last trick: {}", view.format_trick(table, trick)),
                None => println!("No trick played yet"),
            }
            Ok(())
        }
        Command::Help => {
            println!("{}", super::console::HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };
    if let Err(err) = result {
        println!("{err}");
    }
}

/// Prints the hand once each time the human comes on turn. `prompted` holds
/// the table generation last prompted for.
fn show_prompt(table: &Table, view: &ConsoleView, prompted: &mut Option<u64>) {
    if table.stage() != Stage::HumanTurn {
        return;
    }
    let generation = Some(table.generation());
    if *prompted != generation {
        *prompted = generation;
        println!("{}", view.prompt(table));
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use tokio::sync::mpsc;
    use tokio::time::Duration;

    use super::*;
    use crate::tresette::{Event, History, MemoryStats, ScriptedStrategy, SeatCount, Timing};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn table(history: &History) -> Table {
        let timing = Timing {
            think: Duration::from_millis(1),
            resume: Duration::from_millis(1),
            clear: Duration::from_millis(1),
        };
        let mut table = Table::new(
            timing,
            Box::new(ScriptedStrategy::default()),
            Box::new(MemoryStats::default()),
            Some(3),
        );
        table.subscribe(Arc::new(history.clone()));
        table
    }

    #[tokio::test]
    async fn test_quit() {
        let history = History::default();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("q".to_string()).unwrap();
        let setup = GameSetup::new("Ada", 41, SeatCount::Four).unwrap();
        let table = tokio::time::timeout(
            TIMEOUT,
            run(table(&history), setup, Arc::new(ConsoleView::new(false)), rx),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(table.phase(), Phase::NotStarted);
    }

    #[tokio::test]
    async fn test_commands_reach_table() {
        let history = History::default();
        let (tx, rx) = mpsc::unbounded_channel();
        for line in &["p", "bogus", "p", "1", "s", "l", "h"] {
            tx.send(line.to_string()).unwrap();
        }
        drop(tx);
        let setup = GameSetup::new("Ada", 41, SeatCount::Four).unwrap();
        tokio::time::timeout(
            TIMEOUT,
            run(table(&history), setup, Arc::new(ConsoleView::new(false)), rx),
        )
        .await
        .unwrap()
        .unwrap();

        let events = history.events();
        let pauses: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::PauseToggled { paused } => Some(*paused),
                _ => None,
            })
            .collect();
        assert_eq!(pauses, vec![true, false]);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::CardPlayed { seat: 0, .. }
        )));
    }
}
