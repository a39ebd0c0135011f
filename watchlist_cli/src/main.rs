//! Watchlist Console — a terminal front-end for the watchlist engine. It keeps a
//! list of tickers in a JSON file, refreshes simulated quotes on a fixed interval,
//! and rings the terminal bell when a price alert is crossed.
//!
//! Usage example (CLI):
//! ```bash
//! watchlist_cli --store ./watchlist.json --interval 45 --import ./tickers.txt
//! ```
//!
//! The ticker file should contain symbols separated by commas, spaces, or new lines.
//! Type `help` at the prompt for the list of commands.
#![warn(missing_docs)]
mod args;
mod console;
mod notifier;
mod simulator;

use crate::args::Args;
use crate::notifier::ConsoleNotifier;
use crate::simulator::SimulatedQuoteSource;
use clap::Parser;
use crossbeam_channel::{Receiver, bounded, select, unbounded};
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use watchlist_common::Result;
use watchlist_common::WatchlistError;
use watchlist_common::symbol::parse_symbols;
use watchlist_engine::{EngineConfig, JsonFileStore, WatchlistEngine, WatchlistEvent};

fn main() -> Result<(), WatchlistError> {
    init_logger();
    let args = Args::parse();

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down...");
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| WatchlistError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;

    let store_path = normalize_path(&args.store);
    let store = JsonFileStore::open(&store_path)?;
    info!("Using store {}", store_path.display());

    let config = EngineConfig {
        poll_interval: Some(Duration::from_secs(args.interval.max(1))),
        ..EngineConfig::default()
    };
    let engine = WatchlistEngine::new(
        SimulatedQuoteSource::new(args.failure_rate),
        ConsoleNotifier,
        store,
        config,
    )?;

    if let Some(import) = args.import.as_deref() {
        import_tickers(&engine, &normalize_path(import))?;
    }

    let events = engine.subscribe();
    let lines = spawn_stdin_reader();
    print!("{}", console::help_text());
    info!("Watchlist is running. Press Ctrl+C or type `quit` to exit.");

    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(events) -> event => match event {
                Ok(WatchlistEvent::Refreshed { updated, fired }) => {
                    info!("Refreshed {} quotes, {} alerts fired", updated, fired);
                }
                Ok(other) => debug!("Watchlist changed: {:?}", other),
                Err(e) => {
                    error!("Event channel closed: {}", e);
                    break;
                }
            },
            recv(lines) -> line => match line {
                Ok(line) => match console::parse_line(&line) {
                    Ok(Some(command)) => match console::execute(&engine, command) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => {
                            error!("Command failed: {}", e);
                            break;
                        }
                    },
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                },
                Err(_) => {
                    info!("Input closed");
                    break;
                }
            }
        }
    }

    engine.dispose();
    Ok(())
}

/// Adds every ticker listed in the file at `path`.
fn import_tickers(engine: &WatchlistEngine, path: &PathBuf) -> Result<(), WatchlistError> {
    if !is_file_exist(path) {
        warn!("Import file {} not found, skipping", path.display());
        return Ok(());
    }
    let symbols = parse_symbols(BufReader::new(File::open(path)?))?;
    info!("Importing tickers: {:?}", symbols);
    for symbol in &symbols {
        engine.add_ticker(symbol)?;
    }
    Ok(())
}

/// Forwards stdin lines to a channel so the main loop can select over them.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Read stdin error: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}
