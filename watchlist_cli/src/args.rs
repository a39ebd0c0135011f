//! Command-line arguments for the watchlist console.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use watchlist_common::defaults::POLL_INTERVAL_SECS;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file holding the ticker list and alert rules.
    #[clap(long, default_value = "watchlist.json")]
    pub store: String,

    /// Seconds between automatic refreshes.
    #[clap(long, default_value_t = POLL_INTERVAL_SECS)]
    pub interval: u64,

    /// Path to a text file with tickers to add on startup.
    /// Tickers may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub import: Option<String>,

    /// Probability (0..=1) that a simulated quote fetch fails.
    #[clap(long, default_value_t = 0.05, value_parser = parse_rate)]
    pub failure_rate: f64,
}

fn parse_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("`{}` is not a number: {}", raw, e))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{} is outside 0..=1", rate))
    }
}
