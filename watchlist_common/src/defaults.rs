//! Shared constants for polling, persistence and seeding.

/// Seconds between two automatic full refreshes.
pub const POLL_INTERVAL_SECS: u64 = 45;

/// Ticker list used when nothing has been persisted yet.
pub const DEFAULT_TICKERS: [&str; 3] = ["AAPL", "MSFT", "TSLA"];

/// Store key holding the ordered ticker list.
pub const TICKERS_KEY: &str = "watchlist.tickers";

/// Store key holding the encoded alert-rule map.
pub const ALERTS_KEY: &str = "watchlist.alerts";

/// Consecutive fetch failures for one symbol before a warning is logged.
pub const FAILURE_STREAK_WARN: u32 = 3;

/// Undrained events a single observer may hold before new ones are dropped for it.
pub const EVENT_BUFFER: usize = 64;

/// Currency assumed by sources that do not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Owned copy of [`DEFAULT_TICKERS`].
pub fn default_tickers() -> Vec<String> {
    DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect()
}
