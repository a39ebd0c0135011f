//! Engine tuning knobs.
use std::time::Duration;

use watchlist_common::defaults::{FAILURE_STREAK_WARN, POLL_INTERVAL_SECS};

/// Runtime configuration for a [`crate::WatchlistEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval of the automatic full refresh started on construction.
    /// `None` leaves polling off until `start_polling` is called.
    pub poll_interval: Option<Duration>,
    /// Consecutive fetch failures for one symbol before a warning is logged.
    pub failure_streak_warn: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Some(Duration::from_secs(POLL_INTERVAL_SECS)),
            failure_streak_warn: FAILURE_STREAK_WARN,
        }
    }
}

impl EngineConfig {
    /// Default configuration without automatic polling.
    pub fn manual() -> Self {
        Self {
            poll_interval: None,
            ..Self::default()
        }
    }
}
