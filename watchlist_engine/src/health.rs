//! Per-symbol fetch failure tracker.
//!
//! Fetch failures are swallowed by the refresh loop, so this is the only place
//! a symbol that never resolves becomes visible. It exposes three operations:
//!
//! - `FetchHealth::record_failure(symbol)` — bump the consecutive failure count.
//! - `FetchHealth::record_success(symbol)` — reset the count, returning how long
//!   the streak was.
//! - `FetchHealth::forget(symbol)` — drop bookkeeping for a removed ticker.
//!
//! Time is measured with `std::time::Instant`, which is monotonic.
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Bookkeeping for a symbol that is currently failing.
#[derive(Debug)]
struct FailureStreak {
    count: u32,
    since: Instant,
}

/// Reported by [`FetchHealth::record_failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureReport {
    /// Consecutive failures so far, including this one.
    pub count: u32,
    /// `true` exactly once per streak, when `count` reaches the warning threshold.
    pub crossed_threshold: bool,
}

/// Tracks consecutive fetch failures per symbol.
#[derive(Debug)]
pub struct FetchHealth {
    streaks: HashMap<String, FailureStreak>,
    warn_after: u32,
}

impl FetchHealth {
    /// Creates a tracker that flags a streak once it reaches `warn_after` failures.
    pub fn new(warn_after: u32) -> Self {
        Self {
            streaks: HashMap::new(),
            warn_after: warn_after.max(1),
        }
    }

    /// Records a failed fetch for `symbol`.
    pub fn record_failure(&mut self, symbol: &str) -> FailureReport {
        let streak = self
            .streaks
            .entry(symbol.to_string())
            .or_insert(FailureStreak {
                count: 0,
                since: Instant::now(),
            });
        streak.count += 1;
        FailureReport {
            count: streak.count,
            crossed_threshold: streak.count == self.warn_after,
        }
    }

    /// Records a successful fetch. Returns the length and age of the streak it ended.
    pub fn record_success(&mut self, symbol: &str) -> Option<(u32, Duration)> {
        self.streaks
            .remove(symbol)
            .map(|streak| (streak.count, streak.since.elapsed()))
    }

    /// Drops any streak for `symbol`.
    pub fn forget(&mut self, symbol: &str) {
        self.streaks.remove(symbol);
    }

    /// Current consecutive failure count for `symbol`.
    pub fn failures(&self, symbol: &str) -> u32 {
        self.streaks.get(symbol).map(|s| s.count).unwrap_or(0)
    }
}
