//! Change notifications published to observers after state mutations.

/// What changed in the watchlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistEvent {
    /// A ticker was added or removed.
    TickersChanged,
    /// An alert rule was set or cleared by the user.
    AlertsChanged,
    /// A refresh batch finished. Published once per batch.
    Refreshed {
        /// Symbols whose quote was replaced.
        updated: usize,
        /// Alert rules that fired (and were cleared) during the batch.
        fired: usize,
    },
}
