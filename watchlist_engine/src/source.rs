//! Market data seam.
use watchlist_common::{PricePoint, Quote};

/// Remote quote provider.
///
/// Implementations collapse every failure (network, parse, unknown symbol)
/// into `None` or an empty series; the engine treats them all the same way.
pub trait QuoteSource: Send + Sync {
    /// Current quote for `symbol`, or `None` if unavailable.
    fn fetch_quote(&self, symbol: &str) -> Option<Quote>;

    /// Intraday price series for `symbol`, oldest first. Empty on failure.
    fn fetch_series(&self, _symbol: &str) -> Vec<PricePoint> {
        Vec::new()
    }
}
