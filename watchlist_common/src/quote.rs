//! Quote snapshots and intraday price points.
//!
//! A `Quote` is replaced wholesale on each successful fetch; nothing ever edits
//! one in place.
/// Latest known price snapshot for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Uppercase symbol identifier.
    pub symbol: String,
    /// Last traded price.
    pub price: f64,
    /// Absolute change against the previous close.
    pub change: f64,
    /// Percent change against the previous close.
    pub change_percent: f64,
    /// ISO currency code the price is quoted in.
    pub currency: String,
}

impl Quote {
    /// Builds a quote snapshot.
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        change: f64,
        change_percent: f64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change,
            change_percent,
            currency: currency.into(),
        }
    }

    /// Price with two decimals followed by the currency code, e.g. `101.50 USD`.
    pub fn formatted_price(&self) -> String {
        format!("{:.2} {}", self.price, self.currency)
    }
}

/// One sample of an intraday price series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Position of the sample within the session.
    pub index: usize,
    /// Price at that position.
    pub price: f64,
}
