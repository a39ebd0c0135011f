//! Simulated market data.
//!
//! `SimulatedQuoteSource` stands in for a remote quote API. Each symbol opens at
//! a price derived from its name and then follows a small random walk, so every
//! fetch moves the price by at most one percent. A configurable share of fetches
//! fails to exercise the engine's stale-quote handling.
use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;
use rand::Rng;
use watchlist_common::defaults::DEFAULT_CURRENCY;
use watchlist_common::symbol::is_plausible_symbol;
use watchlist_common::{PricePoint, Quote};
use watchlist_engine::QuoteSource;

/// Samples in one simulated intraday session (5-minute bars over 6.5 hours).
const SESSION_POINTS: usize = 78;

struct PriceBook {
    open: f64,
    last: f64,
}

/// Random-walk quote source.
pub struct SimulatedQuoteSource {
    books: Mutex<HashMap<String, PriceBook>>,
    failure_rate: f64,
}

impl SimulatedQuoteSource {
    /// Creates a source where each fetch fails with probability `failure_rate`.
    pub fn new(failure_rate: f64) -> Self {
        let failure_rate = if (0.0..=1.0).contains(&failure_rate) {
            failure_rate
        } else {
            0.0
        };
        Self {
            books: Mutex::new(HashMap::new()),
            failure_rate,
        }
    }

    /// Calculate the next price using a small random walk around `current_price`.
    ///
    /// The change is sampled uniformly from `[-1%, +1%]` and the result is clamped
    /// to a minimum positive value.
    pub fn next_price(current_price: f64) -> f64 {
        let mut rng = rand::rng();
        let change: f64 = rng.random_range(-0.01..0.01);
        let new_price = current_price * (1.0 + change);
        new_price.max(0.01)
    }

    /// Deterministic opening price between 20 and 500 derived from the symbol.
    pub fn opening_price(symbol: &str) -> f64 {
        let seed = symbol
            .bytes()
            .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
        20.0 + f64::from(seed % 48_000) / 100.0
    }
}

impl QuoteSource for SimulatedQuoteSource {
    fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        if !is_plausible_symbol(symbol) {
            return None;
        }
        if rand::rng().random_bool(self.failure_rate) {
            debug!("Simulated outage for {}", symbol);
            return None;
        }

        let mut books = self.books.lock().ok()?;
        let book = books.entry(symbol.to_string()).or_insert_with(|| {
            let open = Self::opening_price(symbol);
            PriceBook { open, last: open }
        });
        book.last = Self::next_price(book.last);
        let change = book.last - book.open;
        Some(Quote::new(
            symbol,
            book.last,
            change,
            change / book.open * 100.0,
            DEFAULT_CURRENCY,
        ))
    }

    fn fetch_series(&self, symbol: &str) -> Vec<PricePoint> {
        if !is_plausible_symbol(symbol) {
            return Vec::new();
        }
        let open = match self.books.lock() {
            Ok(books) => books
                .get(symbol)
                .map(|book| book.open)
                .unwrap_or_else(|| Self::opening_price(symbol)),
            Err(_) => return Vec::new(),
        };

        let mut price = open;
        (0..SESSION_POINTS)
            .map(|index| {
                if index > 0 {
                    price = Self::next_price(price);
                }
                PricePoint { index, price }
            })
            .collect()
    }
}
