//! In-memory watchlist maps.
//!
//! `WatchlistState` holds the ordered ticker list plus two maps keyed by symbol:
//! the last-known quote and the alert rule. Both maps only ever contain symbols
//! that are in the ticker list. All lookups normalize their argument first.
use std::collections::HashMap;

use watchlist_common::defaults::default_tickers;
use watchlist_common::symbol::normalize_symbol;
use watchlist_common::{AlertCrossing, AlertRule, Quote};

/// One row of the watchlist as seen by a front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistEntry {
    /// Normalized symbol.
    pub symbol: String,
    /// Last quote, if a refresh has succeeded for this symbol.
    pub quote: Option<Quote>,
    /// Armed alert rule, if any.
    pub alert: Option<AlertRule>,
}

/// Result of [`WatchlistState::set_alert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertUpdate {
    /// The rule was stored, replacing any previous rule.
    Stored,
    /// Any previous rule was removed.
    Cleared,
    /// The symbol is not on the watchlist; nothing was stored.
    Untracked,
}

/// Result of [`WatchlistState::apply_quote`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// The symbol is no longer tracked; the quote was discarded.
    Untracked,
    /// The quote replaced the previous one and no rule fired.
    Updated,
    /// The quote replaced the previous one and crossed the symbol's rule.
    /// The rule stays armed until [`WatchlistState::consume_alert`] removes it.
    Crossed(AlertCrossing),
}

/// Ticker list, quote cache and alert rules.
#[derive(Debug, Clone, Default)]
pub struct WatchlistState {
    tickers: Vec<String>,
    quotes: HashMap<String, Quote>,
    alerts: HashMap<String, AlertRule>,
}

impl WatchlistState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state from persisted tickers and rules.
    ///
    /// Tickers are normalized and de-duplicated; if none survive, the default
    /// seed list is used. Rules for symbols outside the ticker list are dropped.
    /// Returns the state and the number of dropped rules.
    pub fn restore(tickers: Vec<String>, alerts: HashMap<String, AlertRule>) -> (Self, usize) {
        let mut state = Self::new();
        for raw in &tickers {
            state.add_ticker(raw);
        }
        if state.tickers.is_empty() {
            for symbol in default_tickers() {
                state.add_ticker(&symbol);
            }
        }

        let mut dropped = 0;
        for (symbol, rule) in alerts {
            if state.set_alert(&symbol, Some(rule)) == AlertUpdate::Untracked {
                dropped += 1;
            }
        }
        (state, dropped)
    }

    /// Ordered ticker list (display order).
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// `true` if `symbol` is on the watchlist.
    pub fn contains(&self, symbol: &str) -> bool {
        normalize_symbol(symbol).is_some_and(|s| self.tickers.contains(&s))
    }

    /// Last known quote for `symbol`.
    pub fn quote_of(&self, symbol: &str) -> Option<&Quote> {
        normalize_symbol(symbol).and_then(|s| self.quotes.get(&s))
    }

    /// Armed alert rule for `symbol`.
    pub fn alert_of(&self, symbol: &str) -> Option<&AlertRule> {
        normalize_symbol(symbol).and_then(|s| self.alerts.get(&s))
    }

    /// All armed rules.
    pub fn alerts(&self) -> &HashMap<String, AlertRule> {
        &self.alerts
    }

    /// Rows in display order.
    pub fn entries(&self) -> Vec<WatchlistEntry> {
        self.tickers
            .iter()
            .map(|symbol| WatchlistEntry {
                symbol: symbol.clone(),
                quote: self.quotes.get(symbol).cloned(),
                alert: self.alerts.get(symbol).copied(),
            })
            .collect()
    }

    /// Appends a symbol. Returns the normalized symbol if it was added, `None`
    /// for blank input or a symbol that is already present.
    pub fn add_ticker(&mut self, raw: &str) -> Option<String> {
        let symbol = normalize_symbol(raw)?;
        if self.tickers.contains(&symbol) {
            return None;
        }
        self.tickers.push(symbol.clone());
        Some(symbol)
    }

    /// Removes a symbol together with its quote and rule. Returns `false` if
    /// the symbol was not present.
    pub fn remove_ticker(&mut self, symbol: &str) -> bool {
        let Some(symbol) = normalize_symbol(symbol) else {
            return false;
        };
        let before = self.tickers.len();
        self.tickers.retain(|s| *s != symbol);
        self.quotes.remove(&symbol);
        self.alerts.remove(&symbol);
        self.tickers.len() != before
    }

    /// Stores or replaces the rule for `symbol`; `None` or an empty rule clears it.
    pub fn set_alert(&mut self, symbol: &str, rule: Option<AlertRule>) -> AlertUpdate {
        let Some(symbol) = normalize_symbol(symbol) else {
            return AlertUpdate::Untracked;
        };
        match rule.and_then(AlertRule::sanitized) {
            None => {
                self.alerts.remove(&symbol);
                AlertUpdate::Cleared
            }
            Some(_) if !self.tickers.contains(&symbol) => AlertUpdate::Untracked,
            Some(rule) => {
                self.alerts.insert(symbol, rule);
                AlertUpdate::Stored
            }
        }
    }

    /// Replaces the cached quote for `symbol` and evaluates its rule.
    pub fn apply_quote(&mut self, symbol: &str, mut quote: Quote) -> QuoteOutcome {
        let Some(symbol) = normalize_symbol(symbol) else {
            return QuoteOutcome::Untracked;
        };
        if !self.tickers.contains(&symbol) {
            return QuoteOutcome::Untracked;
        }
        quote.symbol = symbol.clone();

        let crossing = self
            .alerts
            .get(&symbol)
            .and_then(|rule| AlertCrossing::detect(&quote, rule));
        self.quotes.insert(symbol.clone(), quote);

        match crossing {
            Some(crossing) => QuoteOutcome::Crossed(crossing),
            None => QuoteOutcome::Updated,
        }
    }

    /// Removes the rule that produced `crossing`, once its notification went out.
    /// Returns `false` if the rule was already replaced or cleared.
    pub fn consume_alert(&mut self, crossing: &AlertCrossing) -> bool {
        let still_armed = self
            .alerts
            .get(&crossing.symbol)
            .and_then(|rule| rule.evaluate(crossing.price))
            == Some((crossing.kind, crossing.threshold));
        if still_armed {
            self.alerts.remove(&crossing.symbol);
        }
        still_armed
    }
}
