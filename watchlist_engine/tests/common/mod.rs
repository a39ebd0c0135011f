//! Scripted collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

use watchlist_common::{PricePoint, Quote};
use watchlist_engine::{NotificationSink, QuoteSource};

/// Quote source whose prices are set by the test. Symbols without a price
/// are unavailable. Clones share the same script.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    prices: Arc<Mutex<HashMap<String, f64>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(prices: &[(&str, f64)]) -> Self {
        let source = Self::new();
        for (symbol, price) in prices {
            source.set_price(symbol, *price);
        }
        source
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn make_unavailable(&self, symbol: &str) {
        self.prices.lock().unwrap().remove(symbol);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl QuoteSource for ScriptedSource {
    fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        self.calls.lock().unwrap().push(symbol.to_string());
        let price = *self.prices.lock().unwrap().get(symbol)?;
        Some(Quote::new(symbol, price, 1.0, 0.5, "USD"))
    }

    fn fetch_series(&self, symbol: &str) -> Vec<PricePoint> {
        match self.prices.lock().unwrap().get(symbol) {
            Some(price) => (0..3)
                .map(|index| PricePoint {
                    index,
                    price: price + index as f64,
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Wraps a [`ScriptedSource`]. While the gate is closed, the next fetch
/// blocks inside the worker until [`GatedSource::release`] is called.
#[derive(Clone)]
pub struct GatedSource {
    inner: ScriptedSource,
    closed: Arc<AtomicBool>,
    entered_tx: Sender<String>,
    entered_rx: Receiver<String>,
    release_tx: Sender<()>,
    release_rx: Receiver<()>,
}

impl GatedSource {
    pub fn new(inner: ScriptedSource) -> Self {
        let (entered_tx, entered_rx) = unbounded();
        let (release_tx, release_rx) = unbounded();
        Self {
            inner,
            closed: Arc::new(AtomicBool::new(false)),
            entered_tx,
            entered_rx,
            release_tx,
            release_rx,
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Waits until a fetch is parked at the gate and returns its symbol.
    pub fn wait_until_blocked(&self) -> String {
        self.entered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("no fetch reached the gate")
    }

    /// Opens the gate and lets the parked fetch continue.
    pub fn release(&self) {
        self.closed.store(false, Ordering::SeqCst);
        self.release_tx.send(()).unwrap();
    }
}

impl QuoteSource for GatedSource {
    fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
        if self.closed.load(Ordering::SeqCst) {
            self.entered_tx.send(symbol.to_string()).unwrap();
            let _ = self.release_rx.recv_timeout(Duration::from_secs(5));
        }
        self.inner.fetch_quote(symbol)
    }
}

/// Sink that remembers every notification.
#[derive(Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<(String, String)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, title: &str, body: &str) {
        self.delivered
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}
