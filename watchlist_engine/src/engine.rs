//! Public handle to the watchlist engine.
//!
//! ```no_run
//! use watchlist_engine::{EngineConfig, LogNotifier, MemoryStore, QuoteSource, WatchlistEngine};
//! use watchlist_common::Quote;
//!
//! struct Flat;
//! impl QuoteSource for Flat {
//!     fn fetch_quote(&self, symbol: &str) -> Option<Quote> {
//!         Some(Quote::new(symbol, 100.0, 0.0, 0.0, "USD"))
//!     }
//! }
//!
//! fn main() -> watchlist_common::Result<()> {
//!     let engine = WatchlistEngine::new(Flat, LogNotifier, MemoryStore::new(), EngineConfig::default())?;
//!     engine.add_ticker("nvda")?;
//!     engine.flush()?;
//!     println!("{:?}", engine.quote_of("NVDA"));
//!     engine.dispose();
//!     Ok(())
//! }
//! ```
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, bounded, unbounded};
use log::{error, info};
use watchlist_common::symbol::normalize_symbol;
use watchlist_common::{AlertRule, PricePoint, Quote, Result, WatchlistError};

use crate::config::EngineConfig;
use crate::event::WatchlistEvent;
use crate::health::FetchHealth;
use crate::notify::NotificationSink;
use crate::poller::Poller;
use crate::source::QuoteSource;
use crate::state::WatchlistEntry;
use crate::store::PersistenceStore;
use crate::worker::{Command, CommandQueue, Shared, Worker, load_state};

/// Owner of the ticker list, quote cache and alert rules.
///
/// Read accessors return snapshots and never wait on network I/O. Mutations
/// are queued and applied in order by a background worker; use [`flush`] to
/// wait until everything queued so far has been applied.
///
/// [`flush`]: WatchlistEngine::flush
pub struct WatchlistEngine {
    shared: Arc<Shared>,
    queue: CommandQueue,
    source: Arc<dyn QuoteSource>,
    worker: Mutex<Option<JoinHandle<()>>>,
    poller: Mutex<Option<Poller>>,
}

impl WatchlistEngine {
    /// Loads persisted state, starts the worker, queues an initial full refresh
    /// and, if `config.poll_interval` is set, starts polling.
    pub fn new<S, N, P>(source: S, sink: N, store: P, config: EngineConfig) -> Result<Self>
    where
        S: QuoteSource + 'static,
        N: NotificationSink + 'static,
        P: PersistenceStore + 'static,
    {
        let state = load_state(&store);
        let shared = Arc::new(Shared::new(state));
        let source: Arc<dyn QuoteSource> = Arc::new(source);

        let (tx, rx) = unbounded::<Command>();
        let queue = CommandQueue::new(tx, Arc::clone(&shared));
        let worker = Worker::new(
            Arc::clone(&shared),
            Arc::clone(&source),
            Arc::new(sink),
            Box::new(store),
            FetchHealth::new(config.failure_streak_warn),
        )
        .spawn(rx)?;

        let engine = Self {
            shared,
            queue,
            source,
            worker: Mutex::new(Some(worker)),
            poller: Mutex::new(None),
        };
        engine.refresh()?;
        if let Some(interval) = config.poll_interval {
            engine.start_polling(interval)?;
        }
        Ok(engine)
    }

    /// Ticker list in display order.
    pub fn tickers(&self) -> Vec<String> {
        self.shared.state().tickers().to_vec()
    }

    /// Last known quote for `symbol`.
    pub fn quote_of(&self, symbol: &str) -> Option<Quote> {
        self.shared.state().quote_of(symbol).cloned()
    }

    /// Armed alert rule for `symbol`.
    pub fn alert_of(&self, symbol: &str) -> Option<AlertRule> {
        self.shared.state().alert_of(symbol).copied()
    }

    /// Every armed alert rule keyed by symbol.
    pub fn alerts(&self) -> HashMap<String, AlertRule> {
        self.shared.state().alerts().clone()
    }

    /// Rows in display order with their quote and rule.
    pub fn entries(&self) -> Vec<WatchlistEntry> {
        self.shared.state().entries()
    }

    /// Queues adding `raw` (trimmed, uppercased). Blank input and symbols that
    /// are already listed are ignored. A newly added symbol is refreshed on its own.
    pub fn add_ticker(&self, raw: &str) -> Result<()> {
        self.queue.send(Command::AddTicker(raw.to_string()))
    }

    /// Queues removing `symbol` with its quote and rule.
    pub fn remove_ticker(&self, symbol: &str) -> Result<()> {
        self.queue.send(Command::RemoveTicker(symbol.to_string()))
    }

    /// Queues storing `rule` for `symbol`. `None` or a rule with no threshold clears it.
    pub fn set_alert(&self, symbol: &str, rule: Option<AlertRule>) -> Result<()> {
        self.queue
            .send(Command::SetAlert(symbol.to_string(), rule))
    }

    /// Shorthand for `set_alert(symbol, None)`.
    pub fn clear_alert(&self, symbol: &str) -> Result<()> {
        self.set_alert(symbol, None)
    }

    /// Queues a refresh of every ticker. A full refresh that is already queued
    /// and not yet started absorbs this request.
    pub fn refresh(&self) -> Result<()> {
        self.queue.request_full_refresh().map(|_| ())
    }

    /// Queues a refresh of the given symbols only. Symbols that are not on the
    /// watchlist when the refresh starts are skipped.
    pub fn refresh_symbols<I, T>(&self, symbols: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let symbols = symbols
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        self.queue.send(Command::Refresh(Some(symbols)))
    }

    /// Intraday series for `symbol` straight from the quote source. Empty on failure.
    pub fn series_of(&self, symbol: &str) -> Vec<PricePoint> {
        match normalize_symbol(symbol) {
            Some(symbol) => self.source.fetch_series(&symbol),
            None => Vec::new(),
        }
    }

    /// Registers an observer. It receives one event per mutation and one per
    /// refresh batch until the receiver is dropped. Each observer buffers up to
    /// [`EVENT_BUFFER`] undrained events; further events are dropped for that
    /// observer until it catches up.
    ///
    /// [`EVENT_BUFFER`]: watchlist_common::defaults::EVENT_BUFFER
    pub fn subscribe(&self) -> Receiver<WatchlistEvent> {
        self.shared.subscribe()
    }

    /// Blocks until every command queued before this call has been applied.
    pub fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.queue.send(Command::Flush(ack_tx))?;
        ack_rx
            .recv()
            .map_err(|e| WatchlistError::ChannelRecv(e.to_string()))
    }

    /// Starts polling every `interval`, cancelling any poll loop already running.
    pub fn start_polling(&self, interval: Duration) -> Result<()> {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = poller.take() {
            previous.stop();
        }
        if self.shared.is_disposed() {
            return Err(WatchlistError::Disposed);
        }
        *poller = Some(Poller::start(interval, self.queue.clone())?);
        Ok(())
    }

    /// Stops polling. No poll tick fires after this returns.
    pub fn stop_polling(&self) {
        let previous = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.stop();
        }
    }

    /// `true` while a poll loop is running.
    pub fn is_polling(&self) -> bool {
        self.polling_interval().is_some()
    }

    /// Interval of the running poll loop, if any.
    pub fn polling_interval(&self) -> Option<Duration> {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Poller::interval)
    }

    /// `true` once [`dispose`](WatchlistEngine::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    /// Stops polling and the worker. Commands queued before disposal are still
    /// applied, but no notification is delivered from then on and every later
    /// call that queues work returns [`WatchlistError::Disposed`].
    pub fn dispose(&self) {
        if self.shared.mark_disposed() {
            return;
        }
        self.stop_polling();
        self.queue.shutdown();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                error!("Watchlist worker panicked");
            }
        }
        info!("Watchlist engine disposed");
    }
}

impl Drop for WatchlistEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
