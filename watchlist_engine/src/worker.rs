//! Command queue and the single worker thread that applies it.
//!
//! Every mutation and every refresh becomes a [`Command`] on one unbounded
//! crossbeam channel. The worker drains it in order, so two refreshes never run
//! at the same time and a mutation never lands in the middle of a refresh. The
//! state lock is held only around map updates, never across a `QuoteSource`
//! call, so readers are not blocked by network latency.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use log::{debug, error, info, warn};
use watchlist_common::defaults::{ALERTS_KEY, EVENT_BUFFER, TICKERS_KEY};
use watchlist_common::symbol::normalize_symbol;
use watchlist_common::{AlertCrossing, AlertRule, Result, WatchlistError};

use crate::codec::{decode_alerts, encode_alerts};
use crate::event::WatchlistEvent;
use crate::health::FetchHealth;
use crate::notify::NotificationSink;
use crate::source::QuoteSource;
use crate::state::{AlertUpdate, QuoteOutcome, WatchlistState};
use crate::store::PersistenceStore;

/// Work item for the worker thread.
pub(crate) enum Command {
    AddTicker(String),
    RemoveTicker(String),
    SetAlert(String, Option<AlertRule>),
    /// `None` refreshes the whole ticker list as it is when the command starts.
    Refresh(Option<Vec<String>>),
    /// Acknowledged once every earlier command has been applied.
    Flush(Sender<()>),
    Shutdown,
}

/// State shared between the engine handle, the worker and the poller.
pub(crate) struct Shared {
    state: Mutex<WatchlistState>,
    subscribers: Mutex<Vec<Sender<WatchlistEvent>>>,
    /// `true` once disposed. Senders hold the read side while enqueueing, so
    /// nothing can be queued behind `Command::Shutdown`.
    disposed: RwLock<bool>,
    full_refresh_queued: AtomicBool,
}

impl Shared {
    pub(crate) fn new(state: WatchlistState) -> Self {
        Self {
            state: Mutex::new(state),
            subscribers: Mutex::new(Vec::new()),
            disposed: RwLock::new(false),
            full_refresh_queued: AtomicBool::new(false),
        }
    }

    /// Locks the state. A poisoned lock still holds consistent maps because no
    /// method of `WatchlistState` can panic halfway through an update.
    pub(crate) fn state(&self) -> MutexGuard<'_, WatchlistState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an observer with room for `EVENT_BUFFER` undrained events.
    pub(crate) fn subscribe(&self) -> Receiver<WatchlistEvent> {
        let (tx, rx) = bounded(EVENT_BUFFER);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Sends `event` to every live subscriber and forgets the dropped ones.
    /// A subscriber whose buffer is full misses the event but stays registered.
    pub(crate) fn publish(&self, event: WatchlistEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| match tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Subscriber is not draining, dropped {:?}", event);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    pub(crate) fn is_disposed(&self) -> bool {
        *self.disposed.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the engine disposed. Returns `true` if it already was.
    pub(crate) fn mark_disposed(&self) -> bool {
        let mut disposed = self.disposed.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *disposed, true)
    }
}

/// Cloneable sending side of the command queue.
#[derive(Clone)]
pub(crate) struct CommandQueue {
    tx: Sender<Command>,
    shared: Arc<Shared>,
}

impl CommandQueue {
    pub(crate) fn new(tx: Sender<Command>, shared: Arc<Shared>) -> Self {
        Self { tx, shared }
    }

    /// Queues `command`. `Ok` means the worker will apply it: disposal cannot
    /// slip in between the check and the send.
    pub(crate) fn send(&self, command: Command) -> Result<()> {
        let disposed = self
            .shared
            .disposed
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if *disposed {
            return Err(WatchlistError::Disposed);
        }
        self.tx
            .send(command)
            .map_err(|_| WatchlistError::ChannelSend("watchlist worker has stopped".to_string()))
    }

    /// Queues a full refresh unless one is already waiting. Returns whether a
    /// command was queued.
    pub(crate) fn request_full_refresh(&self) -> Result<bool> {
        if self.shared.full_refresh_queued.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        if let Err(e) = self.send(Command::Refresh(None)) {
            self.shared.full_refresh_queued.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(true)
    }

    /// Asks the worker to exit after the commands already queued.
    pub(crate) fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Reads tickers and rules from `store`. Never fails: unreadable data falls
/// back to the seed list and an empty rule map.
pub(crate) fn load_state(store: &dyn PersistenceStore) -> WatchlistState {
    let tickers = match store.get_string_list(TICKERS_KEY) {
        Ok(Some(tickers)) => tickers,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Could not read stored tickers, using defaults: {}", e);
            Vec::new()
        }
    };
    let decoded = match store.get_string(ALERTS_KEY) {
        Ok(Some(text)) => decode_alerts(&text),
        Ok(None) => Default::default(),
        Err(e) => {
            warn!("Could not read stored alerts, starting without any: {}", e);
            Default::default()
        }
    };

    let restored_from_store = !tickers.is_empty();
    let (state, orphans) = WatchlistState::restore(tickers, decoded.rules);
    if orphans > 0 {
        warn!("Dropped {} stored alerts for symbols not on the watchlist", orphans);
    }
    info!(
        "Loaded {} tickers ({}) and {} alerts, {} stored alerts skipped",
        state.tickers().len(),
        if restored_from_store { "restored" } else { "default seed" },
        state.alerts().len(),
        decoded.skipped + orphans
    );
    state
}

/// Owns the collaborators and applies commands one at a time.
pub(crate) struct Worker {
    shared: Arc<Shared>,
    source: Arc<dyn QuoteSource>,
    sink: Arc<dyn NotificationSink>,
    store: Box<dyn PersistenceStore>,
    health: FetchHealth,
}

impl Worker {
    pub(crate) fn new(
        shared: Arc<Shared>,
        source: Arc<dyn QuoteSource>,
        sink: Arc<dyn NotificationSink>,
        store: Box<dyn PersistenceStore>,
        health: FetchHealth,
    ) -> Self {
        Self {
            shared,
            source,
            sink,
            store,
            health,
        }
    }

    pub(crate) fn spawn(self, commands: Receiver<Command>) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("watchlist-worker".to_string())
            .spawn(move || self.run(commands))?;
        Ok(handle)
    }

    fn run(mut self, commands: Receiver<Command>) {
        info!("Watchlist worker started (Thread ID: {:?})", thread::current().id());
        while let Ok(command) = commands.recv() {
            match command {
                Command::AddTicker(raw) => self.add_ticker(&raw),
                Command::RemoveTicker(symbol) => self.remove_ticker(&symbol),
                Command::SetAlert(symbol, rule) => self.set_alert(&symbol, rule),
                Command::Refresh(symbols) => self.refresh(symbols),
                Command::Flush(ack) => {
                    let _ = ack.send(());
                }
                Command::Shutdown => break,
            }
        }
        info!("Watchlist worker stopped");
    }

    fn add_ticker(&mut self, raw: &str) {
        let added = self.shared.state().add_ticker(raw);
        let Some(symbol) = added else {
            debug!("Ignoring add of `{}`: blank or already listed", raw.trim());
            return;
        };
        info!("Added ticker {}", symbol);
        self.save();
        self.shared.publish(WatchlistEvent::TickersChanged);
        self.refresh(Some(vec![symbol]));
    }

    fn remove_ticker(&mut self, symbol: &str) {
        let removed = self.shared.state().remove_ticker(symbol);
        if !removed {
            debug!("Ignoring removal of `{}`: not listed", symbol.trim());
            return;
        }
        if let Some(symbol) = normalize_symbol(symbol) {
            self.health.forget(&symbol);
            info!("Removed ticker {}", symbol);
        }
        self.save();
        self.shared.publish(WatchlistEvent::TickersChanged);
    }

    fn set_alert(&mut self, symbol: &str, rule: Option<AlertRule>) {
        let update = self.shared.state().set_alert(symbol, rule);
        match update {
            AlertUpdate::Stored => info!("Alert armed for {}: {:?}", symbol.trim(), rule),
            AlertUpdate::Cleared => info!("Alert cleared for {}", symbol.trim()),
            AlertUpdate::Untracked => {
                warn!("Ignoring alert for `{}`: not on the watchlist", symbol.trim())
            }
        }
        self.save();
        self.shared.publish(WatchlistEvent::AlertsChanged);
    }

    fn refresh(&mut self, symbols: Option<Vec<String>>) {
        let full = symbols.is_none();
        if full {
            self.shared
                .full_refresh_queued
                .store(false, Ordering::SeqCst);
        }

        let batch: Vec<String> = {
            let state = self.shared.state();
            match symbols {
                None => state.tickers().to_vec(),
                Some(requested) => {
                    let mut batch: Vec<String> = Vec::new();
                    for symbol in requested.iter().filter_map(|s| normalize_symbol(s)) {
                        if state.contains(&symbol) && !batch.contains(&symbol) {
                            batch.push(symbol);
                        }
                    }
                    batch
                }
            }
        };

        let mut updated = 0;
        let mut fired = 0;
        for symbol in &batch {
            let Some(quote) = self.source.fetch_quote(symbol) else {
                self.record_failure(symbol);
                continue;
            };
            if let Some((count, age)) = self.health.record_success(symbol) {
                info!("{} quotes recovered after {} failures ({:?})", symbol, count, age);
            }

            let outcome = self.shared.state().apply_quote(symbol, quote);
            match outcome {
                QuoteOutcome::Untracked => {
                    debug!("Discarding quote for {}: removed during refresh", symbol)
                }
                QuoteOutcome::Updated => updated += 1,
                QuoteOutcome::Crossed(crossing) => {
                    updated += 1;
                    if self.deliver(&crossing) {
                        let consumed = self.shared.state().consume_alert(&crossing);
                        if consumed {
                            fired += 1;
                            self.save();
                        }
                    }
                }
            }
        }

        debug!(
            "Refresh ({}) done: {}/{} quotes updated, {} alerts fired",
            if full { "full" } else { "partial" },
            updated,
            batch.len(),
            fired
        );
        self.shared
            .publish(WatchlistEvent::Refreshed { updated, fired });
    }

    fn record_failure(&mut self, symbol: &str) {
        let report = self.health.record_failure(symbol);
        if report.crossed_threshold {
            warn!(
                "No quote for {} in {} consecutive attempts; keeping the last known quote",
                symbol, report.count
            );
        } else {
            debug!("No quote for {} (attempt {})", symbol, report.count);
        }
    }

    /// Sends the notification. Returns `false` if it was withheld, in which
    /// case the rule must stay armed.
    fn deliver(&self, crossing: &AlertCrossing) -> bool {
        if self.shared.is_disposed() {
            info!("Alert for {} not delivered: engine disposed, rule kept", crossing.symbol);
            return false;
        }
        info!(
            "Alert fired for {}: {} {} at {:.2} {}",
            crossing.symbol, crossing.kind, crossing.threshold, crossing.price, crossing.currency
        );
        self.sink.notify(&crossing.title(), &crossing.body());
        true
    }

    /// Writes tickers and rules. Failures are logged; the in-memory state stays authoritative.
    fn save(&mut self) {
        let (tickers, alerts) = {
            let state = self.shared.state();
            (state.tickers().to_vec(), state.alerts().clone())
        };
        if let Err(e) = self.store.set_string_list(TICKERS_KEY, &tickers) {
            error!("Failed to save tickers: {}", e);
        }
        match encode_alerts(&alerts) {
            Ok(text) => {
                if let Err(e) = self.store.set_string(ALERTS_KEY, &text) {
                    error!("Failed to save alerts: {}", e);
                }
            }
            Err(e) => error!("Failed to encode alerts: {}", e),
        }
    }
}
