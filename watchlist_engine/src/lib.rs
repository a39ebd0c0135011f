//! Watchlist state engine.
//!
//! The engine owns the ordered ticker list, the last-known quote per symbol and
//! the alert rule per symbol. It refreshes quotes from a [`QuoteSource`] on a
//! fixed cadence, fires a [`NotificationSink`] exactly once when a rule's
//! threshold is crossed (then deletes the rule), and writes tickers and rules
//! to a [`PersistenceStore`] after every mutation.
//!
//! Building blocks:
//!
//! - `engine` — the public [`WatchlistEngine`] handle. Reads go straight to the
//!   shared state; every mutation is queued as a command.
//! - `worker` — the single thread that drains the command queue and is the only
//!   writer of state. Refreshes are therefore never concurrent with each other
//!   or with mutations.
//! - `poller` — a cancellable repeating timer that queues full refreshes.
//! - `state` — the plain in-memory maps and their invariants.
//! - `codec` — text encoding of the alert-rule map for the store.
//! - `store`, `source`, `notify` — the collaborator seams and stock implementations.
//! - `health` — consecutive fetch-failure tracking per symbol.
#![warn(missing_docs)]
pub mod codec;
pub mod config;
pub mod engine;
pub mod event;
pub mod health;
pub mod notify;
mod poller;
pub mod source;
pub mod state;
pub mod store;
mod worker;

pub use config::EngineConfig;
pub use engine::WatchlistEngine;
pub use event::WatchlistEvent;
pub use notify::{LogNotifier, NotificationSink};
pub use source::QuoteSource;
pub use state::{WatchlistEntry, WatchlistState};
pub use store::{JsonFileStore, MemoryStore, PersistenceStore};
