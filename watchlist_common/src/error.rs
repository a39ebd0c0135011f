//! Error types shared between the engine and its front-ends.
//!
//! The `WatchlistError` enum unifies the failure cases that can cross a crate
//! boundary: I/O, JSON encoding, channel communication with the engine worker,
//! poisoned locks, persistence failures and use of a disposed engine.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by the engine and the CLI.
#[derive(Error, Debug)]
pub enum WatchlistError {
    /// I/O error originating from the standard library or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Error while parsing a ticker file into symbols.
    #[error("Parse tickers file error: {0}")]
    ParseTickersFile(String),

    /// Persistence store rejected a read or write; contains the key and reason.
    #[error("Store error: {0}")]
    Store(String),

    /// Channel send failed (e.g., the engine worker has exited).
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Channel receive failed (e.g., the engine worker dropped the reply).
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// The engine has been disposed and accepts no further work.
    #[error("Watchlist engine is disposed")]
    Disposed,
}

impl<T> From<PoisonError<T>> for WatchlistError {
    fn from(err: PoisonError<T>) -> Self {
        WatchlistError::MutexLock(err.to_string())
    }
}
