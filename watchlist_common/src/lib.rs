//!
//! Common types and utilities shared by the watchlist engine and its front-ends.
//!
//! This crate aggregates:
//! - `error` — unified error type `WatchlistError` used across the workspace.
//! - `result` — handy `Result<T, WatchlistError>` alias.
//! - `symbol` — symbol normalization and ticker-file parsing helpers.
//! - `quote` — quote snapshots and intraday price points.
//! - `alert` — alert rules, crossing detection and notification payloads.
//! - `defaults` — polling, storage and seed constants.
#![warn(missing_docs)]
pub mod alert;
pub mod defaults;
pub mod error;
pub mod quote;
pub mod result;
pub mod symbol;

pub use alert::{AlertCrossing, AlertKind, AlertRule};
pub use error::WatchlistError;
pub use quote::{PricePoint, Quote};
pub use result::Result;
