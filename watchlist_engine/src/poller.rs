//! Cancellable repeating timer that queues full refreshes.
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};
use log::{debug, info, warn};
use watchlist_common::{Result, WatchlistError};

use crate::worker::CommandQueue;

/// A running poll loop. Dropping the handle without calling [`Poller::stop`]
/// also ends the loop, because the stop channel disconnects.
pub(crate) struct Poller {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
    interval: Duration,
}

impl Poller {
    /// Starts a thread that requests a full refresh every `interval`.
    pub(crate) fn start(interval: Duration, queue: CommandQueue) -> Result<Self> {
        if interval.is_zero() {
            return Err(WatchlistError::Format(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("watchlist-poller".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => match queue.request_full_refresh() {
                            Ok(true) => debug!("Poll tick queued a full refresh"),
                            Ok(false) => debug!("Poll tick skipped: a full refresh is already queued"),
                            Err(e) => {
                                warn!("Poller stopping: {}", e);
                                break;
                            }
                        },
                    }
                }
                debug!("Poller thread exiting");
            })?;

        info!("Polling every {:?}", interval);
        Ok(Self {
            stop_tx,
            handle,
            interval,
        })
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the loop and waits for its thread, so no tick can fire afterwards.
    pub(crate) fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            warn!("Poller thread panicked");
        }
        info!("Polling every {:?} stopped", self.interval);
    }
}
