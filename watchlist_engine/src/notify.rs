//! Notification seam.
use log::info;

/// Best-effort, fire-and-forget delivery of user notifications.
pub trait NotificationSink: Send + Sync {
    /// Delivers a notification. Failures are the sink's own business.
    fn notify(&self, title: &str, body: &str);
}

/// Sink that writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!("ALERT: {} | {}", title, body);
    }
}
