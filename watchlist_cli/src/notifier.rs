//! Terminal notifications.
use log::info;
use watchlist_engine::NotificationSink;

/// Rings the terminal bell and prints the alert on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!("Delivering alert: {}", title);
        println!("\x07*** {} ***\n    {}", title, body);
    }
}
