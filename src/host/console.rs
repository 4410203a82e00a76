use std::collections::BTreeSet;

use sosguard::{
    capability::{MessageSender, NotificationSink},
    error::{DeliveryError, NotifyError},
};

/// Prints messages instead of sending them. Numbers in `failing` are
/// rejected so partial delivery can be rehearsed.
pub struct ConsoleSender {
    failing: BTreeSet<String>,
}

impl ConsoleSender {
    pub fn new(failing: impl IntoIterator<Item = String>) -> Self {
        Self {
            failing: failing.into_iter().collect(),
        }
    }
}

impl MessageSender for ConsoleSender {
    fn send(&mut self, phone: &str, message: &str) -> Result<(), DeliveryError> {
        if self.failing.contains(phone) {
            return Err(DeliveryError {
                phone: phone.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        println!("[SIMULATION] SMS to {phone}: {message}");
        Ok(())
    }
}

pub struct ConsoleNotifications;

impl NotificationSink for ConsoleNotifications {
    fn notify(&mut self, title: &str, message: &str) -> Result<(), NotifyError> {
        println!("[NOTIFY] {title}: {message}");
        Ok(())
    }
}
