use crate::error::DeliveryError;

use super::contacts::Contact;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed(String),
    Skipped(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryEntry {
    pub name: String,
    pub phone: String,
    pub status: DeliveryStatus,
}

/// Per-contact outcome of one dispatch, in contact order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub entries: Vec<DeliveryEntry>,
}

impl DeliveryReport {
    pub fn record(&mut self, contact: &Contact, status: DeliveryStatus) {
        self.entries.push(DeliveryEntry {
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            status,
        });
    }

    pub fn delivered_count(&self) -> usize {
        self.count(|status| matches!(status, DeliveryStatus::Delivered))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, DeliveryStatus::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|status| matches!(status, DeliveryStatus::Skipped(_)))
    }

    pub fn is_partial_failure(&self) -> bool {
        self.failed_count() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.status, DeliveryStatus::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&DeliveryStatus) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.status))
            .count()
    }
}

pub trait Dispatcher: Send {
    fn dispatch(&mut self, message: &str, contacts: &[Contact]) -> DeliveryReport;
}

/// One message to one phone number.
pub trait MessageSender: Send {
    fn send(&mut self, phone: &str, message: &str) -> Result<(), DeliveryError>;
}

/// Sends to every contact independently; one failure never stops the rest.
pub struct SmsDispatcher<S: MessageSender> {
    sender: S,
}

impl<S: MessageSender> SmsDispatcher<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }
}

impl<S: MessageSender> Dispatcher for SmsDispatcher<S> {
    fn dispatch(&mut self, message: &str, contacts: &[Contact]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for contact in contacts {
            let phone = contact.phone.trim();
            if phone.is_empty() {
                log::warn!("contact {:?} has no phone number", contact.name);
                report.record(contact, DeliveryStatus::Skipped("missing phone".to_string()));
                continue;
            }
            let status = match self.sender.send(phone, message) {
                Ok(()) => DeliveryStatus::Delivered,
                Err(err) => {
                    log::warn!("{err}");
                    DeliveryStatus::Failed(err.reason)
                }
            };
            report.record(contact, status);
        }
        report
    }
}
