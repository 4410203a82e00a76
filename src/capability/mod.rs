//! Interfaces to everything the engine does not own: sensors, speech,
//! location, message delivery, contacts and the presentation layer.
//!
//! Platform variants are picked when [`Capabilities`] is assembled.

pub mod contacts;
pub mod dispatcher;
pub mod location;
pub mod recognizer;
pub mod sampler;
pub mod surface;
mod worker;

#[cfg(test)]
mod tests;

pub use contacts::{select_recipients, Contact, ContactStore};
pub use dispatcher::{
    DeliveryEntry, DeliveryReport, DeliveryStatus, Dispatcher, MessageSender, SmsDispatcher,
};
pub use location::{
    CachedLocationProvider, FixedLocation, Location, LocationProvider, LocationResolver,
};
pub use recognizer::{Recognizer, SpeechBackend, ThreadedRecognizer, UnavailableRecognizer};
pub use sampler::{MotionSource, Sampler, ThreadedSampler, UnavailableSampler};
pub use surface::{DetachedSurface, NotificationSink, SilentNotifications, TriggerSurface};

use crate::settings::PhraseStore;

pub struct Capabilities {
    pub sampler: Box<dyn Sampler>,
    pub recognizer: Box<dyn Recognizer>,
    pub location: Box<dyn LocationProvider>,
    pub dispatcher: Box<dyn Dispatcher>,
    pub contacts: Box<dyn ContactStore>,
    pub notifications: Box<dyn NotificationSink>,
    pub surface: Box<dyn TriggerSurface>,
    pub phrase_store: Box<dyn PhraseStore + Send>,
}
