//! The single-threaded reactor that ties producers, the debouncer and the
//! countdown together.

pub mod engine;
pub mod input;
pub mod message;
pub mod observer;


pub use engine::{EngineSnapshot, SettingsApplyReport, SosEngine};
pub use input::{ButtonHandle, EngineInput, InputSink};
pub use message::{compose_alert_message, notification_title};
pub use observer::{DispatchOutcome, EngineEvent, EngineObserver};
