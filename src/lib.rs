//! Trigger detection and alert dispatch for a personal-safety app.
//!
//! Shake, voice and button producers feed a single-threaded reactor
//! ([`runtime::SosEngine`]) that debounces their input, runs one
//! cancellable countdown at a time and dispatches the alert exactly once
//! per countdown.

pub mod capability;
pub mod countdown;
pub mod error;
pub mod runtime;
pub mod settings;
pub mod trigger;

pub use capability::Capabilities;
pub use error::{Feature, SosError};
pub use runtime::{EngineEvent, SosEngine};
pub use settings::Settings;
