pub mod config;
pub mod debouncer;
pub mod features;
pub mod trace;
pub mod types;

pub use config::{active_config, EngineConfig};
pub use debouncer::{DebounceOutput, TriggerDebouncer};
pub use trace::DebounceTrace;
pub use types::{
    DebouncePolicy, MotionSample, RejectReason, TranscriptFragment, TriggerEvent, TriggerSource,
};
