use super::types::{RejectReason, TriggerSource};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebounceTrace {
    pub now_ms: u64,
    pub source: Option<TriggerSource>,
    pub reject_reason: RejectReason,
    pub magnitude: f64,
    pub threshold: f64,
    pub consecutive_hits: u8,
}
