use core::fmt;

use serde::{Deserialize, Serialize};

/// One 3-axis acceleration reading, stamped in milliseconds since engine start.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub at_ms: u64,
}

impl MotionSample {
    pub const fn new(x: f64, y: f64, z: f64, at_ms: u64) -> Self {
        Self { x, y, z, at_ms }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptFragment {
    pub fn partial(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().to_lowercase(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().to_lowercase(),
            is_final: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TriggerSource {
    Shake,
    Voice,
    Button,
}

impl TriggerSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shake => "Shake",
            Self::Voice => "Voice",
            Self::Button => "Button",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TriggerEvent {
    pub source: TriggerSource,
    pub occurred_at_ms: u64,
}

impl TriggerEvent {
    pub const fn new(source: TriggerSource, occurred_at_ms: u64) -> Self {
        Self {
            source,
            occurred_at_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RejectReason {
    #[default]
    None,
    Disabled,
    FirstSample,
    BelowThreshold,
    Accumulating,
    PhraseMissing,
}

/// What the debouncer is allowed to do right now, derived from the applied settings.
#[derive(Clone, Debug, PartialEq)]
pub struct DebouncePolicy {
    pub shake_enabled: bool,
    pub shake_threshold: f64,
    pub voice_enabled: bool,
    pub phrase: String,
}
