use crate::trigger::{active_config, TriggerSource};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CountdownPhase {
    #[default]
    Idle,
    CountingDown,
    Dispatching,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownPolicy {
    pub enabled: bool,
    pub seconds: u32,
}

impl Default for CountdownPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            seconds: active_config().countdown.default_seconds,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownState {
    pub trigger_source: TriggerSource,
    pub remaining_seconds: u32,
    pub started_at_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountdownSnapshot {
    pub phase: CountdownPhase,
    pub active: Option<CountdownState>,
    pub dispatch_source: Option<TriggerSource>,
    pub policy: CountdownPolicy,
}

impl CountdownSnapshot {
    pub fn with_policy(policy: CountdownPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.active.map(|state| state.remaining_seconds)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, CountdownPhase::Idle)
    }
}
