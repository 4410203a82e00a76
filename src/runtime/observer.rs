use crate::{
    capability::{DeliveryReport, Location},
    error::Feature,
    trigger::TriggerSource,
};

#[derive(Clone, Debug, PartialEq)]
pub struct DispatchOutcome {
    pub source: TriggerSource,
    pub message: String,
    pub location: Location,
    pub report: DeliveryReport,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    TriggerAccepted { source: TriggerSource },
    TriggerIgnored { source: TriggerSource },
    CountdownStarted { source: TriggerSource, remaining: u32 },
    CountdownTick { remaining: u32 },
    CountdownCancelled { source: TriggerSource, remaining: u32 },
    DispatchCompleted(DispatchOutcome),
    SourceDisabled { feature: Feature, reason: String },
}

pub trait EngineObserver {
    fn on_event(&mut self, event: &EngineEvent);
}

impl<F: FnMut(&EngineEvent)> EngineObserver for F {
    fn on_event(&mut self, event: &EngineEvent) {
        self(event)
    }
}
