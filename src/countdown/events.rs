use crate::trigger::TriggerEvent;

use super::snapshot::CountdownPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownCommand {
    Trigger(TriggerEvent),
    Tick,
    Cancel,
    DispatchFinished,
    SetPolicy(CountdownPolicy),
}
