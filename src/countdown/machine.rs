use statig::prelude::*;

use crate::trigger::{TriggerEvent, TriggerSource};

use super::actions::{ActionBuffer, CountdownAction, CountdownApplyStatus};
use super::events::CountdownCommand;
use super::snapshot::{CountdownPhase, CountdownSnapshot, CountdownState};

#[derive(Clone, Copy, Debug)]
pub(super) struct CountdownMachine {
    pub(super) snapshot: CountdownSnapshot,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct DispatchContext {
    pub(super) status: CountdownApplyStatus,
    pub(super) actions: ActionBuffer,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            status: CountdownApplyStatus::Unchanged,
            actions: ActionBuffer::new(),
        }
    }
}

impl CountdownMachine {
    pub(super) fn new(snapshot: CountdownSnapshot) -> Self {
        Self { snapshot }
    }

    fn arm(&mut self, context: &mut DispatchContext, trigger: TriggerEvent) {
        let remaining = self.snapshot.policy.seconds.max(1);
        self.snapshot.active = Some(CountdownState {
            trigger_source: trigger.source,
            remaining_seconds: remaining,
            started_at_ms: trigger.occurred_at_ms,
        });
        self.snapshot.phase = CountdownPhase::CountingDown;
        context.status = CountdownApplyStatus::Applied;
        context.actions.push(CountdownAction::Started {
            source: trigger.source,
            remaining,
        });
    }

    fn begin_dispatch(&mut self, context: &mut DispatchContext, source: TriggerSource) {
        self.snapshot.active = None;
        self.snapshot.dispatch_source = Some(source);
        self.snapshot.phase = CountdownPhase::Dispatching;
        context.status = CountdownApplyStatus::Applied;
        context.actions.push(CountdownAction::Dispatch { source });
    }

    fn return_to_idle(&mut self) {
        self.snapshot.active = None;
        self.snapshot.dispatch_source = None;
        self.snapshot.phase = CountdownPhase::Idle;
    }
}

#[state_machine(initial = "State::idle()")]
impl CountdownMachine {
    #[state(superstate = "running")]
    fn idle(&mut self, context: &mut DispatchContext, event: &CountdownCommand) -> Outcome<State> {
        match event {
            CountdownCommand::Trigger(trigger) => {
                if !self.snapshot.policy.enabled {
                    self.begin_dispatch(context, trigger.source);
                    return Transition(State::dispatching());
                }
                self.arm(context, *trigger);
                Transition(State::counting_down())
            }
            CountdownCommand::Tick | CountdownCommand::Cancel => {
                context.status = CountdownApplyStatus::Unchanged;
                Handled
            }
            CountdownCommand::DispatchFinished => {
                context.status = CountdownApplyStatus::InvalidTransition;
                Handled
            }
            CountdownCommand::SetPolicy(_) => Super,
        }
    }

    #[state(superstate = "running")]
    fn counting_down(
        &mut self,
        context: &mut DispatchContext,
        event: &CountdownCommand,
    ) -> Outcome<State> {
        let Some(mut active) = self.snapshot.active else {
            self.return_to_idle();
            context.status = CountdownApplyStatus::InvalidTransition;
            return Transition(State::idle());
        };

        match event {
            CountdownCommand::Trigger(trigger) => {
                context.status = CountdownApplyStatus::Unchanged;
                context.actions.push(CountdownAction::Ignored {
                    source: trigger.source,
                });
                Handled
            }
            CountdownCommand::Tick => {
                active.remaining_seconds = active.remaining_seconds.saturating_sub(1);
                if active.remaining_seconds > 0 {
                    self.snapshot.active = Some(active);
                    context.status = CountdownApplyStatus::Applied;
                    context.actions.push(CountdownAction::Tick {
                        remaining: active.remaining_seconds,
                    });
                    return Handled;
                }
                self.begin_dispatch(context, active.trigger_source);
                Transition(State::dispatching())
            }
            CountdownCommand::Cancel => {
                self.return_to_idle();
                context.status = CountdownApplyStatus::Applied;
                context.actions.push(CountdownAction::Cancelled {
                    source: active.trigger_source,
                    remaining: active.remaining_seconds,
                });
                Transition(State::idle())
            }
            CountdownCommand::DispatchFinished => {
                context.status = CountdownApplyStatus::InvalidTransition;
                Handled
            }
            CountdownCommand::SetPolicy(_) => Super,
        }
    }

    #[state(superstate = "running")]
    fn dispatching(
        &mut self,
        context: &mut DispatchContext,
        event: &CountdownCommand,
    ) -> Outcome<State> {
        match event {
            CountdownCommand::DispatchFinished => {
                self.return_to_idle();
                context.status = CountdownApplyStatus::Applied;
                Transition(State::idle())
            }
            CountdownCommand::Trigger(trigger) => {
                context.status = CountdownApplyStatus::Unchanged;
                context.actions.push(CountdownAction::Ignored {
                    source: trigger.source,
                });
                Handled
            }
            CountdownCommand::Tick | CountdownCommand::Cancel => {
                context.status = CountdownApplyStatus::Unchanged;
                Handled
            }
            CountdownCommand::SetPolicy(_) => Super,
        }
    }

    #[superstate]
    fn running(&mut self, context: &mut DispatchContext, event: &CountdownCommand) -> Outcome<State> {
        if let CountdownCommand::SetPolicy(policy) = event {
            context.status = if self.snapshot.policy == *policy {
                CountdownApplyStatus::Unchanged
            } else {
                self.snapshot.policy = *policy;
                CountdownApplyStatus::Applied
            };
        }
        Handled
    }
}
