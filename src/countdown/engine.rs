use statig::blocking::IntoStateMachineExt as _;

use super::actions::{ActionBuffer, CountdownApplyStatus};
use super::events::CountdownCommand;
use super::machine::{CountdownMachine, DispatchContext};
use super::snapshot::{CountdownPhase, CountdownPolicy, CountdownSnapshot};

#[derive(Clone, Copy, Debug)]
pub struct CountdownApplyResult {
    pub before: CountdownSnapshot,
    pub after: CountdownSnapshot,
    pub status: CountdownApplyStatus,
    pub actions: ActionBuffer,
}

impl CountdownApplyResult {
    pub fn changed(self) -> bool {
        matches!(self.status, CountdownApplyStatus::Applied)
    }

    pub fn entered_dispatch(self) -> bool {
        !matches!(self.before.phase, CountdownPhase::Dispatching)
            && matches!(self.after.phase, CountdownPhase::Dispatching)
    }

    pub fn countdown_started(self) -> bool {
        matches!(self.before.phase, CountdownPhase::Idle)
            && matches!(self.after.phase, CountdownPhase::CountingDown)
    }
}

/// Owns the single in-flight countdown. Pure data transitions, no I/O.
pub struct CountdownEngine {
    machine: statig::blocking::StateMachine<CountdownMachine>,
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new(CountdownPolicy::default())
    }
}

impl CountdownEngine {
    pub fn new(policy: CountdownPolicy) -> Self {
        Self {
            machine: CountdownMachine::new(CountdownSnapshot::with_policy(policy)).state_machine(),
        }
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        self.machine.inner().snapshot
    }

    pub fn apply(&mut self, command: CountdownCommand) -> CountdownApplyResult {
        let before = self.snapshot();
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&command, &mut context);
        let after = self.snapshot();
        CountdownApplyResult {
            before,
            after,
            status: context.status,
            actions: context.actions,
        }
    }
}
