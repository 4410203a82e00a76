use crate::trigger::TriggerSource;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CountdownApplyStatus {
    Applied,
    Unchanged,
    InvalidTransition,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CountdownAction {
    Started { source: TriggerSource, remaining: u32 },
    Tick { remaining: u32 },
    Ignored { source: TriggerSource },
    Cancelled { source: TriggerSource, remaining: u32 },
    Dispatch { source: TriggerSource },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActionBuffer {
    len: usize,
    slots: [Option<CountdownAction>; Self::MAX],
}

impl ActionBuffer {
    pub const MAX: usize = 4;

    pub const fn new() -> Self {
        Self {
            len: 0,
            slots: [None; Self::MAX],
        }
    }

    pub fn push(&mut self, action: CountdownAction) {
        if self.len >= Self::MAX {
            return;
        }
        self.slots[self.len] = Some(action);
        self.len += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountdownAction> {
        self.slots[..self.len].iter().filter_map(Option::as_ref)
    }

    pub fn dispatch_source(&self) -> Option<TriggerSource> {
        self.iter().find_map(|action| match action {
            CountdownAction::Dispatch { source } => Some(*source),
            _ => None,
        })
    }
}

impl Default for ActionBuffer {
    fn default() -> Self {
        Self::new()
    }
}
