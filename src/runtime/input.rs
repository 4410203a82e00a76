use std::{
    sync::mpsc::{self, Receiver, Sender},
    time::Instant,
};

use crate::{
    error::Feature,
    trigger::{MotionSample, TranscriptFragment},
};

/// Everything a producer can tell the reactor. `generation` identifies the
/// producer run that sent it so inputs from a stopped run can be dropped.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineInput {
    Motion {
        generation: u64,
        sample: MotionSample,
    },
    Transcript {
        generation: u64,
        fragment: TranscriptFragment,
        at_ms: u64,
    },
    Button {
        generation: u64,
        at_ms: u64,
    },
    SourceFailed {
        feature: Feature,
        generation: u64,
        reason: String,
    },
}

/// Producer end of the reactor queue, sharing the engine clock.
#[derive(Clone)]
pub struct InputSink {
    tx: Sender<EngineInput>,
    epoch: Instant,
}

impl InputSink {
    /// Returns `false` once the engine is gone.
    pub fn send(&self, input: EngineInput) -> bool {
        self.tx.send(input).is_ok()
    }

    pub fn now_ms(&self) -> u64 {
        self.ms_at(Instant::now())
    }

    pub fn ms_at(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.epoch).as_millis() as u64
    }
}

pub(crate) fn input_channel(epoch: Instant) -> (InputSink, Receiver<EngineInput>) {
    let (tx, rx) = mpsc::channel();
    (InputSink { tx, epoch }, rx)
}

/// Handed to the trigger surface; pressing it queues a button trigger.
#[derive(Clone)]
pub struct ButtonHandle {
    sink: InputSink,
    generation: u64,
}

impl ButtonHandle {
    pub(crate) fn new(sink: InputSink, generation: u64) -> Self {
        Self { sink, generation }
    }

    pub fn press(&self) -> bool {
        self.sink.send(EngineInput::Button {
            generation: self.generation,
            at_ms: self.sink.now_ms(),
        })
    }
}
