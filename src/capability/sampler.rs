use std::{thread, time::Duration};

use crate::{
    error::{Feature, SensorError},
    runtime::input::{EngineInput, InputSink},
    trigger::{active_config, MotionSample},
};

use super::worker::{ProducerWorker, RunFlag};

/// Raw 3-axis accelerometer access. `read` returns `Ok(None)` when no new
/// reading is available this cycle.
pub trait MotionSource: Send + 'static {
    fn open(&mut self) -> Result<(), SensorError>;
    fn read(&mut self) -> Result<Option<(f64, f64, f64)>, SensorError>;
    fn close(&mut self);
}

pub trait Sampler: Send {
    /// Idempotent while already running.
    fn start(&mut self, sink: InputSink, generation: u64) -> Result<(), SensorError>;
    /// Joins the producer; nothing is sent by it once this returns.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Polls a [`MotionSource`] on its own thread at a fixed cadence.
pub struct ThreadedSampler<S: MotionSource> {
    source: Option<S>,
    interval: Duration,
    stack_size: Option<usize>,
    worker: Option<ProducerWorker<S>>,
}

impl<S: MotionSource> ThreadedSampler<S> {
    pub fn new(source: S) -> Self {
        Self::with_interval(
            source,
            Duration::from_millis(active_config().shake.sample_interval_ms),
        )
    }

    pub fn with_interval(source: S, interval: Duration) -> Self {
        Self {
            source: Some(source),
            interval,
            stack_size: None,
            worker: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_stack_size(&mut self, bytes: Option<usize>) {
        self.stack_size = bytes;
    }
}

impl<S: MotionSource> Sampler for ThreadedSampler<S> {
    fn start(&mut self, sink: InputSink, generation: u64) -> Result<(), SensorError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let mut source = self
            .source
            .take()
            .ok_or_else(|| SensorError::Unavailable("motion source lost".to_string()))?;

        if let Err(err) = source.open() {
            self.source = Some(source);
            return Err(err);
        }

        let interval = self.interval;
        let body = move |mut source: S, running: RunFlag| {
            while running.is_set() {
                match source.read() {
                    Ok(Some((x, y, z))) => {
                        let sample = MotionSample::new(x, y, z, sink.now_ms());
                        if !sink.send(EngineInput::Motion { generation, sample }) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        log::warn!("motion source failed: {err}");
                        let _ = sink.send(EngineInput::SourceFailed {
                            feature: Feature::Shake,
                            generation,
                            reason: err.to_string(),
                        });
                        break;
                    }
                }
                thread::park_timeout(interval);
            }
            source.close();
            source
        };
        let worker = match ProducerWorker::spawn("sos-sampler", self.stack_size, source, body) {
            Ok(worker) => worker,
            Err(failure) => {
                if let Some(mut source) = failure.resource {
                    source.close();
                    self.source = Some(source);
                }
                return Err(failure.error.into());
            }
        };

        log::info!("shake sampler started (generation {generation})");
        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        match worker.stop() {
            Some(source) => self.source = Some(source),
            None => log::error!("shake sampler thread panicked; source dropped"),
        }
        log::info!("shake sampler stopped");
    }

    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }
}

/// Stand-in for platforms without an accelerometer.
pub struct UnavailableSampler;

impl Sampler for UnavailableSampler {
    fn start(&mut self, _sink: InputSink, _generation: u64) -> Result<(), SensorError> {
        Err(SensorError::Unavailable("no accelerometer".to_string()))
    }

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }
}
