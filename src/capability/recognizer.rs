use std::time::Duration;

use crate::{
    error::{Feature, SensorError},
    runtime::input::{EngineInput, InputSink},
    trigger::{active_config, TranscriptFragment},
};

use super::worker::{ProducerWorker, RunFlag};

/// Streaming speech-to-text. `next_fragment` blocks for at most `timeout`
/// and returns `Ok(None)` when nothing was recognized in that window.
pub trait SpeechBackend: Send + 'static {
    fn open(&mut self, phrase_hint: &str) -> Result<(), SensorError>;
    fn next_fragment(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TranscriptFragment>, SensorError>;
    fn close(&mut self);
}

pub trait Recognizer: Send {
    fn start(
        &mut self,
        phrase_hint: &str,
        sink: InputSink,
        generation: u64,
    ) -> Result<(), SensorError>;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

pub struct ThreadedRecognizer<B: SpeechBackend> {
    backend: Option<B>,
    read_timeout: Duration,
    stack_size: Option<usize>,
    worker: Option<ProducerWorker<B>>,
}

impl<B: SpeechBackend> ThreadedRecognizer<B> {
    pub fn new(backend: B) -> Self {
        Self::with_read_timeout(
            backend,
            Duration::from_millis(active_config().voice.read_timeout_ms),
        )
    }

    pub fn with_read_timeout(backend: B, read_timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            read_timeout,
            stack_size: None,
            worker: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_stack_size(&mut self, bytes: Option<usize>) {
        self.stack_size = bytes;
    }
}

impl<B: SpeechBackend> Recognizer for ThreadedRecognizer<B> {
    fn start(
        &mut self,
        phrase_hint: &str,
        sink: InputSink,
        generation: u64,
    ) -> Result<(), SensorError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let mut backend = self
            .backend
            .take()
            .ok_or_else(|| SensorError::Unavailable("speech backend lost".to_string()))?;

        if let Err(err) = backend.open(phrase_hint) {
            self.backend = Some(backend);
            return Err(err);
        }

        let timeout = self.read_timeout;
        let body = move |mut backend: B, running: RunFlag| {
            while running.is_set() {
                match backend.next_fragment(timeout) {
                    Ok(Some(fragment)) => {
                        let input = EngineInput::Transcript {
                            generation,
                            at_ms: sink.now_ms(),
                            fragment,
                        };
                        if !sink.send(input) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        log::warn!("speech backend failed: {err}");
                        let _ = sink.send(EngineInput::SourceFailed {
                            feature: Feature::Voice,
                            generation,
                            reason: err.to_string(),
                        });
                        break;
                    }
                }
            }
            backend.close();
            backend
        };
        let worker = match ProducerWorker::spawn("sos-recognizer", self.stack_size, backend, body) {
            Ok(worker) => worker,
            Err(failure) => {
                if let Some(mut backend) = failure.resource {
                    backend.close();
                    self.backend = Some(backend);
                }
                return Err(failure.error.into());
            }
        };

        log::info!("voice recognizer started for {phrase_hint:?} (generation {generation})");
        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        match worker.stop() {
            Some(backend) => self.backend = Some(backend),
            None => log::error!("voice recognizer thread panicked; backend dropped"),
        }
        log::info!("voice recognizer stopped");
    }

    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }
}

pub struct UnavailableRecognizer;

impl Recognizer for UnavailableRecognizer {
    fn start(
        &mut self,
        _phrase_hint: &str,
        _sink: InputSink,
        _generation: u64,
    ) -> Result<(), SensorError> {
        Err(SensorError::Unavailable("no speech backend".to_string()))
    }

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }
}
