use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
};

/// A background producer thread that hands its resource back on join.
pub(crate) struct ProducerWorker<T: Send + 'static> {
    running: Arc<AtomicBool>,
    handle: JoinHandle<Option<T>>,
}

/// The thread could not be created; the resource was never handed over.
pub(crate) struct SpawnFailure<T> {
    pub(crate) resource: Option<T>,
    pub(crate) error: io::Error,
}

impl<T: Send + 'static> ProducerWorker<T> {
    pub(crate) fn spawn<F>(
        name: &str,
        stack_size: Option<usize>,
        resource: T,
        body: F,
    ) -> Result<Self, SpawnFailure<T>>
    where
        F: FnOnce(T, RunFlag) -> T + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = RunFlag(Arc::clone(&running));
        let handoff = Arc::new(Mutex::new(Some(resource)));
        let slot = Arc::clone(&handoff);

        let mut builder = thread::Builder::new().name(name.to_string());
        if let Some(bytes) = stack_size {
            builder = builder.stack_size(bytes);
        }
        let spawned = builder.spawn(move || {
            let resource = slot.lock().ok()?.take()?;
            Some(body(resource, flag))
        });

        match spawned {
            Ok(handle) => Ok(Self { running, handle }),
            Err(error) => Err(SpawnFailure {
                resource: handoff.lock().ok().and_then(|mut slot| slot.take()),
                error,
            }),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Clears the run flag, wakes a parked producer and joins it.
    /// Returns `None` if the producer panicked.
    pub(crate) fn stop(self) -> Option<T> {
        self.running.store(false, Ordering::Release);
        self.handle.thread().unpark();
        self.handle.join().ok().flatten()
    }
}

#[derive(Clone)]
pub(crate) struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
