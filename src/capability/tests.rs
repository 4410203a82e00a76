use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crate::{
    error::{DeliveryError, Feature, SensorError},
    runtime::input::{input_channel, EngineInput},
    trigger::TranscriptFragment,
};

use super::*;

struct CountingSource {
    reads: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
    fail_after: Option<usize>,
}

impl MotionSource for CountingSource {
    fn open(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<Option<(f64, f64, f64)>, SensorError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| n >= limit) {
            return Err(SensorError::Failed("i2c nack".to_string()));
        }
        Ok(Some((n as f64, 0.0, 9.8)))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn counting_source(
    fail_after: Option<usize>,
) -> (CountingSource, Arc<AtomicUsize>, Arc<AtomicBool>) {
    let reads = Arc::new(AtomicUsize::new(0));
    let closed = Arc::new(AtomicBool::new(false));
    let source = CountingSource {
        reads: Arc::clone(&reads),
        closed: Arc::clone(&closed),
        fail_after,
    };
    (source, reads, closed)
}

#[test]
fn sampler_stop_joins_and_silences_producer() {
    let (source, reads, closed) = counting_source(None);
    let mut sampler = ThreadedSampler::with_interval(source, Duration::from_millis(5));
    let (sink, rx) = input_channel(Instant::now());

    sampler.start(sink.clone(), 7).expect("start");
    sampler.start(sink, 7).expect("second start is a no-op");
    let first = rx.recv_timeout(Duration::from_secs(2)).expect("sample");
    assert!(matches!(first, EngineInput::Motion { generation: 7, .. }));

    sampler.stop();
    assert!(!sampler.is_running());
    assert!(closed.load(Ordering::SeqCst));

    while rx.try_recv().is_ok() {}
    let reads_after_stop = reads.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(30));
    assert!(rx.try_recv().is_err());
    assert_eq!(reads.load(Ordering::SeqCst), reads_after_stop);
}

#[test]
fn sampler_reports_runtime_failure() {
    let (source, _, closed) = counting_source(Some(2));
    let mut sampler = ThreadedSampler::with_interval(source, Duration::from_millis(1));
    let (sink, rx) = input_channel(Instant::now());
    sampler.start(sink, 3).expect("start");

    let failure = loop {
        match rx.recv_timeout(Duration::from_secs(2)).expect("input") {
            EngineInput::SourceFailed {
                feature,
                generation,
                ..
            } => break (feature, generation),
            EngineInput::Motion { .. } => continue,
            other => panic!("unexpected {other:?}"),
        }
    };
    assert_eq!(failure, (Feature::Shake, 3));

    sampler.stop();
    assert!(closed.load(Ordering::SeqCst));
}

/// Far beyond any address space, so thread creation is refused.
const UNSPAWNABLE_STACK: usize = usize::MAX / 2;

#[test]
fn sampler_spawn_failure_closes_source_and_keeps_it_for_retry() {
    let (source, reads, closed) = counting_source(None);
    let mut sampler = ThreadedSampler::with_interval(source, Duration::from_millis(5));
    sampler.set_stack_size(Some(UNSPAWNABLE_STACK));
    let (sink, rx) = input_channel(Instant::now());

    let err = sampler.start(sink.clone(), 1).expect_err("no thread");
    assert!(matches!(err, SensorError::Io(_)));
    assert!(closed.load(Ordering::SeqCst));
    assert!(!sampler.is_running());
    assert_eq!(reads.load(Ordering::SeqCst), 0);

    sampler.set_stack_size(None);
    sampler.start(sink, 2).expect("source survived the failed spawn");
    let first = rx.recv_timeout(Duration::from_secs(2)).expect("sample");
    assert!(matches!(first, EngineInput::Motion { generation: 2, .. }));
    sampler.stop();
}

struct EchoBackend {
    closes: Arc<AtomicUsize>,
}

impl SpeechBackend for EchoBackend {
    fn open(&mut self, _phrase_hint: &str) -> Result<(), SensorError> {
        Ok(())
    }

    fn next_fragment(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TranscriptFragment>, SensorError> {
        std::thread::sleep(timeout);
        Ok(Some(TranscriptFragment::final_text("help me")))
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn recognizer_spawn_failure_closes_backend_and_keeps_it_for_retry() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut recognizer = ThreadedRecognizer::with_read_timeout(
        EchoBackend {
            closes: Arc::clone(&closes),
        },
        Duration::from_millis(5),
    );
    recognizer.set_stack_size(Some(UNSPAWNABLE_STACK));
    let (sink, rx) = input_channel(Instant::now());

    assert!(recognizer.start("help me", sink.clone(), 1).is_err());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert!(!recognizer.is_running());

    recognizer.set_stack_size(None);
    recognizer
        .start("help me", sink, 2)
        .expect("backend survived the failed spawn");
    let heard = rx.recv_timeout(Duration::from_secs(2)).expect("fragment");
    assert!(matches!(heard, EngineInput::Transcript { generation: 2, .. }));
    recognizer.stop();
    assert_eq!(closes.load(Ordering::SeqCst), 2);
}

struct DeafBackend;

impl SpeechBackend for DeafBackend {
    fn open(&mut self, _phrase_hint: &str) -> Result<(), SensorError> {
        Err(SensorError::Unavailable("microphone busy".to_string()))
    }

    fn next_fragment(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<TranscriptFragment>, SensorError> {
        Ok(None)
    }

    fn close(&mut self) {}
}

#[test]
fn recognizer_start_fails_cleanly_and_can_retry() {
    let mut recognizer = ThreadedRecognizer::new(DeafBackend);
    let (sink, _rx) = input_channel(Instant::now());
    let err = recognizer
        .start("help me", sink.clone(), 1)
        .expect_err("backend is down");
    assert!(err.to_string().contains("microphone busy"));
    assert!(!recognizer.is_running());

    // The backend is kept, so a retry reaches it again.
    assert!(recognizer.start("help me", sink, 2).is_err());
}

#[test]
fn unavailable_variants_refuse_to_start() {
    let (sink, _rx) = input_channel(Instant::now());
    assert!(UnavailableSampler.start(sink.clone(), 1).is_err());
    assert!(UnavailableRecognizer.start("x", sink, 1).is_err());
}

struct Recorder {
    sent: Vec<String>,
}

impl MessageSender for Recorder {
    fn send(&mut self, phone: &str, _message: &str) -> Result<(), DeliveryError> {
        if phone == "+2" {
            return Err(DeliveryError {
                phone: phone.to_string(),
                reason: "no signal".to_string(),
            });
        }
        self.sent.push(phone.to_string());
        Ok(())
    }
}

#[test]
fn dispatcher_continues_past_failures_and_skips_blank_numbers() {
    let mut dispatcher = SmsDispatcher::new(Recorder { sent: Vec::new() });
    let contacts = vec![
        Contact::new("a", "+1", ["x"]),
        Contact::new("b", "+2", ["x"]),
        Contact::new("c", "  ", ["x"]),
        Contact::new("d", "+4", ["x"]),
    ];
    let report = dispatcher.dispatch("EMERGENCY!", &contacts);

    assert_eq!(report.delivered_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(
        report.failures().map(|entry| entry.name.as_str()).collect::<Vec<_>>(),
        vec!["b"]
    );
    assert_eq!(dispatcher.sender().sent, vec!["+1", "+4"]);
}

#[test]
fn recipients_filter_by_category() {
    let contacts = vec![
        Contact::new("a", "+1", ["Family"]),
        Contact::new("b", "+2", ["Work"]),
    ];
    assert_eq!(select_recipients(contacts.clone(), None).len(), 2);
    let family = select_recipients(contacts, Some("Family"));
    assert_eq!(family.len(), 1);
    assert_eq!(family[0].name, "a");
}

#[test]
fn cached_location_uses_fallback_only_without_a_fix() {
    let healthy = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&healthy);
    let provider = CachedLocationProvider::with_fallback(
        move || {
            if flag.load(Ordering::SeqCst) {
                Ok(Location::new(1.5, 2.5))
            } else {
                Err(SensorError::Unavailable("offline".to_string()))
            }
        },
        Some(Location::new(9.0, 9.0)),
    );
    assert_eq!(provider.current(), Location::unknown());

    provider.refresh_now();
    assert_eq!(provider.current(), Location::new(9.0, 9.0));

    healthy.store(true, Ordering::SeqCst);
    provider.refresh_now();
    assert_eq!(provider.current(), Location::new(1.5, 2.5));

    healthy.store(false, Ordering::SeqCst);
    provider.refresh_now();
    assert_eq!(provider.current(), Location::new(1.5, 2.5));
}

#[test]
fn background_refresh_eventually_updates_cache() {
    let provider = CachedLocationProvider::new(|| Ok::<_, SensorError>(Location::new(3.0, 4.0)));
    provider.refresh();

    let deadline = Instant::now() + Duration::from_secs(2);
    while provider.current().coordinates().is_none() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(provider.current().coordinates(), Some((3.0, 4.0)));
}

#[test]
fn detached_surface_presses_only_while_registered() {
    let (sink, rx) = input_channel(Instant::now());
    let mut surface = DetachedSurface::default();
    assert!(!surface.press());

    surface
        .register_trigger_surface(80, crate::runtime::ButtonHandle::new(sink, 1))
        .expect("register");
    assert_eq!(surface.size(), Some(80));
    assert!(surface.press());
    assert!(matches!(
        rx.try_recv(),
        Ok(EngineInput::Button { generation: 1, .. })
    ));

    surface.unregister_trigger_surface();
    assert!(!surface.press());
}
