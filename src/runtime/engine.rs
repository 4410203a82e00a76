use std::{
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

use crate::{
    capability::{select_recipients, Capabilities},
    countdown::{
        CountdownAction, CountdownApplyStatus, CountdownCommand, CountdownEngine, CountdownPhase,
        CountdownSnapshot,
    },
    error::{Feature, SosError},
    settings::Settings,
    trigger::{
        active_config, DebounceOutput, DebouncePolicy, TriggerDebouncer, TriggerEvent,
        TriggerSource,
    },
};

use super::{
    input::{input_channel, ButtonHandle, EngineInput, InputSink},
    message::{compose_alert_message, notification_title},
    observer::{DispatchOutcome, EngineEvent, EngineObserver},
};

/// Upper bound on one reactor wait so the stop predicate is rechecked.
const IDLE_WAIT: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, Default)]
struct ProducerSlot {
    active: bool,
    generation: u64,
}

impl ProducerSlot {
    fn accepts(&self, generation: u64) -> bool {
        self.active && self.generation == generation
    }

    fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

/// What one `apply_settings` call changed, plus anything that failed.
#[derive(Debug, Default)]
pub struct SettingsApplyReport {
    pub started: Vec<Feature>,
    pub stopped: Vec<Feature>,
    pub countdown_cancelled: bool,
    pub phrase_saved: bool,
    pub errors: Vec<SosError>,
}

impl SettingsApplyReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn changed_anything(&self) -> bool {
        !self.started.is_empty()
            || !self.stopped.is_empty()
            || self.countdown_cancelled
            || self.phrase_saved
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub countdown: CountdownSnapshot,
    pub shake_active: bool,
    pub voice_active: bool,
    pub surface_size: Option<u16>,
}

/// Owns the debouncer, the countdown and every producer handle. All state
/// transitions happen on the thread that drives `poll`/`run_until`;
/// producers only ever talk to it through the input queue.
pub struct SosEngine {
    caps: Capabilities,
    settings: Settings,
    debouncer: TriggerDebouncer,
    countdown: CountdownEngine,
    sink: InputSink,
    inputs: Receiver<EngineInput>,
    shake: ProducerSlot,
    voice: ProducerSlot,
    voice_phrase: Option<String>,
    surface: ProducerSlot,
    surface_size: Option<u16>,
    stored_phrase: Option<String>,
    tick_interval: Duration,
    next_tick: Option<Instant>,
    observers: Vec<Box<dyn EngineObserver>>,
}

impl SosEngine {
    pub fn new(caps: Capabilities) -> Self {
        let (sink, inputs) = input_channel(Instant::now());
        let stored_phrase = match caps.phrase_store.load() {
            Ok(phrase) => phrase,
            Err(err) => {
                log::warn!("phrase store unreadable: {err}");
                None
            }
        };

        let mut settings = Settings::default();
        if let Some(phrase) = &stored_phrase {
            settings.voice_phrase = phrase.clone();
        }
        let settings = settings.sanitized();

        let cfg = active_config();
        let mut debouncer = TriggerDebouncer::new(cfg);
        debouncer.configure(DebouncePolicy {
            shake_enabled: false,
            voice_enabled: false,
            ..settings.debounce_policy()
        });

        caps.location.refresh();

        Self {
            countdown: CountdownEngine::new(settings.countdown_policy()),
            caps,
            settings,
            debouncer,
            sink,
            inputs,
            shake: ProducerSlot::default(),
            voice: ProducerSlot::default(),
            voice_phrase: None,
            surface: ProducerSlot::default(),
            surface_size: None,
            stored_phrase,
            tick_interval: Duration::from_millis(cfg.countdown.tick_interval_ms),
            next_tick: None,
            observers: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            countdown: self.countdown.snapshot(),
            shake_active: self.shake.active,
            voice_active: self.voice.active,
            surface_size: self.surface_size,
        }
    }

    pub fn subscribe(&mut self, observer: impl EngineObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Brings producers, the trigger surface and the countdown policy in line
    /// with `settings`. Repeating the same settings changes nothing.
    pub fn apply_settings(&mut self, settings: Settings) -> SettingsApplyReport {
        let settings = settings.sanitized();
        let mut report = SettingsApplyReport::default();

        self.reconcile_shake(&settings, &mut report);
        self.reconcile_voice(&settings, &mut report);
        self.persist_phrase(&settings.voice_phrase, &mut report);
        self.reconcile_surface(&settings, &mut report);

        if !settings.countdown_enabled
            && self.countdown.snapshot().phase == CountdownPhase::CountingDown
        {
            log::info!("countdown disabled while running; cancelling");
            self.apply_countdown(CountdownCommand::Cancel, Instant::now());
            report.countdown_cancelled = true;
        }
        let policy = self
            .countdown
            .apply(CountdownCommand::SetPolicy(settings.countdown_policy()));
        if policy.changed() {
            log::debug!(
                "countdown policy {:?} -> {:?}",
                policy.before.policy,
                policy.after.policy
            );
        }

        self.settings = settings;
        self.sync_debounce_policy();
        report
    }

    pub fn manual_trigger(&mut self) {
        let now = Instant::now();
        let output = self.debouncer.manual_trigger(self.sink.ms_at(now));
        self.on_debounced(output, now);
    }

    /// Returns `true` if a running countdown was cancelled.
    pub fn cancel(&mut self) -> bool {
        let result = self.apply_countdown(CountdownCommand::Cancel, Instant::now());
        result == CountdownApplyStatus::Applied
    }

    /// Applies one countdown tick right away and restarts the tick period.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self.next_tick.is_some() {
            self.next_tick = Some(now + self.tick_interval);
        }
        self.apply_countdown(CountdownCommand::Tick, now);
    }

    /// Drains queued inputs in arrival order, then fires every tick due by `now`.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut handled = 0;
        while let Ok(input) = self.inputs.try_recv() {
            self.handle_input(input, now);
            handled += 1;
        }
        self.fire_due_ticks(now);
        handled
    }

    /// Blocking reactor loop; returns once `stop` holds.
    pub fn run_until(&mut self, mut stop: impl FnMut(&Self) -> bool) {
        while !stop(self) {
            let now = Instant::now();
            self.fire_due_ticks(now);
            let wait = self
                .next_tick
                .map_or(IDLE_WAIT, |deadline| deadline.saturating_duration_since(now))
                .min(IDLE_WAIT);
            match self.inputs.recv_timeout(wait) {
                Ok(input) => {
                    self.handle_input(input, Instant::now());
                    self.poll(Instant::now());
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// Stops every producer and removes the trigger surface.
    pub fn shutdown(&mut self) {
        if self.shake.active {
            self.caps.sampler.stop();
            self.shake.active = false;
        }
        if self.voice.active {
            self.caps.recognizer.stop();
            self.voice.active = false;
            self.voice_phrase = None;
        }
        if self.surface_size.take().is_some() {
            self.caps.surface.unregister_trigger_surface();
            self.surface.active = false;
        }
        self.sync_debounce_policy();
    }

    fn reconcile_shake(&mut self, settings: &Settings, report: &mut SettingsApplyReport) {
        match (settings.shake_enabled, self.shake.active) {
            (true, false) => {
                let generation = self.shake.next_generation();
                match self.caps.sampler.start(self.sink.clone(), generation) {
                    Ok(()) => {
                        self.shake.active = true;
                        self.debouncer.clear_shake();
                        report.started.push(Feature::Shake);
                    }
                    Err(err) => {
                        log::warn!("shake monitoring unavailable: {err}");
                        report.errors.push(SosError::sensor(Feature::Shake, &err));
                    }
                }
            }
            (false, true) => {
                self.caps.sampler.stop();
                self.shake.active = false;
                report.stopped.push(Feature::Shake);
            }
            _ => {}
        }
    }

    fn reconcile_voice(&mut self, settings: &Settings, report: &mut SettingsApplyReport) {
        let phrase_changed = self.voice_phrase.as_deref() != Some(settings.voice_phrase.as_str());
        if self.voice.active && (!settings.voice_enabled || phrase_changed) {
            self.caps.recognizer.stop();
            self.voice.active = false;
            self.voice_phrase = None;
            report.stopped.push(Feature::Voice);
        }

        if settings.voice_enabled && !self.voice.active {
            let generation = self.voice.next_generation();
            match self
                .caps
                .recognizer
                .start(&settings.voice_phrase, self.sink.clone(), generation)
            {
                Ok(()) => {
                    self.voice.active = true;
                    self.voice_phrase = Some(settings.voice_phrase.clone());
                    report.started.push(Feature::Voice);
                }
                Err(err) => {
                    log::warn!("voice listening unavailable: {err}");
                    report.errors.push(SosError::sensor(Feature::Voice, &err));
                }
            }
        }
    }

    fn persist_phrase(&mut self, phrase: &str, report: &mut SettingsApplyReport) {
        if self.stored_phrase.as_deref() == Some(phrase) {
            return;
        }
        match self.caps.phrase_store.save(phrase) {
            Ok(()) => {
                self.stored_phrase = Some(phrase.to_string());
                report.phrase_saved = true;
            }
            Err(err) => {
                log::warn!("could not persist voice phrase: {err}");
                report.errors.push(err.into());
            }
        }
    }

    fn reconcile_surface(&mut self, settings: &Settings, report: &mut SettingsApplyReport) {
        let desired = settings.floating_enabled.then_some(settings.button_size);
        if desired == self.surface_size {
            return;
        }

        if self.surface_size.take().is_some() {
            self.caps.surface.unregister_trigger_surface();
            self.surface.active = false;
            report.stopped.push(Feature::Overlay);
        }

        let Some(size) = desired else {
            return;
        };
        let generation = self.surface.next_generation();
        let handle = ButtonHandle::new(self.sink.clone(), generation);
        match self.caps.surface.register_trigger_surface(size, handle) {
            Ok(()) => {
                self.surface.active = true;
                self.surface_size = Some(size);
                report.started.push(Feature::Overlay);
            }
            Err(err) => {
                log::warn!("{err}");
                report.errors.push(err.into());
            }
        }
    }

    fn sync_debounce_policy(&mut self) {
        self.debouncer.configure(DebouncePolicy {
            shake_enabled: self.settings.shake_enabled && self.shake.active,
            voice_enabled: self.settings.voice_enabled && self.voice.active,
            ..self.settings.debounce_policy()
        });
    }

    fn handle_input(&mut self, input: EngineInput, now: Instant) {
        match input {
            EngineInput::Motion { generation, sample } => {
                if !self.shake.accepts(generation) {
                    log::trace!("dropping motion sample from stale generation {generation}");
                    return;
                }
                let output = self.debouncer.feed_motion(sample);
                self.on_debounced(output, now);
            }
            EngineInput::Transcript {
                generation,
                fragment,
                at_ms,
            } => {
                if !self.voice.accepts(generation) {
                    log::trace!("dropping transcript from stale generation {generation}");
                    return;
                }
                let output = self.debouncer.feed_transcript(&fragment, at_ms);
                self.on_debounced(output, now);
            }
            EngineInput::Button { generation, at_ms } => {
                if !self.surface.accepts(generation) {
                    log::debug!("ignoring press on an unregistered trigger surface");
                    return;
                }
                let output = self.debouncer.manual_trigger(at_ms);
                self.on_debounced(output, now);
            }
            EngineInput::SourceFailed {
                feature,
                generation,
                reason,
            } => self.on_source_failed(feature, generation, reason),
        }
    }

    fn on_source_failed(&mut self, feature: Feature, generation: u64, reason: String) {
        match feature {
            Feature::Shake if self.shake.accepts(generation) => {
                self.caps.sampler.stop();
                self.shake.active = false;
            }
            Feature::Voice if self.voice.accepts(generation) => {
                self.caps.recognizer.stop();
                self.voice.active = false;
                self.voice_phrase = None;
            }
            _ => return,
        }
        log::warn!("{feature} disabled: {reason}");
        self.sync_debounce_policy();
        self.emit(EngineEvent::SourceDisabled { feature, reason });
    }

    fn on_debounced(&mut self, output: DebounceOutput, now: Instant) {
        log::trace!("debounce {:?}", output.trace);
        if let Some(trigger) = output.trigger {
            self.on_trigger(trigger, now);
        }
    }

    fn on_trigger(&mut self, trigger: TriggerEvent, now: Instant) {
        self.apply_countdown(CountdownCommand::Trigger(trigger), now);
    }

    fn fire_due_ticks(&mut self, now: Instant) {
        while let Some(deadline) = self.next_tick {
            if now < deadline {
                break;
            }
            self.next_tick = Some(deadline + self.tick_interval);
            self.apply_countdown(CountdownCommand::Tick, now);
        }
    }

    fn apply_countdown(&mut self, command: CountdownCommand, now: Instant) -> CountdownApplyStatus {
        let result = self.countdown.apply(command);
        if result.status == CountdownApplyStatus::InvalidTransition {
            log::warn!("countdown rejected {command:?} in {:?}", result.before.phase);
        }

        for action in result.actions.iter().copied() {
            match action {
                CountdownAction::Started { source, remaining } => {
                    log::info!("{source} trigger accepted; alert in {remaining}s");
                    self.next_tick = Some(now + self.tick_interval);
                    self.caps.location.refresh();
                    self.emit(EngineEvent::TriggerAccepted { source });
                    self.emit(EngineEvent::CountdownStarted { source, remaining });
                }
                CountdownAction::Tick { remaining } => {
                    log::debug!("countdown {remaining}s");
                    self.emit(EngineEvent::CountdownTick { remaining });
                }
                CountdownAction::Ignored { source } => {
                    log::info!("{source} trigger ignored; alert already in flight");
                    self.emit(EngineEvent::TriggerIgnored { source });
                }
                CountdownAction::Cancelled { source, remaining } => {
                    log::info!("countdown cancelled with {remaining}s left");
                    self.next_tick = None;
                    self.emit(EngineEvent::CountdownCancelled { source, remaining });
                }
                CountdownAction::Dispatch { source } => {
                    self.next_tick = None;
                    if matches!(command, CountdownCommand::Trigger(_)) {
                        log::info!("{source} trigger accepted; countdown disabled");
                        self.emit(EngineEvent::TriggerAccepted { source });
                    }
                }
            }
        }

        if let Some(source) = result.actions.dispatch_source() {
            self.dispatch(source);
            self.apply_countdown(CountdownCommand::DispatchFinished, now);
        }
        result.status
    }

    fn dispatch(&mut self, source: TriggerSource) {
        let cfg = active_config();
        let location = self.caps.location.current();
        let recipients = select_recipients(
            self.caps.contacts.contacts(),
            self.settings.alert_category.as_deref(),
        );
        if recipients.is_empty() {
            log::warn!("no contacts to alert");
        }

        let message = compose_alert_message(source, &location, cfg.alert.map_url_prefix);
        let report = self.caps.dispatcher.dispatch(&message, &recipients);
        log::info!(
            "alert dispatched: {} delivered, {} failed, {} skipped",
            report.delivered_count(),
            report.failed_count(),
            report.skipped_count()
        );

        if let Err(err) = self
            .caps
            .notifications
            .notify(&notification_title(source), cfg.alert.notification_body)
        {
            log::warn!("{err}");
        }

        self.emit(EngineEvent::DispatchCompleted(DispatchOutcome {
            source,
            message,
            location,
            report,
        }));
    }

    fn emit(&mut self, event: EngineEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

impl Drop for SosEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
