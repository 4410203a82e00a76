use super::{
    config::{active_config, EngineConfig, ShakeConfig},
    features::{delta_magnitude, phrase_matches},
    trace::DebounceTrace,
    types::{
        DebouncePolicy, MotionSample, RejectReason, TranscriptFragment, TriggerEvent,
        TriggerSource,
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebounceOutput {
    pub trigger: Option<TriggerEvent>,
    pub trace: DebounceTrace,
}

/// Turns raw motion samples and transcripts into logical trigger events.
///
/// Shake needs `required_consecutive` above-threshold deltas in a row; any
/// quiet sample in between resets the run. Voice fires on every fragment that
/// contains the phrase. Disabled channels drop their input without touching
/// any debounce state.
pub struct TriggerDebouncer {
    config: &'static ShakeConfig,
    policy: DebouncePolicy,
    prev_sample: Option<MotionSample>,
    consecutive_hits: u8,
    last_trace: DebounceTrace,
}

impl Default for TriggerDebouncer {
    fn default() -> Self {
        Self::new(active_config())
    }
}

impl TriggerDebouncer {
    pub fn new(config: &'static EngineConfig) -> Self {
        Self {
            config: &config.shake,
            policy: DebouncePolicy {
                shake_enabled: false,
                shake_threshold: config.shake.threshold_base,
                voice_enabled: false,
                phrase: config.voice.default_phrase.to_string(),
            },
            prev_sample: None,
            consecutive_hits: 0,
            last_trace: DebounceTrace::default(),
        }
    }

    pub fn policy(&self) -> &DebouncePolicy {
        &self.policy
    }

    pub fn configure(&mut self, policy: DebouncePolicy) {
        let shake_rearmed = policy.shake_enabled && !self.policy.shake_enabled;
        if shake_rearmed || !policy.shake_enabled {
            self.clear_shake();
        }
        self.policy = policy;
    }

    pub fn clear_shake(&mut self) {
        self.prev_sample = None;
        self.consecutive_hits = 0;
    }

    pub fn feed_motion(&mut self, sample: MotionSample) -> DebounceOutput {
        if !self.policy.shake_enabled {
            return self.reject(TriggerSource::Shake, sample.at_ms, RejectReason::Disabled);
        }

        let Some(prev) = self.prev_sample.replace(sample) else {
            return self.reject(TriggerSource::Shake, sample.at_ms, RejectReason::FirstSample);
        };

        let magnitude = delta_magnitude(&prev, &sample);
        let threshold = self.policy.shake_threshold;
        let mut trigger = None;
        let reject_reason = if magnitude > threshold {
            self.consecutive_hits = self.consecutive_hits.saturating_add(1);
            if self.consecutive_hits >= self.config.required_consecutive {
                self.consecutive_hits = 0;
                trigger = Some(TriggerEvent::new(TriggerSource::Shake, sample.at_ms));
                RejectReason::None
            } else {
                RejectReason::Accumulating
            }
        } else {
            self.consecutive_hits = 0;
            RejectReason::BelowThreshold
        };

        self.last_trace = DebounceTrace {
            now_ms: sample.at_ms,
            source: Some(TriggerSource::Shake),
            reject_reason,
            magnitude,
            threshold,
            consecutive_hits: self.consecutive_hits,
        };
        self.finish(trigger)
    }

    pub fn feed_transcript(&mut self, fragment: &TranscriptFragment, now_ms: u64) -> DebounceOutput {
        if !self.policy.voice_enabled {
            return self.reject(TriggerSource::Voice, now_ms, RejectReason::Disabled);
        }

        if !phrase_matches(&fragment.text, &self.policy.phrase) {
            return self.reject(TriggerSource::Voice, now_ms, RejectReason::PhraseMissing);
        }

        self.last_trace = DebounceTrace {
            now_ms,
            source: Some(TriggerSource::Voice),
            ..DebounceTrace::default()
        };
        self.finish(Some(TriggerEvent::new(TriggerSource::Voice, now_ms)))
    }

    pub fn manual_trigger(&mut self, now_ms: u64) -> DebounceOutput {
        self.last_trace = DebounceTrace {
            now_ms,
            source: Some(TriggerSource::Button),
            ..DebounceTrace::default()
        };
        self.finish(Some(TriggerEvent::new(TriggerSource::Button, now_ms)))
    }

    fn reject(&mut self, source: TriggerSource, now_ms: u64, reason: RejectReason) -> DebounceOutput {
        self.last_trace = DebounceTrace {
            now_ms,
            source: Some(source),
            reject_reason: reason,
            threshold: self.policy.shake_threshold,
            consecutive_hits: self.consecutive_hits,
            ..DebounceTrace::default()
        };
        self.finish(None)
    }

    fn finish(&self, trigger: Option<TriggerEvent>) -> DebounceOutput {
        DebounceOutput {
            trigger,
            trace: self.last_trace,
        }
    }
}
