use std::{collections::VecDeque, path::Path, thread, time::Duration};

use anyhow::{anyhow, Context, Result};
use sosguard::{
    capability::{MotionSource, SpeechBackend},
    error::SensorError,
    trigger::TranscriptFragment,
};

/// Parses `x,y,z` lines. Blank lines, `#` comments and an `x,y,z` header
/// are skipped.
pub fn parse_motion_csv(raw: &str) -> Result<Vec<(f64, f64, f64)>> {
    let mut samples = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.eq_ignore_ascii_case("x,y,z") {
            continue;
        }
        let fields = line
            .split(',')
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("line {}: `{line}` is not numeric", index + 1))?;
        let [x, y, z] = fields[..] else {
            return Err(anyhow!("line {}: expected 3 fields, got {}", index + 1, fields.len()));
        };
        samples.push((x, y, z));
    }
    Ok(samples)
}

/// Non-empty, non-comment lines in order.
pub fn parse_transcript(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_motion(path: &Path) -> Result<Vec<(f64, f64, f64)>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read motion file {}", path.display()))?;
    parse_motion_csv(&raw).with_context(|| format!("parse motion file {}", path.display()))
}

pub fn load_transcript(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read transcript file {}", path.display()))?;
    Ok(parse_transcript(&raw))
}

/// Plays recorded readings back once, then goes quiet.
pub struct ReplayMotion {
    pending: VecDeque<(f64, f64, f64)>,
}

impl ReplayMotion {
    pub fn new(samples: Vec<(f64, f64, f64)>) -> Self {
        Self {
            pending: samples.into(),
        }
    }
}

impl MotionSource for ReplayMotion {
    fn open(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<Option<(f64, f64, f64)>, SensorError> {
        Ok(self.pending.pop_front())
    }

    fn close(&mut self) {}
}

/// Emits one recorded line per read window as a final transcript.
pub struct ReplaySpeech {
    pending: VecDeque<String>,
}

impl ReplaySpeech {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            pending: lines.into(),
        }
    }
}

impl SpeechBackend for ReplaySpeech {
    fn open(&mut self, phrase_hint: &str) -> Result<(), SensorError> {
        log::debug!("replaying transcript, listening for {phrase_hint:?}");
        Ok(())
    }

    fn next_fragment(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TranscriptFragment>, SensorError> {
        thread::sleep(timeout);
        Ok(self.pending.pop_front().map(TranscriptFragment::final_text))
    }

    fn close(&mut self) {}
}
