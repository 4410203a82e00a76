use super::{config::ShakeConfig, types::MotionSample};

/// Euclidean length of the acceleration change between two samples.
pub fn delta_magnitude(prev: &MotionSample, current: &MotionSample) -> f64 {
    let dx = current.x - prev.x;
    let dy = current.y - prev.y;
    let dz = current.z - prev.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Higher sensitivity yields a lower threshold, never below the configured floor.
pub fn shake_threshold(sensitivity: u8, cfg: &ShakeConfig) -> f64 {
    let raw = cfg.threshold_base - f64::from(sensitivity) * cfg.threshold_step;
    raw.max(cfg.threshold_floor)
}

pub fn phrase_matches(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    text.to_lowercase().contains(phrase)
}

#[cfg(test)]
mod tests;
