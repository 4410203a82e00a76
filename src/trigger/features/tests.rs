use super::*;

fn cfg() -> ShakeConfig {
    ShakeConfig {
        required_consecutive: 2,
        threshold_base: 15.0,
        threshold_step: 1.2,
        threshold_floor: 2.0,
        sample_interval_ms: 100,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn max_sensitivity_maps_to_three() {
    assert!(approx(shake_threshold(10, &cfg()), 3.0));
}

#[test]
fn min_sensitivity_maps_to_thirteen_point_eight() {
    assert!(approx(shake_threshold(1, &cfg()), 13.8));
}

#[test]
fn threshold_is_monotonic_and_floored() {
    let config = ShakeConfig {
        threshold_step: 3.0,
        ..cfg()
    };
    let mut last = f64::MAX;
    for sensitivity in 1..=10 {
        let threshold = shake_threshold(sensitivity, &config);
        assert!(threshold <= last);
        assert!(threshold >= config.threshold_floor);
        last = threshold;
    }
    assert!(approx(shake_threshold(10, &config), 2.0));
}

#[test]
fn delta_magnitude_is_euclidean() {
    let prev = MotionSample::new(1.0, 1.0, 1.0, 0);
    let current = MotionSample::new(4.0, 5.0, 1.0, 100);
    assert!(approx(delta_magnitude(&prev, &current), 5.0));
}

#[test]
fn identical_samples_have_zero_delta() {
    let sample = MotionSample::new(0.3, -9.8, 0.1, 0);
    assert_eq!(delta_magnitude(&sample, &sample), 0.0);
}

#[test]
fn phrase_match_is_case_insensitive_substring() {
    assert!(phrase_matches("Please HELP ME now", "help me"));
    assert!(phrase_matches("help me", "help me"));
    assert!(!phrase_matches("helpme", "help me"));
    assert!(!phrase_matches("anything", ""));
}
