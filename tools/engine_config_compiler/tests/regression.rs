use std::path::PathBuf;

use engine_config_compiler::{
    generate_from_path, parse_engine_file, parse_engine_str, render_generated_config,
    validate_config, ConfigCompilerError,
};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("missing tools dir")
        .parent()
        .expect("missing repo root")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn default_config_compiles() {
    let config = repo_root().join("config/engine.toml");
    let generated = generate_from_path(&config).expect("default config should compile");

    for needle in [
        "pub static ENGINE_CONFIG: EngineConfig = EngineConfig {",
        "required_consecutive: 2,",
        "threshold_base: 15.0,",
        "threshold_step: 1.2,",
        "threshold_floor: 2.0,",
        "default_phrase: \"help me\",",
        "tick_interval_ms: 1000,",
        "default_button_size: 80,",
        "map_url_prefix: \"https://maps.google.com/?q=\",",
    ] {
        assert!(
            generated.contains(needle),
            "generated output missing `{needle}`"
        );
    }
}

#[test]
fn generation_is_deterministic_for_same_input() {
    let config = fixture("valid_default.toml");
    let first = generate_from_path(&config).expect("first generation failed");
    let second = generate_from_path(&config).expect("second generation failed");
    assert_eq!(first, second);
}

#[test]
fn phrase_is_trimmed_and_lowercased_when_rendered() {
    let path = fixture("valid_custom.toml");
    let parsed = parse_engine_file(&path).expect("fixture should parse");
    validate_config(&parsed).expect("fixture should validate");
    let rendered = render_generated_config(&parsed);

    assert!(rendered.contains("default_phrase: \"call for help\","));
    assert!(rendered.contains("required_consecutive: 3,"));
}

#[test]
fn whole_number_floats_keep_a_decimal_point() {
    let raw = std::fs::read_to_string(fixture("valid_default.toml"))
        .expect("missing default fixture")
        .replace("threshold_base = 15.0", "threshold_base = 16");
    let parsed = parse_engine_str(&raw).expect("integer float should parse");
    let rendered = render_generated_config(&parsed);
    assert!(rendered.contains("threshold_base: 16.0,"));
}

#[test]
fn semantic_validation_rejects_invalid_ranges() {
    let cases = [
        (
            "invalid/zero_consecutive.toml",
            "shake.required_consecutive must be > 0",
        ),
        (
            "invalid/floor_above_base.toml",
            "shake.threshold_base must be >= shake.threshold_floor",
        ),
        (
            "invalid/empty_phrase.toml",
            "voice.default_phrase must not be empty",
        ),
        (
            "invalid/button_out_of_range.toml",
            "limits.default_button_size must lie within the button size range",
        ),
        (
            "invalid/sensitivity_inverted.toml",
            "limits.sensitivity_max must be >= limits.sensitivity_min",
        ),
        (
            "invalid/zero_tick.toml",
            "countdown.tick_interval_ms must be > 0",
        ),
    ];

    for (fixture_name, expected_msg) in cases {
        let path = fixture(fixture_name);
        let err = generate_from_path(&path).expect_err("fixture should fail validation");
        match err {
            ConfigCompilerError::Validation(msg) => {
                assert!(
                    msg.contains(expected_msg),
                    "expected validation message containing `{expected_msg}`, got `{msg}`"
                );
            }
            other => panic!("expected validation error, got {other}"),
        }
    }
}

#[test]
fn parse_errors_are_reported_for_schema_mismatches() {
    let path = fixture("invalid/missing_alert.toml");
    let err = generate_from_path(&path).expect_err("fixture should fail parsing");

    match err {
        ConfigCompilerError::Parse(msg) => {
            assert!(
                msg.contains("alert"),
                "expected parse error mentioning alert, got `{msg}`"
            );
        }
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = generate_from_path(&fixture("does_not_exist.toml")).expect_err("no such file");
    assert!(matches!(err, ConfigCompilerError::Io(_)));
}
