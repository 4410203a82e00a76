use std::fs;

use log::LevelFilter;

use super::logging::parse_level;
use super::replay::{parse_motion_csv, parse_transcript};
use super::*;

#[test]
fn settings_file_is_sanitized_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    fs::write(
        &path,
        r#"
shake_enabled = true
shake_sensitivity = 99
voice_phrase = "  Mayday "
countdown_seconds = 0
"#,
    )
    .expect("write");

    let settings = load_settings(&path).expect("load");
    assert!(settings.shake_enabled);
    assert_eq!(settings.shake_sensitivity, 10);
    assert_eq!(settings.voice_phrase, "mayday");
    assert_eq!(settings.countdown_seconds, 1);
}

#[test]
fn missing_settings_file_names_the_path() {
    let err = load_settings(Path::new("/nonexistent/settings.toml")).expect_err("missing");
    assert!(format!("{err:#}").contains("/nonexistent/settings.toml"));
}

#[test]
fn contacts_load_from_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("contacts.json");
    fs::write(
        &path,
        r#"[
  {"name": "Ana", "phone": "+100", "categories": ["Family"]},
  {"name": "Ben", "phone": "+200"}
]"#,
    )
    .expect("write");

    let contacts = load_contacts(&path).expect("load");
    assert_eq!(contacts.len(), 2);
    assert!(contacts[0].in_category("Family"));
    assert!(contacts[1].categories.is_empty());
}

#[test]
fn motion_csv_skips_header_and_comments() {
    let samples = parse_motion_csv("x,y,z\n# resting\n0,0,9.8\n\n 12.5, -3 ,9.8\n").expect("parse");
    assert_eq!(samples, vec![(0.0, 0.0, 9.8), (12.5, -3.0, 9.8)]);
}

#[test]
fn motion_csv_reports_bad_line() {
    let err = parse_motion_csv("0,0,9.8\n1,2\n").expect_err("short line");
    assert!(err.to_string().contains("line 2"));

    let err = parse_motion_csv("0,zero,9.8\n").expect_err("not numeric");
    assert!(err.to_string().contains("line 1"));
}

#[test]
fn transcript_keeps_spoken_lines_only() {
    let lines = parse_transcript("# session\nhello there\n\n please help me \n");
    assert_eq!(lines, vec!["hello there", "please help me"]);
}

#[test]
fn log_level_parses_or_names_the_bad_value() {
    assert_eq!(parse_level(None).expect("default"), LevelFilter::Info);
    assert_eq!(parse_level(Some("debug")).expect("debug"), LevelFilter::Debug);

    let err = parse_level(Some("chatty")).expect_err("unknown level");
    assert!(format!("{err:#}").contains("chatty"));
}

#[test]
fn installed_logger_mirrors_records_to_json_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("logs").join("host.jsonl");
    HostLogger::new(LevelFilter::Debug, Some(path.clone()))
        .expect("logger")
        .install()
        .expect("install");

    log::debug!(target: "sosguard::host", "countdown armed");
    log::trace!(target: "sosguard::host", "below the level");
    log::logger().flush();

    let raw = fs::read_to_string(&path).expect("read log");
    let lines: Vec<serde_json::Value> = raw
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json line"))
        .filter(|entry| entry["target"] == "sosguard::host")
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "debug");
    assert_eq!(lines[0]["target"], "sosguard::host");
    assert_eq!(lines[0]["msg"], "countdown armed");
}
