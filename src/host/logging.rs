use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;

/// Human lines on stdout/stderr plus an optional JSON-lines mirror.
pub struct HostLogger {
    level: LevelFilter,
    json_file: Mutex<Option<File>>,
}

impl HostLogger {
    pub fn from_env() -> Result<Self> {
        let level = parse_level(std::env::var("SOSGUARD_LOG").ok().as_deref())?;
        let path = std::env::var("SOSGUARD_LOG_JSON_PATH").ok();
        Self::new(level, path.map(PathBuf::from))
    }

    pub fn new(level: LevelFilter, path: Option<PathBuf>) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("open log file {}", path.display()))?;
                Some(file)
            }
            None => None,
        };
        Ok(Self {
            level,
            json_file: Mutex::new(json_file),
        })
    }

    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).context("logger already installed")?;
        log::set_max_level(level);
        Ok(())
    }

    fn event(&self, record: &Record<'_>) {
        let Ok(mut guard) = self.json_file.lock() else {
            return;
        };
        let Some(file) = guard.as_mut() else {
            return;
        };

        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let entry = json!({
            "ts_ms": ts_ms,
            "level": record.level().as_str().to_ascii_lowercase(),
            "target": record.target(),
            "msg": record.args().to_string(),
        });

        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }
}

/// `None` falls back to `info`.
pub fn parse_level(raw: Option<&str>) -> Result<LevelFilter> {
    match raw {
        Some(raw) => raw
            .parse::<LevelFilter>()
            .with_context(|| format!("SOSGUARD_LOG has unknown level `{raw}`")),
        None => Ok(LevelFilter::Info),
    }
}

impl Log for HostLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error | Level::Warn => eprintln!("[{}] {}", record.level(), record.args()),
            _ => println!("[{}] {}", record.level(), record.args()),
        }
        self.event(record);
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.json_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}
