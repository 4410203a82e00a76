//! Compiles `config/engine.toml` into Rust constants for the trigger engine.
//!
//! The output is a single `pub static ENGINE_CONFIG: EngineConfig = ...;` item
//! that `src/trigger/config.rs` pulls in with `include!`.

use std::{fmt, fs, path::Path};

use serde::Deserialize;

#[derive(Debug)]
pub enum ConfigCompilerError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigCompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigCompilerError {}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShakeSection {
    pub required_consecutive: u8,
    pub threshold_base: f64,
    pub threshold_step: f64,
    pub threshold_floor: f64,
    pub sample_interval_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceSection {
    pub default_phrase: String,
    pub read_timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountdownSection {
    pub tick_interval_ms: u64,
    pub default_seconds: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsSection {
    pub sensitivity_min: u8,
    pub sensitivity_max: u8,
    pub button_size_min: u16,
    pub button_size_max: u16,
    pub default_button_size: u16,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertSection {
    pub map_url_prefix: String,
    pub notification_body: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineFile {
    pub shake: ShakeSection,
    pub voice: VoiceSection,
    pub countdown: CountdownSection,
    pub limits: LimitsSection,
    pub alert: AlertSection,
}

pub fn parse_engine_str(raw: &str) -> Result<EngineFile, ConfigCompilerError> {
    toml::from_str(raw).map_err(|e| ConfigCompilerError::Parse(e.to_string()))
}

pub fn parse_engine_file(path: &Path) -> Result<EngineFile, ConfigCompilerError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ConfigCompilerError::Io(format!("{}: {e}", path.display())))?;
    parse_engine_str(&raw)
}

pub fn validate_config(cfg: &EngineFile) -> Result<(), ConfigCompilerError> {
    let fail = |msg: &str| Err(ConfigCompilerError::Validation(msg.to_string()));

    let shake = &cfg.shake;
    if shake.required_consecutive == 0 {
        return fail("shake.required_consecutive must be > 0");
    }
    if shake.sample_interval_ms == 0 {
        return fail("shake.sample_interval_ms must be > 0");
    }
    if !(shake.threshold_floor > 0.0) {
        return fail("shake.threshold_floor must be > 0");
    }
    if shake.threshold_base < shake.threshold_floor {
        return fail("shake.threshold_base must be >= shake.threshold_floor");
    }
    if !(shake.threshold_step > 0.0) {
        return fail("shake.threshold_step must be > 0");
    }

    if cfg.voice.default_phrase.trim().is_empty() {
        return fail("voice.default_phrase must not be empty");
    }
    if cfg.voice.read_timeout_ms == 0 {
        return fail("voice.read_timeout_ms must be > 0");
    }

    if cfg.countdown.tick_interval_ms == 0 {
        return fail("countdown.tick_interval_ms must be > 0");
    }
    if cfg.countdown.default_seconds == 0 {
        return fail("countdown.default_seconds must be >= 1");
    }

    let limits = &cfg.limits;
    if limits.sensitivity_min == 0 || limits.sensitivity_max < limits.sensitivity_min {
        return fail("limits.sensitivity_max must be >= limits.sensitivity_min >= 1");
    }
    if limits.button_size_max < limits.button_size_min {
        return fail("limits.button_size_max must be >= limits.button_size_min");
    }
    if limits.default_button_size < limits.button_size_min
        || limits.default_button_size > limits.button_size_max
    {
        return fail("limits.default_button_size must lie within the button size range");
    }

    if cfg.alert.map_url_prefix.is_empty() {
        return fail("alert.map_url_prefix must not be empty");
    }

    Ok(())
}

fn render_f64(value: f64) -> String {
    let mut text = format!("{value:?}");
    if !text.contains('.') && !text.contains('e') {
        text.push_str(".0");
    }
    text
}

pub fn render_generated_config(cfg: &EngineFile) -> String {
    let mut out = String::new();
    out.push_str("// @generated by engine_config_compiler. Do not edit.\n");
    out.push_str("pub static ENGINE_CONFIG: EngineConfig = EngineConfig {\n");

    out.push_str("    shake: ShakeConfig {\n");
    out.push_str(&format!(
        "        required_consecutive: {},\n",
        cfg.shake.required_consecutive
    ));
    out.push_str(&format!(
        "        threshold_base: {},\n",
        render_f64(cfg.shake.threshold_base)
    ));
    out.push_str(&format!(
        "        threshold_step: {},\n",
        render_f64(cfg.shake.threshold_step)
    ));
    out.push_str(&format!(
        "        threshold_floor: {},\n",
        render_f64(cfg.shake.threshold_floor)
    ));
    out.push_str(&format!(
        "        sample_interval_ms: {},\n",
        cfg.shake.sample_interval_ms
    ));
    out.push_str("    },\n");

    out.push_str("    voice: VoiceConfig {\n");
    out.push_str(&format!(
        "        default_phrase: {:?},\n",
        cfg.voice.default_phrase.trim().to_lowercase()
    ));
    out.push_str(&format!(
        "        read_timeout_ms: {},\n",
        cfg.voice.read_timeout_ms
    ));
    out.push_str("    },\n");

    out.push_str("    countdown: CountdownConfig {\n");
    out.push_str(&format!(
        "        tick_interval_ms: {},\n",
        cfg.countdown.tick_interval_ms
    ));
    out.push_str(&format!(
        "        default_seconds: {},\n",
        cfg.countdown.default_seconds
    ));
    out.push_str("    },\n");

    out.push_str("    limits: LimitsConfig {\n");
    out.push_str(&format!(
        "        sensitivity_min: {},\n",
        cfg.limits.sensitivity_min
    ));
    out.push_str(&format!(
        "        sensitivity_max: {},\n",
        cfg.limits.sensitivity_max
    ));
    out.push_str(&format!(
        "        button_size_min: {},\n",
        cfg.limits.button_size_min
    ));
    out.push_str(&format!(
        "        button_size_max: {},\n",
        cfg.limits.button_size_max
    ));
    out.push_str(&format!(
        "        default_button_size: {},\n",
        cfg.limits.default_button_size
    ));
    out.push_str("    },\n");

    out.push_str("    alert: AlertConfig {\n");
    out.push_str(&format!(
        "        map_url_prefix: {:?},\n",
        cfg.alert.map_url_prefix
    ));
    out.push_str(&format!(
        "        notification_body: {:?},\n",
        cfg.alert.notification_body
    ));
    out.push_str("    },\n");

    out.push_str("};\n");
    out
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let cfg = parse_engine_file(path)?;
    validate_config(&cfg)?;
    Ok(render_generated_config(&cfg))
}
