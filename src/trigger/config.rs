#[derive(Clone, Copy, Debug)]
pub struct ShakeConfig {
    pub required_consecutive: u8,
    pub threshold_base: f64,
    pub threshold_step: f64,
    pub threshold_floor: f64,
    pub sample_interval_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct VoiceConfig {
    pub default_phrase: &'static str,
    pub read_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct CountdownConfig {
    pub tick_interval_ms: u64,
    pub default_seconds: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct LimitsConfig {
    pub sensitivity_min: u8,
    pub sensitivity_max: u8,
    pub button_size_min: u16,
    pub button_size_max: u16,
    pub default_button_size: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct AlertConfig {
    pub map_url_prefix: &'static str,
    pub notification_body: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub shake: ShakeConfig,
    pub voice: VoiceConfig,
    pub countdown: CountdownConfig,
    pub limits: LimitsConfig,
    pub alert: AlertConfig,
}

include!(concat!(env!("OUT_DIR"), "/engine_config.rs"));

pub fn active_config() -> &'static EngineConfig {
    &ENGINE_CONFIG
}
