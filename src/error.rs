use core::fmt;

use thiserror::Error;

/// Engine features that can be switched on and off by settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Feature {
    Shake,
    Voice,
    Overlay,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shake => "shake monitoring",
            Self::Voice => "voice listening",
            Self::Overlay => "trigger surface",
        })
    }
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend failed: {0}")]
    Failed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("delivery to {phone} failed: {reason}")]
pub struct DeliveryError {
    pub phone: String,
    pub reason: String,
}

#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[derive(Debug, Error)]
#[error("trigger surface unavailable: {0}")]
pub struct SurfaceError(pub String);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SosError {
    #[error("{feature} unavailable: {reason}")]
    SensorUnavailable { feature: Feature, reason: String },
    #[error(transparent)]
    SurfaceUnavailable(#[from] SurfaceError),
    #[error("phrase store: {0}")]
    Store(#[from] StoreError),
}

impl SosError {
    pub fn sensor(feature: Feature, err: &SensorError) -> Self {
        Self::SensorUnavailable {
            feature,
            reason: err.to_string(),
        }
    }
}
