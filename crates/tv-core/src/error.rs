//! Error taxonomy shared by every widget

use thiserror::Error;

/// Configuration problems detected while constructing or reconfiguring a widget.
///
/// These are reported to the caller at construction time and are fatal to
/// the widget instance only. Degenerate data and pointer misses are not
/// errors; they have defined fallbacks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Stream capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    #[error("Invalid dimensions {width}x{height}: both sides must be finite and positive")]
    InvalidDimensions { width: f32, height: f32 },

    #[error("Anomaly probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Invalid range: lower bound {lower} exceeds upper bound {upper}")]
    InvalidRange { lower: f64, upper: f64 },

    #[error("Animation duration must be finite and positive, got {0} ms")]
    InvalidDuration(f64),

    #[error("Refresh interval must be positive")]
    InvalidInterval,

    #[error("Invalid color token '{0}'")]
    InvalidColor(String),

    #[error("Widget '{widget}' expects {expected} data")]
    DataShape {
        widget: String,
        expected: &'static str,
    },

    #[error("Configuration parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Parse(error.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
