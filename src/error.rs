use thiserror::Error;

/// Errors raised while building or loading an [`EngineConfig`](crate::EngineConfig).
///
/// Graph malformation is never an error; see the module docs of
/// [`arena`](crate::arena) and [`generation`](crate::generation).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("zoom range is empty: min {min} > max {max}")]
    InvalidZoomRange { min: f32, max: f32 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("failed to parse engine config: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
