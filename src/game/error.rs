//! Configuration errors.
//!
//! These are fatal: they are reported before any grid is built and never
//! raised from inside a running simulation.

use std::fmt;

/// Why a level configuration was rejected.
#[derive(Debug)]
pub enum ConfigError {
    /// A level asked for zero rows.
    NoRows { level: usize },
    /// A level asked for zero columns.
    NoColumns { level: usize },
    /// A level has an empty color palette.
    NoColors { level: usize },
    /// A level's projectile speed is not a positive finite number.
    InvalidSpeed { level: usize, speed: f32 },
    /// The bubble radius is not a positive finite number.
    InvalidRadius(f32),
    /// The playfield has a non-positive width or height.
    InvalidPlayfield { width: f32, height: f32 },
    /// The level set is empty.
    NoLevels,
    /// The level document is not valid JSON for a level set.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoRows { level } => write!(f, "level {level} has no rows"),
            ConfigError::NoColumns { level } => write!(f, "level {level} has no columns"),
            ConfigError::NoColors { level } => write!(f, "level {level} has no bubble colors"),
            ConfigError::InvalidSpeed { level, speed } => {
                write!(f, "level {level} has invalid bubble speed {speed}")
            }
            ConfigError::InvalidRadius(radius) => write!(f, "invalid bubble radius {radius}"),
            ConfigError::InvalidPlayfield { width, height } => {
                write!(f, "invalid playfield size {width}x{height}")
            }
            ConfigError::NoLevels => write!(f, "no levels configured"),
            ConfigError::Parse(e) => write!(f, "failed to parse level config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
