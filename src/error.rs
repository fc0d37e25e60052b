//! Error types for configuration loading.
//!
//! The simulation itself never fails: invalid calls are no-ops or terminal
//! phase transitions. Only reading a tuning file can go wrong.

use std::io;

/// Errors produced while loading or validating a [`GameConfig`](crate::GameConfig).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config must define at least one level")]
    NoLevels,

    #[error("Level {index} is invalid: {reason}")]
    InvalidLevel { index: usize, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
