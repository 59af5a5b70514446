//! Error types for the simulator

use crate::builder::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for simulator operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to spawn {thread} thread: {source}")]
    Spawn {
        thread: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Playback control error: {0}")]
    Control(String),
}

/// Errors raised while loading or validating a configuration
///
/// These are the only failures the simulator propagates; they surface before
/// any thread is started.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}
