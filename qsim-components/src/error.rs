//! Error types for simulator components

use crate::generator::PlaybackState;
use thiserror::Error;

/// Errors related to queue operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Queue is full (capacity: {capacity})")]
    Full { capacity: usize },
}

/// Errors related to generator playback control
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Cannot {action} while generator is {from}")]
    InvalidTransition {
        from: PlaybackState,
        action: &'static str,
    },

    #[error("Server '{server}' already has an active generator")]
    AlreadyActive { server: String },

    #[error("Server '{server}' has been stopped")]
    ServerStopped { server: String },

    #[error("Failed to spawn generator thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl From<ControlError> for qsim_core::SimError {
    fn from(err: ControlError) -> Self {
        qsim_core::SimError::Control(err.to_string())
    }
}
