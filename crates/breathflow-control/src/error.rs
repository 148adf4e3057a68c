//! Error types for the actuator link
use thiserror::Error;

use crate::transport::TransportError;

/// Control link errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Transport-level write failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Operation attempted while the link is disconnected
    #[error("link disconnected")]
    Disconnected,

    /// A character that is not one of the four directional commands
    #[error("invalid key command: {0:?}")]
    InvalidKey(char),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
