//! Byte transport abstraction
//!
//! The link only needs a sink that accepts byte frames and reports failure.
//! Serial port enumeration, opening and reconnect negotiation are the host's
//! concern; tests use in-memory transports.

use thiserror::Error;

/// Transport-level failures
#[derive(Error, Debug)]
pub enum TransportError {
    /// Underlying device I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport is gone (device unplugged, channel closed)
    #[error("transport closed")]
    Closed,
}

/// A byte sink for outbound frames.
///
/// `write` must either deliver the whole frame or fail; ordering of frames
/// follows call order. Implementations may block.
pub trait Transport: Send {
    /// Write one frame of bytes
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// Transport that appends all frames to an in-memory buffer. Test helper.
#[derive(Debug, Default)]
pub struct VecTransport {
    written: Vec<u8>,
}

impl VecTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Transport for VecTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }
}
