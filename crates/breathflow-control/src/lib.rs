//! BreathFlow Control - Actuator Link
//!
//! This crate serializes breath-pipeline state onto a half-duplex serial-style
//! link to the actuator controller:
//! - **Frames**: ASCII `R:<ratio>\n` lines, plus single-byte manual commands
//! - **Rate limiting**: continuous ratio updates are suppressed below a delta;
//!   phase-transition frames always go out
//! - **Transport**: an abstract byte sink; port enumeration/opening belongs to
//!   the host
//! - **Writer thread**: frames are handed over a channel to a dedicated writer
//!   that owns the transport, so the sample tick never blocks on I/O
//!
//! Transport failures flip the link into a disconnected state and surface a
//! [`LinkEvent`]; the inference pipeline keeps running and frames are dropped,
//! not queued.

#![warn(missing_docs)]

pub mod error;
pub mod link;
pub mod transport;
pub mod writer;

pub use error::{ControlError, Result};
pub use link::{CommandLink, KeyCommand, LinkConfig, LinkEvent, EXHALE_SENTINEL, INHALE_SENTINEL};
pub use transport::{Transport, TransportError};
pub use writer::{ChannelTransport, FrameWriter};
