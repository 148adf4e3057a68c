//! Dedicated frame-writer thread
//!
//! Serial writes can block; the sample tick must not. The writer thread owns
//! the real transport and drains a bounded frame channel in order, so logical
//! frame order on the wire equals call order on the link. When a write fails
//! the writer sets a shared flag, emits [`LinkEvent::Disconnected`] and
//! exits; the [`ChannelTransport`] on the tick side then fails fast, which
//! makes the [`CommandLink`](crate::CommandLink) mark itself disconnected on
//! its next send.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::link::LinkEvent;
use crate::transport::{Transport, TransportError};

/// Frames queued between the tick and the writer thread
const FRAME_QUEUE_DEPTH: usize = 32;

/// Tick-side handle: a [`Transport`] that hands frames to the writer thread
pub struct ChannelTransport {
    frames: Sender<Vec<u8>>,
    connected: Arc<AtomicBool>,
}

impl Transport for ChannelTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        self.frames
            .send(bytes.to_vec())
            .map_err(|_| TransportError::Closed)
    }
}

/// Handle to the writer thread
pub struct FrameWriter {
    handle: JoinHandle<()>,
}

impl FrameWriter {
    /// Spawn a writer thread owning `transport`.
    ///
    /// Returns the tick-side transport and the channel on which disconnect
    /// notifications arrive. Dropping the [`ChannelTransport`] closes the
    /// frame channel and stops the thread.
    pub fn spawn(
        mut transport: Box<dyn Transport>,
    ) -> (ChannelTransport, Receiver<LinkEvent>, FrameWriter) {
        let (frame_tx, frame_rx) = bounded::<Vec<u8>>(FRAME_QUEUE_DEPTH);
        let (event_tx, event_rx) = bounded::<LinkEvent>(4);
        let connected = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&connected);

        let handle = std::thread::Builder::new()
            .name("frame-writer".to_string())
            .spawn(move || {
                for frame in frame_rx {
                    if let Err(e) = transport.write(&frame) {
                        tracing::warn!(error = %e, "transport write failed, stopping writer");
                        flag.store(false, Ordering::Release);
                        let _ = event_tx.try_send(LinkEvent::Disconnected);
                        return;
                    }
                }
                tracing::debug!("frame channel closed, writer stopping");
            })
            .expect("spawn frame-writer thread");

        (
            ChannelTransport {
                frames: frame_tx,
                connected,
            },
            event_rx,
            FrameWriter { handle },
        )
    }

    /// Wait for the writer thread to finish
    pub fn join(self) {
        let _ = self.handle.join();
    }
}
