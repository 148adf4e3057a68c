//! Rate-limited command protocol to the actuator controller
//!
//! The wire format is ASCII lines `R:<ratio>\n` with the ratio printed to two
//! decimals. Two reserved values double as phase markers: `1.5` at inhale
//! onset and `0.5` at exhale onset. Phase markers bypass the rate limiter;
//! continuous ratio updates are dropped unless they moved at least the
//! configured delta since the last frame that actually went out. Manual
//! directional commands are forwarded immediately as one raw byte each.
//!
//! The sentinel values sit inside the valid continuous range, so a continuous
//! ratio of exactly 0.50 is indistinguishable from an exhale marker on the
//! controller side. Inherited protocol quirk; a cleaner protocol would use a
//! distinct frame type for transitions.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use breathflow_core::Phase;

use crate::error::{ControlError, Result};
use crate::transport::{Transport, TransportError};

/// Wire ratio marking an inhale onset
pub const INHALE_SENTINEL: f32 = 1.5;
/// Wire ratio marking an exhale onset
pub const EXHALE_SENTINEL: f32 = 0.5;

/// Link settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// Minimum ratio movement before a continuous frame is sent
    pub min_ratio_delta: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            min_ratio_delta: 0.1,
        }
    }
}

/// Manual directional override commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Forward (`w`)
    Up,
    /// Backward (`s`)
    Down,
    /// Left (`a`)
    Left,
    /// Right (`d`)
    Right,
}

impl KeyCommand {
    /// The single byte sent on the wire
    pub fn as_byte(self) -> u8 {
        match self {
            KeyCommand::Up => b'w',
            KeyCommand::Down => b's',
            KeyCommand::Left => b'a',
            KeyCommand::Right => b'd',
        }
    }

    /// Parse a command character
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'w' => Ok(KeyCommand::Up),
            's' => Ok(KeyCommand::Down),
            'a' => Ok(KeyCommand::Left),
            'd' => Ok(KeyCommand::Right),
            other => Err(ControlError::InvalidKey(other)),
        }
    }
}

/// Notifications surfaced to the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The transport failed; the link stopped sending
    Disconnected,
}

/// Serializes phase/ratio state and manual commands onto a transport.
///
/// Never panics and never propagates transport errors to the caller: a write
/// failure marks the link disconnected, emits [`LinkEvent::Disconnected`] on
/// the notification channel, and subsequent frames are dropped until the host
/// completes a reconnect and calls [`CommandLink::mark_connected`].
pub struct CommandLink<T: Transport> {
    transport: T,
    config: LinkConfig,
    last_sent: f32,
    connected: bool,
    events: Option<Sender<LinkEvent>>,
}

impl<T: Transport> CommandLink<T> {
    /// Create a connected link
    pub fn new(transport: T, config: LinkConfig) -> Self {
        Self {
            transport,
            config,
            last_sent: 1.0,
            connected: true,
            events: None,
        }
    }

    /// Create a connected link that reports disconnections on `events`
    pub fn with_events(transport: T, config: LinkConfig, events: Sender<LinkEvent>) -> Self {
        Self {
            events: Some(events),
            ..Self::new(transport, config)
        }
    }

    /// Whether the link believes the transport is alive
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The last ratio value that actually went out
    pub fn last_sent_ratio(&self) -> f32 {
        self.last_sent
    }

    /// Resume sending after the host completed a reconnect handshake
    pub fn mark_connected(&mut self) {
        self.connected = true;
        tracing::info!("actuator link reconnected");
    }

    /// Send the phase marker frame for a transition. Always sent.
    pub fn on_phase_transition(&mut self, phase: Phase) {
        let sentinel = match phase {
            Phase::Inhaling => INHALE_SENTINEL,
            Phase::Exhaling => EXHALE_SENTINEL,
        };
        self.send_ratio_frame(sentinel);
    }

    /// Offer a continuous ratio update; dropped unless it moved at least the
    /// configured delta since the last transmitted frame.
    pub fn on_ratio_tick(&mut self, ratio: f32) {
        if (ratio - self.last_sent).abs() < self.config.min_ratio_delta {
            return;
        }
        self.send_ratio_frame(ratio);
    }

    /// Forward a manual directional command: one raw byte, no newline, no
    /// rate limiting.
    pub fn send_key(&mut self, key: KeyCommand) {
        if !self.connected {
            tracing::debug!(?key, "dropping key command, link disconnected");
            return;
        }
        match self.transport.write(&[key.as_byte()]) {
            Ok(()) => tracing::debug!(?key, "sent key command"),
            Err(e) => self.handle_disconnect(e),
        }
    }

    fn send_ratio_frame(&mut self, ratio: f32) {
        if !self.connected {
            tracing::debug!(ratio, "dropping frame, link disconnected");
            return;
        }
        let frame = format!("R:{ratio:.2}\n");
        match self.transport.write(frame.as_bytes()) {
            Ok(()) => {
                self.last_sent = ratio;
                tracing::trace!(ratio, "sent ratio frame");
            }
            Err(e) => self.handle_disconnect(e),
        }
    }

    fn handle_disconnect(&mut self, err: TransportError) {
        tracing::warn!(error = %err, "actuator link write failed, marking disconnected");
        self.connected = false;
        if let Some(events) = &self.events {
            // The host may have gone away; a full event queue is not an error
            let _ = events.try_send(LinkEvent::Disconnected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::VecTransport;

    /// Transport that starts failing after a set number of writes
    struct FlakyTransport {
        written: Vec<u8>,
        writes_before_failure: usize,
    }

    impl FlakyTransport {
        fn new(writes_before_failure: usize) -> Self {
            Self {
                written: Vec::new(),
                writes_before_failure,
            }
        }
    }

    impl Transport for FlakyTransport {
        fn write(&mut self, bytes: &[u8]) -> std::result::Result<(), TransportError> {
            if self.writes_before_failure == 0 {
                return Err(TransportError::Closed);
            }
            self.writes_before_failure -= 1;
            self.written.extend_from_slice(bytes);
            Ok(())
        }
    }

    fn link() -> CommandLink<VecTransport> {
        CommandLink::new(VecTransport::new(), LinkConfig::default())
    }

    #[test]
    fn transition_frames_always_sent() {
        let mut link = link();
        link.on_phase_transition(Phase::Inhaling);
        link.on_phase_transition(Phase::Exhaling);
        // Back-to-back transitions ignore the delta rule entirely
        link.on_phase_transition(Phase::Exhaling);
        assert_eq!(link.transport.written(), b"R:1.50\nR:0.50\nR:0.50\n");
    }

    #[test]
    fn small_ratio_movements_suppressed() {
        let mut link = link();
        link.on_phase_transition(Phase::Inhaling); // last_sent = 1.5
        link.on_ratio_tick(1.00); // delta 0.5, sent
        link.on_ratio_tick(1.05); // delta 0.05, suppressed
        link.on_ratio_tick(1.00); // delta 0.0 from last sent, suppressed
        link.on_ratio_tick(1.23); // delta 0.23, sent
        assert_eq!(link.transport.written(), b"R:1.50\nR:1.00\nR:1.23\n");
        assert_eq!(link.last_sent_ratio(), 1.23);
    }

    #[test]
    fn initial_ratio_near_one_is_suppressed() {
        // last_sent starts at 1.0, mirroring the controller's initial state
        let mut link = link();
        link.on_ratio_tick(1.05);
        assert!(link.transport.written().is_empty());
        link.on_ratio_tick(1.11);
        assert_eq!(link.transport.written(), b"R:1.11\n");
    }

    #[test]
    fn frames_formatted_to_two_decimals() {
        let mut link = link();
        link.on_ratio_tick(2.0 / 3.0);
        assert_eq!(link.transport.written(), b"R:0.67\n");
    }

    #[test]
    fn key_commands_bypass_rate_limiting() {
        let mut link = link();
        link.send_key(KeyCommand::Up);
        link.send_key(KeyCommand::Up);
        link.send_key(KeyCommand::Left);
        link.send_key(KeyCommand::Down);
        link.send_key(KeyCommand::Right);
        assert_eq!(link.transport.written(), b"wwasd");
        // Key traffic never disturbs the ratio limiter state
        assert_eq!(link.last_sent_ratio(), 1.0);
    }

    #[test]
    fn key_command_parsing() {
        assert_eq!(KeyCommand::from_char('w').unwrap(), KeyCommand::Up);
        assert_eq!(KeyCommand::from_char('a').unwrap(), KeyCommand::Left);
        assert!(KeyCommand::from_char('x').is_err());
    }

    #[test]
    fn write_failure_disconnects_and_drops_frames() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut link = CommandLink::with_events(FlakyTransport::new(1), LinkConfig::default(), tx);

        link.on_phase_transition(Phase::Inhaling);
        assert!(link.is_connected());

        link.on_phase_transition(Phase::Exhaling);
        assert!(!link.is_connected());
        assert_eq!(rx.try_recv().unwrap(), LinkEvent::Disconnected);

        // Dropped, not queued: nothing new shows up after reconnecting
        link.on_ratio_tick(5.0);
        link.send_key(KeyCommand::Up);
        assert_eq!(link.transport.written, b"R:1.50\n");

        // last_sent still reflects the last successful frame
        assert_eq!(link.last_sent_ratio(), 1.5);
    }

    #[test]
    fn mark_connected_resumes_sending() {
        let mut link = CommandLink::new(FlakyTransport::new(0), LinkConfig::default());
        link.on_phase_transition(Phase::Inhaling);
        assert!(!link.is_connected());

        link.transport.writes_before_failure = usize::MAX;
        link.mark_connected();
        link.on_phase_transition(Phase::Exhaling);
        assert_eq!(link.transport.written, b"R:0.50\n");
    }
}
