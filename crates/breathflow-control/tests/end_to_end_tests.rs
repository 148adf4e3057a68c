//! Full pipeline-to-wire tests: session ticks driving the command link
//! through the writer thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use breathflow_control::{CommandLink, FrameWriter, LinkConfig, Transport, TransportError};
use breathflow_core::{BreathConfig, BreathSession};

#[derive(Clone, Default)]
struct SharedTransport {
    written: Arc<Mutex<Vec<u8>>>,
    fail: Arc<AtomicBool>,
}

impl Transport for SharedTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.fail.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        self.written.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }
}

fn drive(
    session: &mut BreathSession,
    link: &mut CommandLink<impl Transport>,
    samples: &[f32],
    base: Instant,
    start_ms: u64,
    spacing_ms: u64,
) {
    for (i, &raw) in samples.iter().enumerate() {
        let now = base + Duration::from_millis(start_ms + i as u64 * spacing_ms);
        let tick = session.process_sample(raw, now);
        if let Some(tr) = tick.transition {
            link.on_phase_transition(tr.phase);
        }
        link.on_ratio_tick(tick.ratio);
    }
}

#[test]
fn breath_burst_reaches_the_wire() {
    let transport = SharedTransport::default();
    let written = Arc::clone(&transport.written);
    let (sink, _events, writer) = FrameWriter::spawn(Box::new(transport));

    let mut session = BreathSession::new(BreathConfig::default());
    let mut link = CommandLink::new(sink, LinkConfig::default());

    let burst = [0.0, 40.0, 60.0];
    drive(&mut session, &mut link, &burst, Instant::now(), 0, 200);

    drop(link);
    writer.join();

    let bytes = written.lock().unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    // The inhale onset marker must be the first frame out
    assert!(
        text.starts_with("R:1.50\n"),
        "unexpected wire output: {text:?}"
    );
    // Every frame is a well-formed ratio line
    for line in text.lines() {
        let value: f32 = line.strip_prefix("R:").unwrap().parse().unwrap();
        assert!((0.1..=10.0).contains(&value));
    }
}

#[test]
fn transport_failure_never_stops_the_pipeline() {
    let transport = SharedTransport::default();
    let fail = Arc::clone(&transport.fail);
    let (sink, events, writer) = FrameWriter::spawn(Box::new(transport));

    let mut session = BreathSession::new(BreathConfig::default());
    let mut link = CommandLink::new(sink, LinkConfig::default());
    let base = Instant::now();

    drive(&mut session, &mut link, &[0.0, 40.0, 60.0], base, 0, 200);
    assert!(link.is_connected());

    // Yank the device mid-session; the next frame dies on the writer thread
    fail.store(true, Ordering::Release);
    link.send_key(breathflow_control::KeyCommand::Up);
    assert_eq!(
        events.recv_timeout(Duration::from_secs(2)).unwrap(),
        breathflow_control::LinkEvent::Disconnected
    );

    // The tick side now fails fast and the link goes quiet
    link.send_key(breathflow_control::KeyCommand::Down);
    assert!(!link.is_connected());

    // The inference pipeline keeps running in disconnected mode
    drive(
        &mut session,
        &mut link,
        &[0.0, 0.0, 0.0, 50.0, 80.0, 0.0, 0.0],
        base,
        600,
        400,
    );
    assert!(!session.cycles().is_empty());

    drop(link);
    writer.join();
}
