//! BreathFlow - breath-driven actuator control
//!
//! Reads amplitude samples (from stdin or a built-in demo oscillator), runs
//! them through the breath-inference pipeline and writes actuator frames to
//! stdout. Manual `w`/`a`/`s`/`d` override commands on stdin are forwarded
//! verbatim.

mod config;
mod logging_setup;

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use breathflow_control::{
    CommandLink, FrameWriter, KeyCommand, LinkEvent, Transport, TransportError,
};
use breathflow_core::BreathSession;
use config::AppConfig;
use crossbeam_channel::Receiver;

/// Transport writing frames to stdout, for driving a downstream consumer or
/// piping into a serial relay.
struct StdoutTransport {
    out: std::io::Stdout,
}

impl StdoutTransport {
    fn new() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl Transport for StdoutTransport {
    fn write(&mut self, bytes: &[u8]) -> std::result::Result<(), TransportError> {
        let mut handle = self.out.lock();
        handle.write_all(bytes)?;
        handle.flush()?;
        Ok(())
    }
}

struct CliArgs {
    config_path: Option<PathBuf>,
    demo: bool,
    demo_seconds: u64,
    rate_hz: u32,
}

fn print_usage() {
    eprintln!(
        "Usage: breathflow [OPTIONS]\n\
         \n\
         Reads one amplitude sample per stdin line and writes actuator\n\
         frames to stdout. Lines 'w', 'a', 's', 'd' are forwarded as manual\n\
         override commands.\n\
         \n\
         Options:\n\
           --config <PATH>    JSON configuration file\n\
           --demo             Synthesize a breath signal instead of reading stdin\n\
           --seconds <N>      Demo duration in seconds (default 30)\n\
           --rate <HZ>        Demo sample rate (default 60)\n\
           --help             Show this help"
    );
}

fn parse_args() -> Result<Option<CliArgs>> {
    let mut args = CliArgs {
        config_path: None,
        demo: false,
        demo_seconds: 30,
        rate_hz: 60,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                args.config_path = Some(PathBuf::from(path));
            }
            "--demo" => args.demo = true,
            "--seconds" => {
                let value = iter.next().context("--seconds requires a number")?;
                args.demo_seconds = value.parse().context("--seconds must be a number")?;
            }
            "--rate" => {
                let value = iter.next().context("--rate requires a number")?;
                args.rate_hz = value.parse().context("--rate must be a number")?;
                if args.rate_hz == 0 {
                    bail!("--rate must be positive");
                }
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other => bail!("unknown argument: {other} (try --help)"),
        }
    }
    Ok(Some(args))
}

fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };
    let app_config = AppConfig::load_or_default(args.config_path.as_deref())?;
    let _log_guard = logging_setup::init(&app_config.logging)?;

    run(args, app_config)
}

fn run(args: CliArgs, app_config: AppConfig) -> Result<()> {
    let (sink, link_events, writer) = FrameWriter::spawn(Box::new(StdoutTransport::new()));
    let mut link = CommandLink::new(sink, app_config.link);
    let mut session = BreathSession::new(app_config.pipeline);

    info!(demo = args.demo, "BreathFlow starting");

    if args.demo {
        run_demo(&mut session, &mut link, &link_events, &args);
    } else {
        run_stdin(&mut session, &mut link, &link_events)?;
    }

    info!(
        cycles = session.cycles().len(),
        ratio = session.last_ratio(),
        "session finished"
    );

    drop(link);
    writer.join();
    Ok(())
}

fn process_tick(
    session: &mut BreathSession,
    link: &mut CommandLink<impl Transport>,
    raw: f32,
    now: Instant,
) {
    let tick = session.process_sample(raw, now);
    if let Some(transition) = tick.transition {
        info!(phase = ?transition.phase, ratio = tick.ratio, "phase transition");
        link.on_phase_transition(transition.phase);
    }
    link.on_ratio_tick(tick.ratio);
}

fn poll_link_events(link_events: &Receiver<LinkEvent>) {
    while let Ok(event) = link_events.try_recv() {
        match event {
            LinkEvent::Disconnected => {
                warn!("actuator link disconnected; frames will be dropped until reconnect");
            }
        }
    }
}

/// Feed stdin lines through the pipeline: floats are samples, single
/// command characters are manual overrides.
fn run_stdin(
    session: &mut BreathSession,
    link: &mut CommandLink<impl Transport>,
    link_events: &Receiver<LinkEvent>,
) -> Result<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Ok(raw) = trimmed.parse::<f32>() {
            process_tick(session, link, raw, Instant::now());
        } else if let Some(key) = parse_key_line(trimmed) {
            debug!(?key, "manual override");
            link.send_key(key);
        } else {
            debug!(line = trimmed, "ignoring unrecognized input line");
        }

        poll_link_events(link_events);
    }
    Ok(())
}

fn parse_key_line(line: &str) -> Option<KeyCommand> {
    let mut chars = line.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    KeyCommand::from_char(c).ok()
}

/// Synthesize a slow breath-like amplitude signal and run it in real time.
fn run_demo(
    session: &mut BreathSession,
    link: &mut CommandLink<impl Transport>,
    link_events: &Receiver<LinkEvent>,
    args: &CliArgs,
) {
    let tick_interval = Duration::from_secs(1) / args.rate_hz;
    let total_ticks = args.demo_seconds * args.rate_hz as u64;
    info!(
        seconds = args.demo_seconds,
        rate_hz = args.rate_hz,
        "running demo signal"
    );

    for i in 0..total_ticks {
        let t = i as f32 * tick_interval.as_secs_f32();
        // ~5s breath period, loud enough to drive the envelope
        let raw = 30.0 + 28.0 * (std::f32::consts::TAU * t / 5.0).sin();
        process_tick(session, link, raw, Instant::now());
        poll_link_events(link_events);
        std::thread::sleep(tick_interval);
    }
}
