//! Session context threading the pipeline through each sample tick
//!
//! All mutable pipeline state (smoother histories, detector state, cycle
//! ledger) lives in a caller-owned [`BreathSession`] rather than globals.
//! The host calls [`BreathSession::process_sample`] once per incoming sample
//! from a single thread; rendering collaborators read the exposed views
//! between ticks and never mutate them.

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::BreathConfig;
use crate::cycle::CycleLedger;
use crate::detector::{Phase, PhaseDetector, PhaseTransition};
use crate::easing::{breath_progress, EasingMode};
use crate::ratio::RatioEstimator;
use crate::smoother::{SignalSmoother, SmoothedSample};

/// Output of one processed sample
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Raw and smoothed values for this sample
    pub sample: SmoothedSample,
    /// Phase transition fired by this sample, if any
    pub transition: Option<PhaseTransition>,
    /// Instantaneous inhale/exhale ratio after this sample
    pub ratio: f32,
}

/// One breath-inference session: smoother, detector, ledger and estimator
#[derive(Debug, Clone)]
pub struct BreathSession {
    smoother: SignalSmoother,
    detector: PhaseDetector,
    ledger: CycleLedger,
    estimator: RatioEstimator,
    last_ratio: f32,
}

impl BreathSession {
    /// Create a session from configuration
    pub fn new(config: BreathConfig) -> Self {
        Self {
            smoother: SignalSmoother::new(config.smoother),
            detector: PhaseDetector::new(config.detector),
            ledger: CycleLedger::new(),
            estimator: RatioEstimator::new(config.ratio),
            last_ratio: 1.0,
        }
    }

    /// Feed one raw amplitude sample through the pipeline.
    ///
    /// Smoothing, phase detection, ledger updates and ratio estimation all
    /// happen here, in order. `now` is the sample's arrival time on the
    /// host's monotonic clock.
    pub fn process_sample(&mut self, raw: f32, now: Instant) -> Tick {
        let sample = self.smoother.ingest(raw);
        let increasing = self.smoother.trend_increasing();

        let transition = self
            .detector
            .process(sample.level2, increasing, now, &mut self.ledger);

        let ratio = self
            .estimator
            .current_ratio(&self.ledger, self.detector.phase(), now);
        self.last_ratio = ratio;

        tracing::trace!(raw, level2 = sample.level2, ratio, "sample processed");

        Tick {
            sample,
            transition,
            ratio,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.detector.phase()
    }

    /// Ratio computed by the most recent tick
    pub fn last_ratio(&self) -> f32 {
        self.last_ratio
    }

    /// Easing curve matching the current phase
    pub fn easing_mode(&self) -> EasingMode {
        self.detector.phase().into()
    }

    /// Progress through the in-progress breath segment, for the renderer
    pub fn progress(&self, now: Instant) -> f32 {
        breath_progress(&self.ledger, self.detector.phase(), now)
    }

    /// Read-only view of the cycle ledger
    pub fn cycles(&self) -> &CycleLedger {
        &self.ledger
    }

    /// Read-only view of the raw series
    pub fn raw_series(&self) -> &VecDeque<f32> {
        self.smoother.raw_series()
    }

    /// Read-only view of the level-1 smoothed series
    pub fn level1_series(&self) -> &VecDeque<f32> {
        self.smoother.level1_series()
    }

    /// Read-only view of the level-2 smoothed series
    pub fn level2_series(&self) -> &VecDeque<f32> {
        self.smoother.level2_series()
    }

    /// Restart the session: clears histories, ledger and detector state.
    pub fn reset(&mut self) {
        self.smoother.clear();
        self.ledger.clear();
        self.detector.reset();
        self.last_ratio = 1.0;
    }
}
