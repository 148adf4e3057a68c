//! Hysteresis-based inhale/exhale phase detection
//!
//! A two-state machine driven by the level-2 envelope: an inhale onset fires
//! when the envelope rises past the previous value by the breath threshold or
//! shows a sustained upward trend; an exhale onset fires on the mirrored
//! condition with a reduced threshold. A minimum dwell time between
//! transitions debounces the machine against oscillation around a crossing
//! point. The detector never errors; it only declines to transition.

use std::time::Instant;

use crate::config::DetectorConfig;
use crate::cycle::{BreathCycle, CycleLedger};

/// The detector's current belief about breathing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Breath flowing in
    Inhaling,
    /// Breath flowing out
    Exhaling,
}

/// A detected phase transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    /// The phase entered by this transition
    pub phase: Phase,
    /// When the transition fired
    pub at: Instant,
}

/// Two-state breath phase machine with hysteresis and debounce
#[derive(Debug, Clone)]
pub struct PhaseDetector {
    config: DetectorConfig,
    phase: Phase,
    last_level2: f32,
    last_transition: Option<Instant>,
}

impl PhaseDetector {
    /// Create a detector in the initial Exhaling state.
    ///
    /// Starting in Exhaling means the first detected event is an inhale
    /// onset, which opens the first ledger cycle.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            phase: Phase::Exhaling,
            last_level2: 0.0,
            last_transition: None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// When the last transition fired, if one has
    pub fn last_transition(&self) -> Option<Instant> {
        self.last_transition
    }

    /// Process one level-2 envelope sample.
    ///
    /// `increasing` is the three-sample trend flag from the smoother. On a
    /// transition the ledger is updated in place: an inhale onset closes the
    /// open exhale segment and opens a new cycle; an exhale onset closes the
    /// inhale segment and opens the exhale segment. The previous envelope
    /// value is updated every call, transition or not.
    pub fn process(
        &mut self,
        v: f32,
        increasing: bool,
        now: Instant,
        ledger: &mut CycleLedger,
    ) -> Option<PhaseTransition> {
        let dwell_elapsed = match self.last_transition {
            Some(at) => now.duration_since(at) >= self.config.debounce(),
            None => true,
        };

        let prev = self.last_level2;
        let mut transition = None;

        if dwell_elapsed {
            match self.phase {
                Phase::Exhaling if v > prev + self.config.threshold || increasing => {
                    tracing::debug!(
                        delta = v - prev,
                        trend_up = increasing,
                        "transition to inhale"
                    );
                    if let Some(cycle) = ledger.current_mut() {
                        if cycle.exhale_start.is_some() && cycle.exhale_end.is_none() {
                            cycle.exhale_end = Some(now);
                        }
                    }
                    ledger.push(BreathCycle::begin(now));
                    transition = self.enter(Phase::Inhaling, now);
                }
                Phase::Inhaling
                    if v < prev - self.config.threshold * self.config.exhale_factor
                        || !increasing =>
                {
                    tracing::debug!(
                        delta = v - prev,
                        trend_up = increasing,
                        "transition to exhale"
                    );
                    if let Some(cycle) = ledger.current_mut() {
                        if cycle.inhale_end.is_none() {
                            cycle.inhale_end = Some(now);
                        }
                        if cycle.exhale_start.is_none() {
                            cycle.exhale_start = Some(now);
                        }
                    }
                    transition = self.enter(Phase::Exhaling, now);
                }
                _ => {}
            }
        }

        self.last_level2 = v;
        transition
    }

    fn enter(&mut self, phase: Phase, now: Instant) -> Option<PhaseTransition> {
        self.phase = phase;
        self.last_transition = Some(now);
        Some(PhaseTransition { phase, at: now })
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.phase = Phase::Exhaling;
        self.last_level2 = 0.0;
        self.last_transition = None;
    }
}
