//! Continuously reprojected inhale/exhale ratio
//!
//! The ratio is recomputed on every sample, not only at transitions: the
//! in-progress segment's elapsed time is measured against the most recent
//! completed opposite segment. This trades precision for responsiveness and
//! gives the actuator a live, anticipatory control signal.

use std::time::Instant;

use crate::config::RatioConfig;
use crate::cycle::CycleLedger;
use crate::detector::Phase;

/// Ratio when no denominator is available yet
const DEFAULT_RATIO: f32 = 1.0;

/// Computes the instantaneous inhale/exhale timing ratio from the ledger
#[derive(Debug, Clone, Copy)]
pub struct RatioEstimator {
    config: RatioConfig,
}

impl RatioEstimator {
    /// Create an estimator with the given clamp bounds
    pub fn new(config: RatioConfig) -> Self {
        Self { config }
    }

    /// Instantaneous ratio at `now`, clamped to the configured range.
    ///
    /// While inhaling, the elapsed inhale time is divided by the current
    /// cycle's exhale length if closed, else the previous cycle's. While
    /// exhaling, the completed inhale length is divided by the elapsed exhale
    /// time (minimum 1 ms). With no usable denominator the ratio stays at
    /// 1.0.
    pub fn current_ratio(&self, ledger: &CycleLedger, phase: Phase, now: Instant) -> f32 {
        let mut ratio = DEFAULT_RATIO;

        if let Some(cycle) = ledger.current() {
            match phase {
                Phase::Inhaling => {
                    let elapsed = now.duration_since(cycle.inhale_start).as_millis() as f32;
                    let denominator = cycle
                        .exhale_length()
                        .or_else(|| ledger.previous().and_then(|c| c.exhale_length()))
                        .map(|d| d.as_millis() as f32)
                        .filter(|ms| *ms > 0.0);
                    if let Some(denominator) = denominator {
                        ratio = elapsed / denominator;
                    }
                }
                Phase::Exhaling => {
                    let inhale_ms = cycle
                        .inhale_length()
                        .map(|d| d.as_millis() as f32)
                        .filter(|ms| *ms > 0.0);
                    if let (Some(inhale_ms), Some(exhale_start)) = (inhale_ms, cycle.exhale_start) {
                        let elapsed =
                            (now.duration_since(exhale_start).as_millis() as f32).max(1.0);
                        ratio = inhale_ms / elapsed;
                    }
                }
            }
        }

        ratio.clamp(self.config.min_ratio, self.config.max_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::BreathCycle;
    use std::time::Duration;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    fn estimator() -> RatioEstimator {
        RatioEstimator::new(RatioConfig::default())
    }

    fn completed_cycle(base: Instant, inhale_ms: u64, exhale_ms: u64) -> BreathCycle {
        let mut cycle = BreathCycle::begin(base);
        cycle.inhale_end = Some(at(base, inhale_ms));
        cycle.exhale_start = Some(at(base, inhale_ms));
        cycle.exhale_end = Some(at(base, inhale_ms + exhale_ms));
        cycle
    }

    #[test]
    fn empty_ledger_yields_default() {
        let ledger = CycleLedger::new();
        let ratio = estimator().current_ratio(&ledger, Phase::Exhaling, Instant::now());
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn inhaling_uses_previous_cycle_exhale() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();
        ledger.push(completed_cycle(base, 1000, 2000));
        // New cycle just opened at inhale onset
        ledger.push(BreathCycle::begin(at(base, 3000)));

        // 1s into the inhale against the previous 2s exhale
        let ratio = estimator().current_ratio(&ledger, Phase::Inhaling, at(base, 4000));
        assert!((ratio - 0.5).abs() < 1e-3);
    }

    #[test]
    fn inhaling_without_any_exhale_stays_default() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();
        ledger.push(BreathCycle::begin(base));

        let ratio = estimator().current_ratio(&ledger, Phase::Inhaling, at(base, 2500));
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn exhaling_divides_inhale_by_elapsed() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();
        let mut cycle = BreathCycle::begin(base);
        cycle.inhale_end = Some(at(base, 3000));
        cycle.exhale_start = Some(at(base, 3000));
        ledger.push(cycle);

        // 1.5s into the exhale: 3000 / 1500
        let ratio = estimator().current_ratio(&ledger, Phase::Exhaling, at(base, 4500));
        assert!((ratio - 2.0).abs() < 1e-3);
    }

    #[test]
    fn zero_elapsed_exhale_never_divides_by_zero() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();
        let mut cycle = BreathCycle::begin(base);
        cycle.inhale_end = Some(at(base, 3000));
        cycle.exhale_start = Some(at(base, 3000));
        ledger.push(cycle);

        // Queried at the exact exhale onset: denominator floors at 1ms,
        // result clamps at the upper bound.
        let ratio = estimator().current_ratio(&ledger, Phase::Exhaling, at(base, 3000));
        assert_eq!(ratio, 10.0);
    }

    #[test]
    fn output_clamped_to_bounds() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();
        ledger.push(completed_cycle(base, 1000, 50_000));
        ledger.push(BreathCycle::begin(at(base, 51_000)));

        // Barely into the inhale against a 50s exhale: far below 0.1
        let ratio = estimator().current_ratio(&ledger, Phase::Inhaling, at(base, 51_010));
        assert_eq!(ratio, 0.1);
    }
}
