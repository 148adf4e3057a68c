//! Easing curves and breath-progress projection for the renderer
//!
//! The rendering collaborator animates a marker along a quadratic easing
//! curve: ease-in during an inhale, ease-out during an exhale. Progress
//! through the in-progress segment is projected against the average length of
//! that segment over previous cycles.

use std::time::{Duration, Instant};

use crate::cycle::CycleLedger;
use crate::detector::Phase;

/// Segment length assumed until the ledger has history
const DEFAULT_SEGMENT: Duration = Duration::from_millis(2000);

/// Which easing curve the renderer should draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasingMode {
    /// Quadratic ease-in: slow start, fast end
    EaseIn,
    /// Quadratic ease-out: fast start, slow end
    EaseOut,
}

impl From<Phase> for EasingMode {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Inhaling => EasingMode::EaseIn,
            Phase::Exhaling => EasingMode::EaseOut,
        }
    }
}

/// Quadratic ease-in
pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

/// Quadratic ease-out
pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

/// Progress through the in-progress breath segment, in [0, 1].
///
/// Elapsed time is measured against the average completed length of the same
/// segment across previous cycles, falling back to 2 s with no history.
/// Returns 0.0 before the first cycle opens.
pub fn breath_progress(ledger: &CycleLedger, phase: Phase, now: Instant) -> f32 {
    let Some(cycle) = ledger.current() else {
        return 0.0;
    };

    let (elapsed, estimate) = match phase {
        Phase::Inhaling => (
            now.duration_since(cycle.inhale_start),
            ledger.average_inhale().unwrap_or(DEFAULT_SEGMENT),
        ),
        Phase::Exhaling => match cycle.exhale_start {
            Some(start) => (
                now.duration_since(start),
                ledger.average_exhale().unwrap_or(DEFAULT_SEGMENT),
            ),
            None => return 0.0,
        },
    };

    let estimate_ms = (estimate.as_millis() as f32).max(1.0);
    (elapsed.as_millis() as f32 / estimate_ms).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::BreathCycle;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn curves_hit_endpoints() {
        assert_eq!(ease_in_quad(0.0), 0.0);
        assert_eq!(ease_in_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        // Ease-in lags, ease-out leads at the midpoint
        assert!(ease_in_quad(0.5) < 0.5);
        assert!(ease_out_quad(0.5) > 0.5);
    }

    #[test]
    fn progress_zero_without_cycles() {
        let ledger = CycleLedger::new();
        assert_eq!(
            breath_progress(&ledger, Phase::Inhaling, Instant::now()),
            0.0
        );
    }

    #[test]
    fn progress_uses_default_estimate_without_history() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();
        ledger.push(BreathCycle::begin(base));

        // 1s into an inhale against the 2s default
        let progress = breath_progress(&ledger, Phase::Inhaling, at(base, 1000));
        assert!((progress - 0.5).abs() < 1e-3);
    }

    #[test]
    fn progress_clamps_at_one() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();
        ledger.push(BreathCycle::begin(base));

        let progress = breath_progress(&ledger, Phase::Inhaling, at(base, 30_000));
        assert_eq!(progress, 1.0);
    }

    #[test]
    fn exhale_progress_uses_average_history() {
        let base = Instant::now();
        let mut ledger = CycleLedger::new();

        let mut first = BreathCycle::begin(base);
        first.inhale_end = Some(at(base, 1000));
        first.exhale_start = Some(at(base, 1000));
        first.exhale_end = Some(at(base, 5000));
        ledger.push(first);

        let mut current = BreathCycle::begin(at(base, 5000));
        current.inhale_end = Some(at(base, 6000));
        current.exhale_start = Some(at(base, 6000));
        ledger.push(current);

        // 1s into the exhale against the previous 4s exhale
        let progress = breath_progress(&ledger, Phase::Exhaling, at(base, 7000));
        assert!((progress - 0.25).abs() < 1e-3);
    }
}
