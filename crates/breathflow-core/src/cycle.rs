//! Breath cycle records and the bounded cycle ledger

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How many completed/in-progress cycles the ledger keeps
pub const LEDGER_CAPACITY: usize = 5;

/// One detected breath: an inhale segment followed by an exhale segment.
///
/// A cycle is opened at inhale onset and mutated in place by the phase
/// detector as transitions close its segments. Lengths are derived and only
/// available once both endpoints of a segment are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathCycle {
    /// When the inhale began (always known; a cycle starts at inhale onset)
    pub inhale_start: Instant,
    /// When the inhale ended, set at the following exhale onset
    pub inhale_end: Option<Instant>,
    /// When the exhale began, set at the same exhale onset
    pub exhale_start: Option<Instant>,
    /// When the exhale ended, set at the next inhale onset
    pub exhale_end: Option<Instant>,
}

impl BreathCycle {
    /// Open a new cycle at inhale onset
    pub fn begin(now: Instant) -> Self {
        Self {
            inhale_start: now,
            inhale_end: None,
            exhale_start: None,
            exhale_end: None,
        }
    }

    /// Inhale duration, once the inhale segment is closed
    pub fn inhale_length(&self) -> Option<Duration> {
        self.inhale_end
            .map(|end| end.duration_since(self.inhale_start))
    }

    /// Exhale duration, once the exhale segment is closed
    pub fn exhale_length(&self) -> Option<Duration> {
        match (self.exhale_start, self.exhale_end) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Whether both segments are closed
    pub fn is_complete(&self) -> bool {
        self.inhale_end.is_some() && self.exhale_end.is_some()
    }
}

/// Bounded, ordered history of breath cycles.
///
/// At most one cycle is in progress at any time and it is always the last
/// entry; pushing past capacity evicts the oldest cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleLedger {
    cycles: VecDeque<BreathCycle>,
}

impl CycleLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cycle, evicting the oldest past capacity
    pub fn push(&mut self, cycle: BreathCycle) {
        self.cycles.push_back(cycle);
        while self.cycles.len() > LEDGER_CAPACITY {
            self.cycles.pop_front();
        }
    }

    /// The newest cycle (the in-progress one, if any is open)
    pub fn current(&self) -> Option<&BreathCycle> {
        self.cycles.back()
    }

    /// Mutable access to the newest cycle, for the phase detector
    pub fn current_mut(&mut self) -> Option<&mut BreathCycle> {
        self.cycles.back_mut()
    }

    /// The cycle immediately before the newest one
    pub fn previous(&self) -> Option<&BreathCycle> {
        let n = self.cycles.len();
        if n < 2 {
            return None;
        }
        self.cycles.get(n - 2)
    }

    /// Read-only iteration, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &BreathCycle> {
        self.cycles.iter()
    }

    /// Number of cycles held
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// True when no cycle has been detected yet
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Drop all cycles
    pub fn clear(&mut self) {
        self.cycles.clear();
    }

    /// Mean inhale duration over all cycles except the newest.
    ///
    /// The newest cycle is excluded because its segments may still be open;
    /// used to project progress through the in-progress segment.
    pub fn average_inhale(&self) -> Option<Duration> {
        Self::average(self.past_cycles().filter_map(BreathCycle::inhale_length))
    }

    /// Mean exhale duration over all cycles except the newest
    pub fn average_exhale(&self) -> Option<Duration> {
        Self::average(self.past_cycles().filter_map(BreathCycle::exhale_length))
    }

    fn past_cycles(&self) -> impl Iterator<Item = &BreathCycle> {
        let n = self.cycles.len();
        self.cycles.iter().take(n.saturating_sub(1))
    }

    fn average(lengths: impl Iterator<Item = Duration>) -> Option<Duration> {
        let mut total = Duration::ZERO;
        let mut count = 0u32;
        for length in lengths {
            total += length;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(total / count)
        }
    }
}
