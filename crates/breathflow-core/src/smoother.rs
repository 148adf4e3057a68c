//! Two-stage exponential smoothing of the raw amplitude signal
//!
//! The raw signal is cascaded through two progressively heavier exponential
//! moving averages: level 1 tracks short breath-rate fluctuations, level 2
//! approximates a slow envelope ("bandsaw-like") that the phase detector
//! reads. All three series are kept in bounded histories so the rendering
//! collaborator can draw them.

use std::collections::VecDeque;

use crate::config::SmootherConfig;

/// One smoothed sample: the raw value plus both smoothing levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedSample {
    /// Raw amplitude as delivered by the audio collaborator
    pub raw: f32,
    /// First-stage EMA value
    pub level1: f32,
    /// Second-stage ("super-smoothed") EMA value
    pub level2: f32,
}

/// Cascaded EMA smoother with bounded parallel histories
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    config: SmootherConfig,
    raw: VecDeque<f32>,
    level1: VecDeque<f32>,
    level2: VecDeque<f32>,
}

impl SignalSmoother {
    /// Create a new smoother
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            raw: VecDeque::with_capacity(config.history_len),
            level1: VecDeque::with_capacity(config.history_len),
            level2: VecDeque::with_capacity(config.history_len),
        }
    }

    /// Ingest one raw sample and return all three values for this tick.
    ///
    /// The first sample seeds both EMA stages directly.
    pub fn ingest(&mut self, raw: f32) -> SmoothedSample {
        let level1 = match self.level1.back() {
            Some(prev) => prev * (1.0 - self.config.level1_alpha) + raw * self.config.level1_alpha,
            None => raw,
        };
        let level2 = match self.level2.back() {
            Some(prev) => {
                prev * (1.0 - self.config.level2_alpha) + level1 * self.config.level2_alpha
            }
            None => level1,
        };

        Self::push_capped(&mut self.raw, raw, self.config.history_len);
        Self::push_capped(&mut self.level1, level1, self.config.history_len);
        Self::push_capped(&mut self.level2, level2, self.config.history_len);

        SmoothedSample { raw, level1, level2 }
    }

    fn push_capped(series: &mut VecDeque<f32>, value: f32, cap: usize) {
        series.push_back(value);
        while series.len() > cap {
            series.pop_front();
        }
    }

    /// Whether the level-2 envelope is trending upward.
    ///
    /// Compares the newest level-2 value against the one two samples back;
    /// reports `false` until three samples exist.
    pub fn trend_increasing(&self) -> bool {
        let n = self.level2.len();
        if n < 3 {
            return false;
        }
        self.level2[n - 1] > self.level2[n - 3]
    }

    /// Most recent level-2 value, if any sample has been ingested
    pub fn last_level2(&self) -> Option<f32> {
        self.level2.back().copied()
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// True before the first sample arrives
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Read-only view of the raw series
    pub fn raw_series(&self) -> &VecDeque<f32> {
        &self.raw
    }

    /// Read-only view of the level-1 series
    pub fn level1_series(&self) -> &VecDeque<f32> {
        &self.level1
    }

    /// Read-only view of the level-2 series
    pub fn level2_series(&self) -> &VecDeque<f32> {
        &self.level2
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.raw.clear();
        self.level1.clear();
        self.level2.clear();
    }
}
