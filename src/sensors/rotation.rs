//! Wheel revolution counting from magnetic-field magnitude.
//!
//! A magnet on the measuring wheel sweeps past the phone once per
//! revolution, producing one magnitude peak per turn. Counting uses a
//! two-threshold hysteresis machine: a sample above the high threshold
//! counts a revolution and disarms the detector, and the detector re-arms
//! only once the magnitude falls below the low threshold. Oscillation
//! between the two thresholds is rejected as chatter.

use std::collections::VecDeque;

use super::calibration::Thresholds;
use crate::core::math::round2;

/// Configuration for the rotation counter.
#[derive(Debug, Clone, Copy)]
pub struct RotationCounterConfig {
    /// Hysteresis thresholds in sensor units.
    pub thresholds: Thresholds,

    /// Measuring wheel circumference in centimeters.
    pub wheel_circumference_cm: f32,

    /// Rolling magnitude history capacity (used by instant calibration).
    pub history_capacity: usize,
}

impl Default for RotationCounterConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            wheel_circumference_cm: 11.78,
            history_capacity: 50,
        }
    }
}

/// Peak-detecting revolution counter.
///
/// States: armed (`ready_for_peak`) and waiting-for-valley. Every processed
/// sample also lands in a bounded FIFO history buffer regardless of mode,
/// so instant calibration always has recent data to work with.
#[derive(Debug)]
pub struct RotationCounter {
    config: RotationCounterConfig,
    ready_for_peak: bool,
    revolutions: u32,
    history: VecDeque<f32>,
}

impl RotationCounter {
    pub fn new(config: RotationCounterConfig) -> Self {
        let capacity = config.history_capacity;
        Self {
            config,
            ready_for_peak: true,
            revolutions: 0,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Process one magnitude sample.
    ///
    /// Returns `true` when the sample completed a new revolution.
    pub fn process(&mut self, magnitude: f32) -> bool {
        self.record_sample(magnitude);
        self.detect_peak(magnitude)
    }

    /// Append a sample to the rolling history without peak detection.
    ///
    /// Used while a guided calibration session is active: the history keeps
    /// filling but no revolutions are counted.
    pub fn record_sample(&mut self, magnitude: f32) {
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(magnitude);
    }

    fn detect_peak(&mut self, magnitude: f32) -> bool {
        if self.ready_for_peak && magnitude > self.config.thresholds.high {
            self.revolutions += 1;
            self.ready_for_peak = false;
            return true;
        }
        if !self.ready_for_peak && magnitude < self.config.thresholds.low {
            self.ready_for_peak = true;
        }
        false
    }

    /// Replace the hysteresis thresholds (after a calibration commit).
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.config.thresholds = thresholds;
    }

    pub fn thresholds(&self) -> Thresholds {
        self.config.thresholds
    }

    pub fn revolutions(&self) -> u32 {
        self.revolutions
    }

    /// Restore a revolution count loaded from persistence.
    pub fn set_revolutions(&mut self, revolutions: u32) {
        self.revolutions = revolutions;
    }

    /// Traveled distance in meters.
    pub fn distance_m(&self) -> f32 {
        self.revolutions as f32 * self.config.wheel_circumference_cm / 100.0
    }

    /// Traveled distance rounded to centimeter precision, as recorded in
    /// auto stations.
    pub fn rounded_distance_m(&self) -> f32 {
        round2(self.distance_m())
    }

    /// Recent magnitude samples, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Clear the revolution count, the latch and the history.
    pub fn reset(&mut self) {
        self.ready_for_peak = true;
        self.revolutions = 0;
        self.history.clear();
    }
}
