//! Shared status published by the survey thread.
//!
//! The UI (or a CLI front end) reads this snapshot at its own rate; the
//! survey thread overwrites it after every processed sample or command.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::sensors::calibration::Thresholds;

/// Live survey snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SurveyStatus {
    pub revolutions: u32,
    /// Traveled distance in meters.
    pub distance_m: f32,
    pub thresholds: Thresholds,
    pub calibrated: bool,
    pub calibrating: bool,
    /// Seconds left in a guided calibration session, 0 when idle.
    pub calibration_seconds_left: u32,
    /// Stations appended since the thread started.
    pub station_count: u32,
    /// Most recent compass heading, degrees; -1 before the first sample.
    pub last_heading: f32,
}

impl Default for SurveyStatus {
    fn default() -> Self {
        Self {
            revolutions: 0,
            distance_m: 0.0,
            thresholds: Thresholds::default(),
            calibrated: false,
            calibrating: false,
            calibration_seconds_left: 0,
            station_count: 0,
            last_heading: -1.0,
        }
    }
}

/// Handle type for the shared status (Arc<RwLock<SurveyStatus>>).
pub type SharedStatus = Arc<RwLock<SurveyStatus>>;

/// Create a fresh shared status handle.
pub fn new_shared_status() -> SharedStatus {
    Arc::new(RwLock::new(SurveyStatus::default()))
}
