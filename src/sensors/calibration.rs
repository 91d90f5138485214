//! Threshold calibration from magnitude samples.
//!
//! Two paths produce hysteresis thresholds:
//!
//! - Instant calibration reads the counter's rolling history in place and
//!   derives thresholds from its 30th/70th percentiles.
//! - A guided session collects samples for a fixed countdown while the user
//!   spins the wheel, then commits percentile thresholds atomically. If the
//!   session ends with too few samples the previous thresholds survive.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::math::percentile;
use crate::error::{Result, SurveyError};

/// Minimum separation enforced between low and high thresholds.
pub const MIN_THRESHOLD_GAP: f32 = 20.0;

/// Fewest history samples accepted for instant calibration.
pub const MIN_INSTANT_SAMPLES: usize = 10;

/// Fewest session samples accepted for a guided calibration commit.
pub const MIN_GUIDED_SAMPLES: usize = 100;

/// Hysteresis threshold pair. Invariant: `high >= low + MIN_THRESHOLD_GAP`
/// for any calibrated pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 1130.0,
            high: 1200.0,
        }
    }
}

impl Thresholds {
    /// Build a pair from raw percentile values, widening the high side when
    /// the two are closer than the minimum gap.
    pub fn with_min_gap(low: f32, high: f32) -> Self {
        if high - low < MIN_THRESHOLD_GAP {
            Self {
                low,
                high: low + MIN_THRESHOLD_GAP,
            }
        } else {
            Self { low, high }
        }
    }
}

/// Active guided calibration session.
#[derive(Debug)]
struct CalibrationSession {
    seconds_remaining: u32,
    samples: Vec<f32>,
}

/// Outcome of one countdown tick of a guided session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionTick {
    /// No session is running.
    Idle,
    /// Session still counting down; payload is seconds remaining.
    Counting(u32),
    /// Session finished and new thresholds were committed.
    Committed(Thresholds),
    /// Session finished without enough samples; thresholds unchanged.
    Aborted { samples: usize },
}

/// Owns the current thresholds and both calibration paths.
#[derive(Debug)]
pub struct CalibrationEngine {
    thresholds: Thresholds,
    calibrated: bool,
    session: Option<CalibrationSession>,
}

impl Default for CalibrationEngine {
    fn default() -> Self {
        Self::new(Thresholds::default(), false)
    }
}

impl CalibrationEngine {
    pub fn new(thresholds: Thresholds, calibrated: bool) -> Self {
        Self {
            thresholds,
            calibrated,
            session: None,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Install thresholds loaded from persisted settings.
    pub fn set_thresholds(&mut self, thresholds: Thresholds, calibrated: bool) {
        self.thresholds = thresholds;
        self.calibrated = calibrated;
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn is_calibrating(&self) -> bool {
        self.session.is_some()
    }

    /// Calibrate from the counter's recent magnitude history.
    ///
    /// Requires at least [`MIN_INSTANT_SAMPLES`] values; commits
    /// `p30`/`p70` with the minimum gap applied.
    pub fn instant(&mut self, history: &[f32]) -> Result<Thresholds> {
        if history.len() < MIN_INSTANT_SAMPLES {
            return Err(SurveyError::InsufficientData(format!(
                "instant calibration needs {} samples, have {}",
                MIN_INSTANT_SAMPLES,
                history.len()
            )));
        }

        let mut sorted = history.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let low = percentile(&sorted, 30.0);
        let high = percentile(&sorted, 70.0);
        let thresholds = Thresholds::with_min_gap(low, high);

        info!(
            "instant calibration from {} samples: low={:.1} high={:.1}",
            history.len(),
            thresholds.low,
            thresholds.high
        );

        self.thresholds = thresholds;
        self.calibrated = true;
        Ok(thresholds)
    }

    /// Start a guided session lasting `duration_secs` seconds.
    ///
    /// Returns `false` if a session is already running.
    pub fn begin_session(&mut self, duration_secs: u32) -> bool {
        if self.session.is_some() {
            return false;
        }
        info!("guided calibration started ({duration_secs}s)");
        self.session = Some(CalibrationSession {
            seconds_remaining: duration_secs,
            samples: Vec::new(),
        });
        true
    }

    /// Feed one magnitude sample to the running session.
    ///
    /// Returns `true` when a session consumed the sample.
    pub fn add_sample(&mut self, magnitude: f32) -> bool {
        match &mut self.session {
            Some(session) => {
                session.samples.push(magnitude);
                true
            }
            None => false,
        }
    }

    /// Advance the session countdown by one second.
    ///
    /// At zero the session either commits new thresholds or aborts when
    /// fewer than [`MIN_GUIDED_SAMPLES`] samples arrived. Commit and abort
    /// both end the session.
    pub fn tick(&mut self) -> SessionTick {
        let session = match &mut self.session {
            Some(session) => session,
            None => return SessionTick::Idle,
        };

        if session.seconds_remaining > 1 {
            session.seconds_remaining -= 1;
            return SessionTick::Counting(session.seconds_remaining);
        }

        let session = self.session.take().unwrap_or(CalibrationSession {
            seconds_remaining: 0,
            samples: Vec::new(),
        });
        self.finish_session(session.samples)
    }

    fn finish_session(&mut self, mut samples: Vec<f32>) -> SessionTick {
        if samples.len() < MIN_GUIDED_SAMPLES {
            warn!(
                "guided calibration aborted: {} of {} required samples",
                samples.len(),
                MIN_GUIDED_SAMPLES
            );
            return SessionTick::Aborted {
                samples: samples.len(),
            };
        }

        samples.sort_by(|a, b| a.total_cmp(b));

        let p10 = percentile(&samples, 10.0);
        let p90 = percentile(&samples, 90.0);
        debug!("guided calibration spread: p10={p10:.1} p90={p90:.1}");

        let low = percentile(&samples, 30.0);
        let high = percentile(&samples, 70.0);
        let thresholds = Thresholds::with_min_gap(low, high);

        info!(
            "guided calibration committed from {} samples: low={:.1} high={:.1}",
            samples.len(),
            thresholds.low,
            thresholds.high
        );

        self.thresholds = thresholds;
        self.calibrated = true;
        SessionTick::Committed(thresholds)
    }

    /// Abandon a running session without touching the thresholds.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            info!("guided calibration cancelled");
        }
    }

    /// Drop back to the default uncalibrated thresholds.
    pub fn reset_calibration(&mut self) {
        self.session = None;
        self.thresholds = Thresholds::default();
        self.calibrated = false;
    }
}
