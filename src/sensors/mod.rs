//! Sensor processing: revolution counting and threshold calibration.

pub mod calibration;
pub mod rotation;

pub use calibration::{
    CalibrationEngine, SessionTick, Thresholds, MIN_GUIDED_SAMPLES, MIN_INSTANT_SAMPLES,
    MIN_THRESHOLD_GAP,
};
pub use rotation::{RotationCounter, RotationCounterConfig};
