//! AR path tracking with loop-closure drift correction.

pub mod path_tracker;

pub use path_tracker::{
    DriftReport, DriftSeverity, PathTracker, PathTrackerConfig, SampleOutcome,
};
