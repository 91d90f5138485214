//! cave-survey - Algorithmic core for underwater cave surveying
//!
//! # Architecture
//!
//! The crate is organized into 6 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Executables
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   pipeline/                         │  ← Orchestration
//! │            (survey thread, status)                  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Infrastructure
//! │        (ply, exports, svg, settings)                │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │              survey/  tracking/  mesh/              │  ← Core algorithms
//! │   (stations, profile, path tracker, tube mesh)      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Sensor processing
//! │            (rotation, calibration)                  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! ## Rotation counting
//! - Magnetometer magnitude peak detection with hysteresis thresholds
//! - A magnet on the measuring wheel produces one peak per revolution
//! - Distance from revolution count and wheel circumference
//!
//! ## Calibration
//! - Instant calibration from the rolling magnitude history
//! - Guided countdown sessions with atomic threshold commit
//! - Percentile-based thresholds with a minimum gap
//!
//! ## Profile reconstruction
//! - Dead reckoning over manual stations (heading + distance)
//! - Mitered wall offsets from left/right measurements
//! - Closed passage outline for rendering and export
//!
//! ## Path tracking
//! - Throttled AR camera-pose logging with displacement gating
//! - Loop-closure detection against old waypoints
//! - Drift smeared back along the path as a linear ramp
//!
//! ## Tunnel meshing
//! - Per-station radius estimation from wall clouds (k-d tree)
//! - Median/mean/fallback radius selection with smoothing
//! - Triangulated tube with one vertex ring per station
//!
//! ## I/O
//! - Annotated ASCII PLY export/import for AR sessions
//! - CSV and Therion `data diving` exports
//! - SVG profile rendering, TOML settings persistence

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

pub mod error;

// ============================================================================
// Layer 2: Sensor processing (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Algorithms (depends on core, sensors)
// ============================================================================
pub mod mesh;
pub mod survey;
pub mod tracking;

// ============================================================================
// Layer 4: I/O infrastructure (depends on core, algorithms)
// ============================================================================
pub mod io;

// ============================================================================
// Layer 5: Pipeline orchestration (depends on all layers)
// ============================================================================
pub mod pipeline;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{PathWaypoint, Point2, Point3, RecordType, SurveyStation};
pub use error::{Result, SurveyError};

// Sensors
pub use sensors::{
    CalibrationEngine, RotationCounter, RotationCounterConfig, SessionTick, Thresholds,
    MIN_GUIDED_SAMPLES, MIN_INSTANT_SAMPLES, MIN_THRESHOLD_GAP,
};

// Survey
pub use survey::{
    last_manual_depth, last_recorded_distance, manual_stations, reconstruct, CaveProfile,
    JsonFileStore, MemoryStore, ProfileConfig, RecordStore,
};

// Tracking
pub use tracking::{DriftReport, DriftSeverity, PathTracker, PathTrackerConfig, SampleOutcome};

// Mesh
pub use mesh::{build_tube, estimate_radii, RadiusConfig, TubeConfig, TubeMesh};

// I/O
pub use io::{
    csv_export, parse_ply, render_profile_svg, split_cloud, therion_export, write_ply, CloudPoint,
    PlyCloud, SurveySettings, TherionConfig,
};

// Pipeline
pub use pipeline::{
    new_shared_status, SensorSample, SharedStatus, SurveyCommand, SurveyStatus, SurveyThread,
    SurveyThreadConfig,
};
