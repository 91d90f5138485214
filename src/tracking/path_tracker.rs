//! Camera-pose path logging with loop-closure drift correction.
//!
//! Poses stream in at camera rate; the tracker throttles them to a fixed
//! interval, drops samples that barely moved, and keeps a polyline of
//! waypoints with cumulative distance and depth. When the path returns to
//! a previously visited spot, the accumulated tracking drift is measured
//! against the old waypoint and smeared back along the recent path as a
//! linear ramp, so the oldest geometry stays fixed and the newest moves
//! the most.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::core::types::{PathWaypoint, Point3};

/// Tracker tuning. Distances in meters, time in microseconds.
#[derive(Debug, Clone, Copy)]
pub struct PathTrackerConfig {
    /// Minimum time between accepted samples.
    pub update_interval_us: u64,
    /// Minimum movement since the last waypoint.
    pub min_displacement: f32,
    pub loop_closure_enabled: bool,
    /// Newest waypoints excluded from loop-match search.
    pub loop_search_exclusion: usize,
    /// Maximum distance to an old waypoint that counts as a revisit.
    pub loop_match_distance: f32,
    /// Drift below this is noise and is left alone.
    pub min_loop_drift: f32,
    /// Correction vector is clamped to this length.
    pub max_correction: f32,
    /// Segments bending sharper than this direction dot are not counted
    /// toward traveled distance.
    pub direction_gate_dot: f32,
    /// Segments shorter than this are not counted toward traveled distance.
    pub min_segment: f32,
}

impl Default for PathTrackerConfig {
    fn default() -> Self {
        Self {
            update_interval_us: 500_000,
            min_displacement: 0.3,
            loop_closure_enabled: true,
            loop_search_exclusion: 20,
            loop_match_distance: 0.5,
            min_loop_drift: 0.1,
            max_correction: 2.0,
            direction_gate_dot: 0.4,
            min_segment: 0.05,
        }
    }
}

/// What happened to one pose sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Arrived before the update interval elapsed.
    Throttled,
    /// Moved less than the displacement gate since the last waypoint.
    TooClose,
    /// Appended as a waypoint.
    Recorded {
        loop_closed: bool,
        /// Distance added to the running total (0 when gated out).
        counted_distance: f32,
    },
}

/// Path drift summary for the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftReport {
    /// Traveled distance minus straight-line start-to-end distance, meters.
    pub drift: f32,
    pub severity: DriftSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftSeverity {
    Green,
    Orange,
    Red,
}

impl DriftSeverity {
    fn from_drift(drift: f32) -> Self {
        if drift < 0.2 {
            DriftSeverity::Green
        } else if drift < 0.5 {
            DriftSeverity::Orange
        } else {
            DriftSeverity::Red
        }
    }
}

#[derive(Debug)]
pub struct PathTracker {
    config: PathTrackerConfig,
    waypoints: Vec<PathWaypoint>,
    comments: BTreeMap<usize, String>,
    total_distance: f32,
    last_update_us: Option<u64>,
}

impl PathTracker {
    pub fn new(config: PathTrackerConfig) -> Self {
        Self {
            config,
            waypoints: Vec::new(),
            comments: BTreeMap::new(),
            total_distance: 0.0,
            last_update_us: None,
        }
    }

    /// Feed one camera pose.
    ///
    /// `heading` is in compass degrees, -1 when unavailable. Timestamps
    /// must be monotonic.
    pub fn process(&mut self, position: Point3, heading: f32, timestamp_us: u64) -> SampleOutcome {
        if let Some(last) = self.last_update_us {
            if timestamp_us.saturating_sub(last) < self.config.update_interval_us {
                return SampleOutcome::Throttled;
            }
        }
        self.last_update_us = Some(timestamp_us);

        if let Some(last) = self.waypoints.last() {
            if position.distance(&last.position) < self.config.min_displacement {
                return SampleOutcome::TooClose;
            }
        }

        let mut position = position;
        let mut correction_len = 0.0;
        let mut loop_closed = false;
        if self.config.loop_closure_enabled {
            if let Some((match_index, correction)) = self.find_loop_closure(&position) {
                self.apply_correction(match_index, correction);
                position += correction;
                correction_len = correction.length();
                loop_closed = true;
            }
        }

        let counted = self.count_distance(&position);
        let depth = match self.waypoints.first() {
            Some(first) => (position.y - first.position.y).abs(),
            None => 0.0,
        };
        self.waypoints.push(PathWaypoint {
            position,
            cumulative_distance: self.total_distance,
            heading,
            depth_from_start: depth,
            drift_correction: correction_len,
        });

        SampleOutcome::Recorded {
            loop_closed,
            counted_distance: counted,
        }
    }

    /// Look for an old waypoint close to `position`.
    ///
    /// The newest `loop_search_exclusion` waypoints are skipped so the
    /// path cannot match against itself immediately. Returns the matched
    /// index and the clamped correction vector.
    fn find_loop_closure(&self, position: &Point3) -> Option<(usize, Point3)> {
        if self.waypoints.len() <= self.config.loop_search_exclusion {
            return None;
        }
        let eligible = &self.waypoints[..self.waypoints.len() - self.config.loop_search_exclusion];

        let mut best: Option<(usize, f32)> = None;
        for (i, waypoint) in eligible.iter().enumerate() {
            let d = position.distance(&waypoint.position);
            if d < self.config.loop_match_distance {
                match best {
                    Some((_, best_d)) if best_d <= d => {}
                    _ => best = Some((i, d)),
                }
            }
        }

        let (match_index, drift) = best?;
        if drift <= self.config.min_loop_drift {
            return None;
        }

        let mut correction = self.waypoints[match_index].position - *position;
        if correction.length() > self.config.max_correction {
            if let Some(unit) = correction.normalized() {
                correction = unit * self.config.max_correction;
            }
        }
        info!(
            "loop closure at waypoint {match_index}: drift {drift:.2} m, correcting {:.2} m",
            correction.length()
        );
        Some((match_index, correction))
    }

    /// Smear `correction` over the waypoints after `match_index` as a
    /// linear ramp. The matched waypoint itself gets zero, the incoming
    /// point (added by the caller) gets the full vector, so the join is
    /// continuous and already-anchored geometry never moves.
    fn apply_correction(&mut self, match_index: usize, correction: Point3) {
        let span = (self.waypoints.len() - match_index) as f32;
        let start_y = self.waypoints[0].position.y;
        for i in match_index..self.waypoints.len() {
            let t = (i - match_index) as f32 / span;
            let shift = correction * t;
            let waypoint = &mut self.waypoints[i];
            waypoint.position += shift;
            waypoint.drift_correction = shift.length();
            if i > 0 {
                waypoint.depth_from_start = (waypoint.position.y - start_y).abs();
            }
        }
        debug!(
            "drift ramp over {} waypoints",
            self.waypoints.len() - match_index
        );
    }

    /// Add the new segment to the running distance, unless it is too short
    /// or bends sharply against the previous segment (tracking glitches
    /// show up as sudden direction reversals).
    fn count_distance(&mut self, position: &Point3) -> f32 {
        let last = match self.waypoints.last() {
            Some(last) => last,
            None => return 0.0,
        };
        let segment = position.distance(&last.position);
        if segment <= self.config.min_segment {
            return 0.0;
        }

        // The first two segments always count; there is no stable previous
        // direction to compare against yet
        if self.waypoints.len() >= 3 {
            let previous = &self.waypoints[self.waypoints.len() - 2];
            let prev_dir = (last.position - previous.position).normalized();
            let new_dir = (*position - last.position).normalized();
            if let (Some(prev_dir), Some(new_dir)) = (prev_dir, new_dir) {
                if prev_dir.dot(&new_dir) <= self.config.direction_gate_dot {
                    return 0.0;
                }
            }
        }

        self.total_distance += segment;
        segment
    }

    /// Attach a text note to the most recent waypoint.
    ///
    /// Returns the waypoint index, or `None` when the path is empty.
    pub fn add_comment(&mut self, text: impl Into<String>) -> Option<usize> {
        let index = self.waypoints.len().checked_sub(1)?;
        self.comments.insert(index, text.into());
        Some(index)
    }

    /// Closed-loop drift estimate; `None` until two waypoints exist.
    pub fn drift_report(&self) -> Option<DriftReport> {
        let first = self.waypoints.first()?;
        let last = self.waypoints.last()?;
        if self.waypoints.len() < 2 {
            return None;
        }
        let drift = (self.total_distance - first.position.distance(&last.position)).max(0.0);
        Some(DriftReport {
            drift,
            severity: DriftSeverity::from_drift(drift),
        })
    }

    pub fn waypoints(&self) -> &[PathWaypoint] {
        &self.waypoints
    }

    pub fn comments(&self) -> &BTreeMap<usize, String> {
        &self.comments
    }

    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    /// Deepest point reached relative to the start.
    pub fn max_depth(&self) -> f32 {
        self.waypoints
            .iter()
            .map(|w| w.depth_from_start)
            .fold(0.0, f32::max)
    }

    pub fn reset(&mut self) {
        self.waypoints.clear();
        self.comments.clear();
        self.total_distance = 0.0;
        self.last_update_us = None;
    }
}
