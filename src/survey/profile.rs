//! 2D cave profile reconstruction from manual survey stations.
//!
//! Dead reckoning walks the centerline: each manual station's heading and
//! cumulative distance give one segment in screen coordinates (x east,
//! y down, so a positive-depth move decreases nothing but a northward move
//! decreases y). Wall polylines are offset from the centerline by each
//! station's left/right measurements; interior corners use mitered joins so
//! the walls stay parallel through turns, and the full passage outline is
//! the left wall followed by the reversed right wall.

use log::debug;

use crate::core::math::heading_to_math_rad;
use crate::core::types::{Point2, SurveyStation};
use crate::error::{Result, SurveyError};
use crate::survey::store::manual_stations;

/// Profile reconstruction parameters.
#[derive(Debug, Clone, Copy)]
pub struct ProfileConfig {
    /// Screen units per meter of surveyed distance.
    pub units_per_meter: f32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            units_per_meter: 20.0,
        }
    }
}

/// Reconstructed passage geometry in screen units.
///
/// `centerline` holds the origin followed by one point per manual station;
/// `angles`, `segment_distances`, `left_wall` and `right_wall` all have one
/// entry per manual station.
#[derive(Debug, Clone)]
pub struct CaveProfile {
    pub centerline: Vec<Point2>,
    /// Segment direction angles in math radians (0 = +x, CCW positive).
    pub angles: Vec<f32>,
    /// Segment lengths in meters.
    pub segment_distances: Vec<f32>,
    pub left_wall: Vec<Point2>,
    pub right_wall: Vec<Point2>,
}

impl CaveProfile {
    /// Closed passage outline: left wall forward, right wall backward.
    pub fn wall_polygon(&self) -> Vec<Point2> {
        let mut polygon = self.left_wall.clone();
        polygon.extend(self.right_wall.iter().rev().copied());
        polygon
    }

    /// Total surveyed length along the centerline, meters.
    pub fn total_length_m(&self) -> f32 {
        self.segment_distances.iter().sum()
    }
}

/// Reconstruct the profile from the manual stations in `stations`.
///
/// Needs at least two manual stations. Auto stations carry no wall
/// offsets and are ignored here.
pub fn reconstruct(stations: &[SurveyStation], config: &ProfileConfig) -> Result<CaveProfile> {
    let manual = manual_stations(stations);
    if manual.len() < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "profile reconstruction needs 2 manual stations, have {}",
            manual.len()
        )));
    }

    let k = config.units_per_meter;

    let mut centerline = Vec::with_capacity(manual.len() + 1);
    let mut angles = Vec::with_capacity(manual.len());
    let mut segment_distances = Vec::with_capacity(manual.len());

    let mut position = Point2::default();
    centerline.push(position);

    // Each station ends one shot drawn along its own heading; the first
    // shot starts at the origin, so the first station's cumulative
    // distance is walked in full.
    let mut previous_distance = 0.0;
    for station in &manual {
        let segment = (station.distance - previous_distance).max(0.0);
        previous_distance = station.distance;
        let angle = heading_to_math_rad(station.heading);
        position.x += k * segment * angle.cos();
        position.y -= k * segment * angle.sin();
        centerline.push(position);
        angles.push(angle);
        segment_distances.push(segment);
    }

    let left_wall = offset_wall(&centerline, &angles, &manual, k, WallSide::Left);
    let right_wall = offset_wall(&centerline, &angles, &manual, k, WallSide::Right);

    debug!(
        "profile: {} stations, {:.1} m centerline",
        manual.len(),
        segment_distances.iter().sum::<f32>()
    );

    Ok(CaveProfile {
        centerline,
        angles,
        segment_distances,
        left_wall,
        right_wall,
    })
}

#[derive(Clone, Copy)]
enum WallSide {
    Left,
    Right,
}

impl WallSide {
    /// Unit normal pointing from the centerline toward this wall for a
    /// segment at math angle `angle` in screen coordinates.
    fn normal(self, angle: f32) -> Point2 {
        match self {
            WallSide::Left => Point2::new(-angle.sin(), -angle.cos()),
            WallSide::Right => Point2::new(angle.sin(), angle.cos()),
        }
    }

    fn offset_m(self, station: &SurveyStation) -> f32 {
        match self {
            WallSide::Left => station.left,
            WallSide::Right => station.right,
        }
    }
}

fn offset_wall(
    centerline: &[Point2],
    angles: &[f32],
    stations: &[SurveyStation],
    units_per_meter: f32,
    side: WallSide,
) -> Vec<Point2> {
    let last = stations.len() - 1;
    let mut wall = Vec::with_capacity(stations.len());

    // Station i sits at centerline[i + 1]; the origin carries no offsets.
    for (i, station) in stations.iter().enumerate() {
        let point = centerline[i + 1];
        let distance = units_per_meter * side.offset_m(station);
        let offset = if i == 0 || i == last {
            perpendicular(side.normal(angles[i]), distance)
        } else {
            miter(side.normal(angles[i]), side.normal(angles[i + 1]), distance)
        };
        wall.push(Point2::new(point.x + offset.x, point.y + offset.y));
    }

    wall
}

#[inline]
fn perpendicular(normal: Point2, distance: f32) -> Point2 {
    Point2::new(normal.x * distance, normal.y * distance)
}

/// Mitered join offset between two adjoining segments.
///
/// Sum of the two segment normals, scaled so its projection on either
/// normal equals `distance`. Near-reversal corners make the projection
/// collapse toward zero; those fall back to the incoming perpendicular
/// so the wall point stays bounded.
fn miter(n_in: Point2, n_out: Point2, distance: f32) -> Point2 {
    let sum = Point2::new(n_in.x + n_out.x, n_in.y + n_out.y);
    let dot = sum.x * n_in.x + sum.y * n_in.y;
    if dot.abs() < 1e-3 {
        return perpendicular(n_in, distance);
    }
    let scale = distance / dot;
    Point2::new(sum.x * scale, sum.y * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RecordType;
    use approx::assert_relative_eq;

    fn manual(distance: f32, heading: f32, left: f32, right: f32) -> SurveyStation {
        SurveyStation {
            record_number: 0,
            distance,
            heading,
            depth: 0.0,
            left,
            right,
            up: 0.5,
            down: 0.5,
            record_type: RecordType::Manual,
        }
    }

    fn auto(distance: f32) -> SurveyStation {
        SurveyStation {
            record_number: 0,
            distance,
            heading: 0.0,
            depth: 0.0,
            left: 0.0,
            right: 0.0,
            up: 0.0,
            down: 0.0,
            record_type: RecordType::Auto,
        }
    }

    #[test]
    fn test_needs_two_manual_stations() {
        let config = ProfileConfig::default();
        assert!(reconstruct(&[], &config).is_err());
        let stations = vec![manual(0.0, 0.0, 1.0, 1.0), auto(0.5), auto(1.0)];
        assert!(reconstruct(&stations, &config).is_err());
    }

    #[test]
    fn test_straight_east_centerline() {
        // Heading 90 maps to math angle 0: +x only
        let stations = vec![manual(0.0, 90.0, 1.0, 1.0), manual(10.0, 90.0, 1.0, 1.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        assert_eq!(profile.centerline.len(), 3);
        assert_relative_eq!(profile.centerline[2].x, 200.0, epsilon = 1e-3);
        assert_relative_eq!(profile.centerline[2].y, 0.0, epsilon = 1e-3);
        assert_relative_eq!(profile.total_length_m(), 10.0);
    }

    #[test]
    fn test_first_station_raw_distance_is_a_segment() {
        // A first station at cumulative 5 m sits 5 m out from the origin
        let stations = vec![manual(5.0, 90.0, 1.0, 1.0), manual(15.0, 90.0, 1.0, 1.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        assert_relative_eq!(profile.segment_distances[0], 5.0);
        assert_relative_eq!(profile.segment_distances[1], 10.0);
        assert_relative_eq!(profile.total_length_m(), 15.0);
        assert_relative_eq!(profile.centerline[1].x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(profile.centerline[2].x, 300.0, epsilon = 1e-3);
    }

    #[test]
    fn test_straight_north_goes_up_screen() {
        // Heading 0 maps to math angle pi/2: y decreases
        let stations = vec![manual(0.0, 0.0, 1.0, 1.0), manual(10.0, 0.0, 1.0, 1.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        assert_relative_eq!(profile.centerline[2].x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(profile.centerline[2].y, -200.0, epsilon = 1e-3);
    }

    #[test]
    fn test_straight_walls_parallel_to_centerline() {
        let stations = vec![manual(0.0, 90.0, 2.0, 1.0), manual(10.0, 90.0, 2.0, 1.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        // Left wall 2 m above (y up is negative), right wall 1 m below
        let station_points = profile.centerline.iter().skip(1);
        for (wall, center) in profile.left_wall.iter().zip(station_points.clone()) {
            assert_relative_eq!(wall.x, center.x, epsilon = 1e-3);
            assert_relative_eq!(wall.y, center.y - 40.0, epsilon = 1e-3);
        }
        for (wall, center) in profile.right_wall.iter().zip(station_points) {
            assert_relative_eq!(wall.y, center.y + 20.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_first_wall_offset_uses_first_station_heading() {
        // North then east: the first wall point offsets west of the
        // northbound leg, not along whatever the next leg does
        let stations = vec![manual(1.0, 0.0, 1.0, 1.0), manual(2.0, 90.0, 1.0, 1.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        let station = profile.centerline[1];
        assert_relative_eq!(profile.left_wall[0].x, station.x - 20.0, epsilon = 1e-3);
        assert_relative_eq!(profile.left_wall[0].y, station.y, epsilon = 1e-3);
    }

    #[test]
    fn test_right_angle_turn_miter() {
        // North then east, constant 2 m walls
        let stations = vec![
            manual(0.0, 0.0, 2.0, 2.0),
            manual(10.0, 0.0, 2.0, 2.0),
            manual(20.0, 90.0, 2.0, 2.0),
        ];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        assert_relative_eq!(profile.centerline[2].y, -200.0, epsilon = 1e-3);
        assert_relative_eq!(profile.centerline[3].x, 200.0, epsilon = 1e-3);
        assert_relative_eq!(profile.centerline[3].y, -200.0, epsilon = 1e-3);

        // Interior miter at the corner: offset (-40, -40) on the left side
        let corner = profile.left_wall[1];
        assert_relative_eq!(corner.x, -40.0, epsilon = 1e-3);
        assert_relative_eq!(corner.y, -240.0, epsilon = 1e-3);

        // Right wall miters inward symmetrically
        let corner = profile.right_wall[1];
        assert_relative_eq!(corner.x, 40.0, epsilon = 1e-3);
        assert_relative_eq!(corner.y, -160.0, epsilon = 1e-3);
    }

    #[test]
    fn test_reversal_falls_back_to_perpendicular() {
        // 180 degree turn: miter denominator collapses
        let stations = vec![
            manual(0.0, 90.0, 1.0, 1.0),
            manual(10.0, 90.0, 1.0, 1.0),
            manual(20.0, 270.0, 1.0, 1.0),
        ];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        let corner = profile.left_wall[1];
        assert!(corner.x.is_finite() && corner.y.is_finite());
        // Bounded by the perpendicular fallback
        assert!(profile.centerline[2].distance(&corner) < 21.0);
    }

    #[test]
    fn test_polygon_closes_left_then_right_reversed() {
        let stations = vec![manual(0.0, 90.0, 1.0, 1.0), manual(10.0, 90.0, 1.0, 1.0)];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        let polygon = profile.wall_polygon();
        assert_eq!(polygon.len(), 4);
        assert_eq!(polygon[0], profile.left_wall[0]);
        assert_eq!(polygon[1], profile.left_wall[1]);
        assert_eq!(polygon[2], profile.right_wall[1]);
        assert_eq!(polygon[3], profile.right_wall[0]);
    }

    #[test]
    fn test_auto_stations_ignored() {
        let stations = vec![
            manual(0.0, 90.0, 1.0, 1.0),
            auto(3.0),
            auto(6.0),
            manual(10.0, 90.0, 1.0, 1.0),
        ];
        let profile = reconstruct(&stations, &ProfileConfig::default()).unwrap();
        assert_eq!(profile.centerline.len(), 3);
        assert_relative_eq!(profile.centerline[2].x, 200.0, epsilon = 1e-3);
    }
}
