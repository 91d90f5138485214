//! Profile Reconstruction Accuracy Tests
//!
//! Synthetic survey tests validating the dead-reckoning and wall-offset
//! geometry end to end, from station records through the reconstructed
//! polygon and its exports:
//! - Closed square survey return-to-origin accuracy
//! - Wall parallelism on straight passages
//! - Miter behavior through corners
//! - Therion/SVG export consistency with the geometry
//!
//! ## Accuracy Targets
//!
//! | Scenario | Closure Error |
//! |----------|---------------|
//! | Square 4x10m | < 0.1 units |
//! | Straight 30m walls | exact parallel |
//!
//! Run with: `cargo test --test profile_reconstruction`

use approx::assert_relative_eq;
use cave_survey::{
    csv_export, reconstruct, render_profile_svg, therion_export, CaveProfile, ProfileConfig,
    RecordType, SurveyStation, TherionConfig,
};

// ============================================================================
// Test Configuration
// ============================================================================

fn manual(distance: f32, heading: f32, depth: f32, left: f32, right: f32) -> SurveyStation {
    SurveyStation {
        record_number: 0,
        distance,
        heading,
        depth,
        left,
        right,
        up: 0.5,
        down: 0.5,
        record_type: RecordType::Manual,
    }
}

fn auto(distance: f32, heading: f32) -> SurveyStation {
    SurveyStation {
        record_number: 0,
        distance,
        heading,
        depth: 0.0,
        left: 0.0,
        right: 0.0,
        up: 0.0,
        down: 0.0,
        record_type: RecordType::Auto,
    }
}

/// Closed square: 10 m legs heading N, E, S, W.
fn square_survey() -> Vec<SurveyStation> {
    vec![
        manual(0.0, 0.0, 0.0, 1.0, 1.0),
        manual(10.0, 0.0, 0.0, 1.0, 1.0),
        manual(20.0, 90.0, 0.0, 1.0, 1.0),
        manual(30.0, 180.0, 0.0, 1.0, 1.0),
        manual(40.0, 270.0, 0.0, 1.0, 1.0),
    ]
}

fn profile(stations: &[SurveyStation]) -> CaveProfile {
    reconstruct(stations, &ProfileConfig::default()).expect("reconstruction should succeed")
}

// ============================================================================
// Centerline geometry
// ============================================================================

#[test]
fn test_square_survey_closes() {
    let profile = profile(&square_survey());
    assert_eq!(profile.centerline.len(), 6);
    let start = profile.centerline[0];
    let end = profile.centerline[5];
    assert_relative_eq!(start.distance(&end), 0.0, epsilon = 0.1);
    assert_relative_eq!(profile.total_length_m(), 40.0, epsilon = 1e-3);
}

#[test]
fn test_first_station_distance_extends_total_length() {
    // The survey origin is the dive start, not the first station: a first
    // station at cumulative 5 m contributes a 5 m opening shot
    let stations = vec![
        manual(5.0, 90.0, 0.0, 1.0, 1.0),
        manual(15.0, 90.0, 0.0, 1.0, 1.0),
    ];
    let profile = profile(&stations);
    assert_relative_eq!(profile.segment_distances[0], 5.0);
    assert_relative_eq!(profile.total_length_m(), 15.0, epsilon = 1e-3);
}

#[test]
fn test_segment_lengths_from_cumulative_distances() {
    let stations = vec![
        manual(0.0, 90.0, 0.0, 1.0, 1.0),
        manual(2.5, 90.0, 0.0, 1.0, 1.0),
        manual(10.0, 90.0, 0.0, 1.0, 1.0),
    ];
    let profile = profile(&stations);
    assert_relative_eq!(profile.segment_distances[0], 0.0);
    assert_relative_eq!(profile.segment_distances[1], 2.5);
    assert_relative_eq!(profile.segment_distances[2], 7.5);
    // 10 m at 20 units/m
    assert_relative_eq!(profile.centerline[3].x, 200.0, epsilon = 1e-3);
}

#[test]
fn test_auto_stations_do_not_disturb_geometry() {
    let mut with_auto = square_survey();
    with_auto.insert(1, auto(3.0, 0.0));
    with_auto.insert(4, auto(17.0, 90.0));

    let clean = profile(&square_survey());
    let noisy = profile(&with_auto);
    assert_eq!(clean.centerline.len(), noisy.centerline.len());
    for (a, b) in clean.centerline.iter().zip(&noisy.centerline) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-4);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-4);
    }
}

// ============================================================================
// Wall geometry
// ============================================================================

#[test]
fn test_straight_passage_walls_exactly_parallel() {
    let stations = vec![
        manual(0.0, 90.0, 0.0, 2.0, 1.5),
        manual(15.0, 90.0, 0.0, 2.0, 1.5),
        manual(30.0, 90.0, 0.0, 2.0, 1.5),
    ];
    let profile = profile(&stations);
    let station_points = profile.centerline.iter().skip(1);
    for (wall, center) in profile.left_wall.iter().zip(station_points.clone()) {
        assert_relative_eq!(wall.y - center.y, -40.0, epsilon = 1e-3);
        assert_relative_eq!(wall.x, center.x, epsilon = 1e-3);
    }
    for (wall, center) in profile.right_wall.iter().zip(station_points) {
        assert_relative_eq!(wall.y - center.y, 30.0, epsilon = 1e-3);
    }
}

#[test]
fn test_wall_polygon_has_expected_vertex_count() {
    let profile = profile(&square_survey());
    // left wall + reversed right wall
    assert_eq!(profile.wall_polygon().len(), 10);
}

#[test]
fn test_corner_miter_stays_bounded() {
    // Offsets stay near d * sqrt(2) through a 90 degree corner
    let stations = vec![
        manual(0.0, 0.0, 0.0, 2.0, 2.0),
        manual(10.0, 0.0, 0.0, 2.0, 2.0),
        manual(20.0, 90.0, 0.0, 2.0, 2.0),
    ];
    let profile = profile(&stations);
    let corner_offset = profile.centerline[2].distance(&profile.left_wall[1]);
    assert_relative_eq!(corner_offset, 40.0 * std::f32::consts::SQRT_2, epsilon = 0.1);
}

#[test]
fn test_varying_widths_follow_measurements() {
    let stations = vec![
        manual(0.0, 90.0, 0.0, 0.5, 0.5),
        manual(10.0, 90.0, 0.0, 3.0, 3.0),
        manual(20.0, 90.0, 0.0, 0.5, 0.5),
    ];
    let profile = profile(&stations);
    assert_relative_eq!(
        profile.centerline[2].distance(&profile.left_wall[1]),
        60.0,
        epsilon = 1e-3
    );
    assert_relative_eq!(
        profile.centerline[3].distance(&profile.left_wall[2]),
        10.0,
        epsilon = 1e-3
    );
}

// ============================================================================
// Exports stay consistent with the geometry
// ============================================================================

#[test]
fn test_therion_export_matches_station_deltas() {
    let stations = vec![
        manual(0.0, 0.0, 1.0, 1.0, 1.0),
        auto(5.0, 0.0),
        manual(10.0, 0.0, 4.0, 1.0, 1.0),
        manual(25.0, 90.0, 6.5, 2.0, 2.0),
    ];
    let text = therion_export(&stations, &TherionConfig::default()).unwrap();
    assert!(text.contains("0 1 10.0 0 3.0 1.0 1.0 0.5 0.5"));
    assert!(text.contains("1 2 15.0 90 2.5 2.0 2.0 0.5 0.5"));
    // Shot count equals manual station count minus one
    let shot_lines = text
        .lines()
        .filter(|l| l.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .count();
    assert_eq!(shot_lines, 2);
}

#[test]
fn test_csv_roundtrips_station_count() {
    let stations = square_survey();
    let csv = csv_export(&stations);
    assert_eq!(csv.lines().count(), stations.len() + 1);
}

#[test]
fn test_svg_scales_with_profile() {
    let small = profile(&[
        manual(0.0, 90.0, 0.0, 1.0, 1.0),
        manual(5.0, 90.0, 0.0, 1.0, 1.0),
    ]);
    let large = profile(&[
        manual(0.0, 90.0, 0.0, 1.0, 1.0),
        manual(50.0, 90.0, 0.0, 1.0, 1.0),
    ]);
    let small_svg = render_profile_svg(&small).to_string();
    let large_svg = render_profile_svg(&large).to_string();
    assert!(small_svg.contains("width=\"200\""));
    assert!(large_svg.contains("width=\"1100\""));
}
