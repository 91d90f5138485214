//! Per-station tunnel radius estimation.
//!
//! For each centerline point, the wall points within a search radius vote
//! on the local tunnel radius. A healthy neighborhood uses the median
//! distance so stray points cannot inflate the tube; a sparse one falls
//! back to the mean, and an empty one to a fixed default. The resulting
//! radius sequence is smoothed with a moving average so adjacent rings do
//! not pinch.

use kiddo::{KdTree, SquaredEuclidean};
use log::debug;

use crate::core::math::moving_average;
use crate::core::types::Point3;

/// Radius estimation tuning. Distances in meters.
#[derive(Debug, Clone, Copy)]
pub struct RadiusConfig {
    /// Wall points farther than this from a station are ignored.
    pub search_radius: f32,
    /// Neighborhoods at least this size use the median distance.
    pub min_neighbors: usize,
    /// Cap on neighbors fetched per station.
    pub max_neighbors: usize,
    /// Radius assigned when no wall point is in range.
    pub fallback_radius: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Moving-average window over the radius sequence.
    pub smooth_window: usize,
}

impl Default for RadiusConfig {
    fn default() -> Self {
        Self {
            search_radius: 5.0,
            min_neighbors: 10,
            max_neighbors: 200,
            fallback_radius: 0.5,
            min_radius: 0.1,
            max_radius: 5.0,
            smooth_window: 5,
        }
    }
}

fn build_kdtree(points: &[Point3]) -> KdTree<f32, 3> {
    let mut tree: KdTree<f32, 3> = KdTree::new();
    for (i, p) in points.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }
    tree
}

/// Estimate a smoothed radius for every centerline point from the wall
/// cloud. Returns one radius per centerline point; an empty wall cloud
/// yields the fallback radius everywhere.
pub fn estimate_radii(centerline: &[Point3], walls: &[Point3], config: &RadiusConfig) -> Vec<f32> {
    if centerline.is_empty() {
        return Vec::new();
    }
    if walls.is_empty() {
        return vec![config.fallback_radius; centerline.len()];
    }

    let tree = build_kdtree(walls);
    let max_sq = config.search_radius * config.search_radius;

    let raw: Vec<f32> = centerline
        .iter()
        .map(|p| {
            let neighbors =
                tree.nearest_n::<SquaredEuclidean>(&[p.x, p.y, p.z], config.max_neighbors);
            // nearest_n returns squared distances in ascending order
            let distances: Vec<f32> = neighbors
                .iter()
                .take_while(|n| n.distance <= max_sq)
                .map(|n| n.distance.sqrt())
                .collect();

            let radius = if distances.len() >= config.min_neighbors {
                distances[distances.len() / 2]
            } else if !distances.is_empty() {
                distances.iter().sum::<f32>() / distances.len() as f32
            } else {
                config.fallback_radius
            };
            radius.clamp(config.min_radius, config.max_radius)
        })
        .collect();

    let smoothed = moving_average(&raw, config.smooth_window);
    debug!(
        "estimated radii for {} stations from {} wall points",
        centerline.len(),
        walls.len()
    );
    smoothed
}
