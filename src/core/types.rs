//! Core data types for survey records and path geometry.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D point in display units (used by profile reconstruction).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A 3D point in world units (AR tracking and point clouds).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point3) -> f32 {
        (*self - *other).length()
    }

    /// Unit vector in this direction. Returns `None` for near-zero vectors.
    #[inline]
    pub fn normalized(&self) -> Option<Point3> {
        let len = self.length();
        if len < 1e-9 {
            None
        } else {
            Some(Point3::new(self.x / len, self.y / len, self.z / len))
        }
    }

    #[inline]
    pub fn dot(&self, other: &Point3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Point3) -> Point3 {
        Point3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

impl Add for Point3 {
    type Output = Point3;
    #[inline]
    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Point3 {
    #[inline]
    fn add_assign(&mut self, rhs: Point3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Point3 {
    type Output = Point3;
    #[inline]
    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Point3 {
    type Output = Point3;
    #[inline]
    fn mul(self, s: f32) -> Point3 {
        Point3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Neg for Point3 {
    type Output = Point3;
    #[inline]
    fn neg(self) -> Point3 {
        Point3::new(-self.x, -self.y, -self.z)
    }
}

/// How a survey station was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Appended automatically on each detected wheel revolution.
    Auto,
    /// Saved explicitly by the diver with wall offsets.
    Manual,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::Auto => write!(f, "auto"),
            RecordType::Manual => write!(f, "manual"),
        }
    }
}

/// One survey station.
///
/// `distance` is cumulative from the survey start; `left`/`right`/`up`/`down`
/// are perpendicular wall distances in meters. Stations are immutable once
/// persisted and `record_number` values are assigned densely increasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyStation {
    #[serde(rename = "recordNumber")]
    pub record_number: u32,
    pub distance: f32,
    pub heading: f32,
    pub depth: f32,
    pub left: f32,
    pub right: f32,
    pub up: f32,
    pub down: f32,
    #[serde(rename = "rtype")]
    pub record_type: RecordType,
}

/// One logged camera-pose waypoint on the AR path.
///
/// Positions may be adjusted retroactively by loop-closure drift correction;
/// `drift_correction` records the magnitude of the last adjustment applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathWaypoint {
    pub position: Point3,
    pub cumulative_distance: f32,
    /// Compass heading at capture, degrees; -1 when unavailable.
    pub heading: f32,
    /// Vertical distance from the first waypoint, `|y - first.y|`.
    pub depth_from_start: f32,
    pub drift_correction: f32,
}
