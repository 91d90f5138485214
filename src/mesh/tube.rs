//! Triangulated tube construction along a centerline.
//!
//! One vertex ring per centerline point, oriented by a parallel-transport
//! style frame from the local tangent, then two triangles per quad between
//! adjacent rings.

use std::io::Write;

use log::debug;

use crate::core::types::Point3;
use crate::error::{Result, SurveyError};

const UP: Point3 = Point3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};
const X_AXIS: Point3 = Point3 {
    x: 1.0,
    y: 0.0,
    z: 0.0,
};

#[derive(Debug, Clone, Copy)]
pub struct TubeConfig {
    /// Vertices per ring.
    pub sides: usize,
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self { sides: 16 }
    }
}

/// Indexed triangle mesh.
#[derive(Debug, Clone)]
pub struct TubeMesh {
    pub vertices: Vec<Point3>,
    /// Triangle list, three indices per face.
    pub indices: Vec<u32>,
}

impl TubeMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Write the mesh as Wavefront OBJ.
    pub fn write_obj<W: Write>(&self, writer: &mut W) -> Result<()> {
        for v in &self.vertices {
            writeln!(writer, "v {:.4} {:.4} {:.4}", v.x, v.y, v.z)?;
        }
        for face in self.indices.chunks_exact(3) {
            // OBJ indices are 1-based
            writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
        }
        Ok(())
    }
}

/// Build a tube with one ring per centerline point.
///
/// `radii` must have one entry per centerline point; at least two points
/// are needed.
pub fn build_tube(centerline: &[Point3], radii: &[f32], config: &TubeConfig) -> Result<TubeMesh> {
    if centerline.len() < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "tube needs 2 centerline points, have {}",
            centerline.len()
        )));
    }
    if radii.len() != centerline.len() {
        return Err(SurveyError::Config(format!(
            "radius count {} does not match centerline count {}",
            radii.len(),
            centerline.len()
        )));
    }

    let sides = config.sides.max(3);
    let mut vertices = Vec::with_capacity(centerline.len() * sides);

    let mut previous_tangent = X_AXIS;
    for (i, point) in centerline.iter().enumerate() {
        let tangent = tangent_at(centerline, i).unwrap_or(previous_tangent);
        previous_tangent = tangent;

        let (normal, right) = ring_basis(tangent);
        let radius = radii[i];
        for s in 0..sides {
            let a = s as f32 / sides as f32 * std::f32::consts::TAU;
            vertices.push(*point + normal * (radius * a.cos()) + right * (radius * a.sin()));
        }
    }

    let mut indices = Vec::with_capacity((centerline.len() - 1) * sides * 6);
    for ring in 0..centerline.len() - 1 {
        let base = (ring * sides) as u32;
        let next = ((ring + 1) * sides) as u32;
        for s in 0..sides as u32 {
            let s1 = (s + 1) % sides as u32;
            let (a0, a1) = (base + s, base + s1);
            let (b0, b1) = (next + s, next + s1);
            indices.extend_from_slice(&[a0, b0, a1]);
            indices.extend_from_slice(&[a1, b0, b1]);
        }
    }

    debug!(
        "tube mesh: {} vertices, {} triangles",
        vertices.len(),
        indices.len() / 3
    );
    Ok(TubeMesh { vertices, indices })
}

/// Unit tangent at point `i`: central difference in the interior, one-sided
/// at the ends. `None` when the neighboring points coincide.
fn tangent_at(centerline: &[Point3], i: usize) -> Option<Point3> {
    let last = centerline.len() - 1;
    let delta = if i == 0 {
        centerline[1] - centerline[0]
    } else if i == last {
        centerline[last] - centerline[last - 1]
    } else {
        centerline[i + 1] - centerline[i - 1]
    };
    delta.normalized()
}

/// Orthonormal ring basis perpendicular to `tangent`.
///
/// Uses world up as the reference, switching to the x axis when the
/// tangent is nearly vertical.
fn ring_basis(tangent: Point3) -> (Point3, Point3) {
    let reference = if tangent.dot(&UP).abs() > 0.95 {
        X_AXIS
    } else {
        UP
    };
    let right = tangent
        .cross(&reference)
        .normalized()
        .unwrap_or(Point3::new(0.0, 0.0, 1.0));
    let normal = right.cross(&tangent);
    (normal, right)
}
