//! Tunnel meshing from tracked centerline and wall point clouds.

pub mod radius;
pub mod tube;

pub use radius::{estimate_radii, RadiusConfig};
pub use tube::{build_tube, TubeConfig, TubeMesh};
