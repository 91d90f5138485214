//! File formats: PLY point clouds, survey exports, SVG rendering,
//! persisted settings.

pub mod exports;
pub mod ply;
pub mod settings;
pub mod svg_profile;

pub use exports::{csv_export, therion_export, TherionConfig};
pub use ply::{parse_ply, split_cloud, write_ply, CloudPoint, PlyCloud};
pub use settings::SurveySettings;
pub use svg_profile::render_profile_svg;
