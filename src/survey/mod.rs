//! Survey layer: station records and 2D profile reconstruction.

pub mod profile;
pub mod store;

pub use profile::{reconstruct, CaveProfile, ProfileConfig};
pub use store::{
    last_manual_depth, last_recorded_distance, manual_stations, JsonFileStore, MemoryStore,
    RecordStore,
};
