//! Persistence for survey stations.
//!
//! The store contract is append-only for stations plus a separately
//! persisted point counter so record numbering survives restarts. Two
//! implementations: an in-memory store for tests and pipelines that do not
//! persist, and a JSON-file store that keeps `stations.json` and
//! `counter.json` in a directory.

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::core::types::{RecordType, SurveyStation};
use crate::error::Result;

/// Station persistence contract.
///
/// `append` assigns the next record number itself; callers never pick
/// numbers. `reset_all` clears stations and restarts numbering at 1.
pub trait RecordStore {
    /// All stations in insertion order.
    fn load_all(&self) -> Result<Vec<SurveyStation>>;

    /// Append a station, assigning and returning its record number.
    fn append(&mut self, station: SurveyStation) -> Result<u32>;

    /// Next record number to assign.
    fn load_point_counter(&self) -> Result<u32>;

    fn save_point_counter(&mut self, counter: u32) -> Result<()>;

    /// Delete every station and restart numbering at 1.
    fn reset_all(&mut self) -> Result<()>;
}

/// Volatile store backed by a `Vec`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stations: Vec<SurveyStation>,
    counter: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            stations: Vec::new(),
            counter: 1,
        }
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<SurveyStation>> {
        Ok(self.stations.clone())
    }

    fn append(&mut self, mut station: SurveyStation) -> Result<u32> {
        let number = self.counter.max(1);
        station.record_number = number;
        self.stations.push(station);
        self.counter = number + 1;
        Ok(number)
    }

    fn load_point_counter(&self) -> Result<u32> {
        Ok(self.counter.max(1))
    }

    fn save_point_counter(&mut self, counter: u32) -> Result<()> {
        self.counter = counter;
        Ok(())
    }

    fn reset_all(&mut self) -> Result<()> {
        self.stations.clear();
        self.counter = 1;
        Ok(())
    }
}

/// JSON-file store keeping `stations.json` and `counter.json` under one
/// directory. The station array is rewritten whole on every append; survey
/// sessions are small enough that this stays cheap.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn stations_path(&self) -> PathBuf {
        self.dir.join("stations.json")
    }

    fn counter_path(&self) -> PathBuf {
        self.dir.join("counter.json")
    }

    fn write_stations(&self, stations: &[SurveyStation]) -> Result<()> {
        let json = serde_json::to_string_pretty(stations)?;
        fs::write(self.stations_path(), json)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<SurveyStation>> {
        let path = self.stations_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn append(&mut self, mut station: SurveyStation) -> Result<u32> {
        let number = self.load_point_counter()?;
        station.record_number = number;
        let mut stations = self.load_all()?;
        stations.push(station);
        self.write_stations(&stations)?;
        self.save_point_counter(number + 1)?;
        Ok(number)
    }

    fn load_point_counter(&self) -> Result<u32> {
        let path = self.counter_path();
        if !path.exists() {
            return Ok(1);
        }
        let json = fs::read_to_string(path)?;
        let counter: u32 = serde_json::from_str(&json)?;
        Ok(counter.max(1))
    }

    fn save_point_counter(&mut self, counter: u32) -> Result<()> {
        fs::write(self.counter_path(), serde_json::to_string(&counter)?)?;
        Ok(())
    }

    fn reset_all(&mut self) -> Result<()> {
        info!("resetting survey store at {}", self.dir.display());
        self.write_stations(&[])?;
        self.save_point_counter(1)?;
        Ok(())
    }
}

/// Stations saved explicitly by the diver, sorted by record number.
pub fn manual_stations(stations: &[SurveyStation]) -> Vec<SurveyStation> {
    let mut manual: Vec<SurveyStation> = stations
        .iter()
        .filter(|s| s.record_type == RecordType::Manual)
        .copied()
        .collect();
    manual.sort_by_key(|s| s.record_number);
    manual
}

/// Depth of the most recent manual station, if any.
pub fn last_manual_depth(stations: &[SurveyStation]) -> Option<f32> {
    stations
        .iter()
        .rev()
        .find(|s| s.record_type == RecordType::Manual)
        .map(|s| s.depth)
}

/// Cumulative distance of the most recent station of any type.
pub fn last_recorded_distance(stations: &[SurveyStation]) -> Option<f32> {
    stations.last().map(|s| s.distance)
}
