//! Survey exports: CSV dump and Therion centerline files.

use std::fmt::Write as _;

use crate::core::types::SurveyStation;
use crate::error::{Result, SurveyError};
use crate::survey::store::manual_stations;

/// All stations as CSV, one row per station.
pub fn csv_export(stations: &[SurveyStation]) -> String {
    let mut out = String::from("recordNumber,distance,heading,depth,left,right,up,down,rtype\n");
    for s in stations {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            s.record_number,
            s.distance,
            s.heading,
            s.depth,
            s.left,
            s.right,
            s.up,
            s.down,
            s.record_type
        );
    }
    out
}

/// Survey metadata for the Therion header.
#[derive(Debug, Clone)]
pub struct TherionConfig {
    pub survey_name: String,
    pub title: String,
    pub team: String,
    /// `yyyy.m.d` as Therion expects.
    pub date: String,
}

impl Default for TherionConfig {
    fn default() -> Self {
        Self {
            survey_name: "sump_1".to_string(),
            title: "Sump 1".to_string(),
            team: "PaldinCaveDivingGroup".to_string(),
            date: "2024.2.26".to_string(),
        }
    }
}

/// Export the manual stations as a Therion `data diving` centerline.
///
/// Stations become consecutive numbered shots; each shot carries the
/// length, compass and depth change between adjacent manual stations and
/// the destination station's wall offsets. Depths are positive-down, so
/// `calibrate depth 0 -1` flips the sign for Therion.
pub fn therion_export(stations: &[SurveyStation], config: &TherionConfig) -> Result<String> {
    let manual = manual_stations(stations);
    if manual.len() < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "therion export needs 2 manual stations, have {}",
            manual.len()
        )));
    }

    let mut out = String::new();
    let _ = writeln!(out, "survey {} -title \"{}\"", config.survey_name, config.title);
    out.push_str("centerline\n");
    let _ = writeln!(out, "team \"{}\"", config.team);
    let _ = writeln!(out, "date {}", config.date);
    out.push_str("calibrate depth 0 -1\n");
    out.push_str("units length depth meters\n");
    out.push_str("units compass degrees\n");
    out.push_str("data diving from to length compass depthchange left right up down\n");
    out.push_str("extend left\n");

    for (i, pair) in manual.windows(2).enumerate() {
        let (start, end) = (&pair[0], &pair[1]);
        let _ = writeln!(
            out,
            "{} {} {:.1} {} {:.1} {:.1} {:.1} {:.1} {:.1}",
            i,
            i + 1,
            end.distance - start.distance,
            end.heading as i32,
            end.depth - start.depth,
            end.left,
            end.right,
            end.up,
            end.down
        );
    }

    out.push_str("endcenterline\nendsurvey\n");
    Ok(out)
}
