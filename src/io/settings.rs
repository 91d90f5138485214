//! Persisted survey settings (TOML).

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sensors::calibration::Thresholds;

/// Settings that survive across sessions: calibration results and the
/// wheel geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveySettings {
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub wheel_circumference_cm: f32,
    pub calibrated: bool,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            low_threshold: 1130.0,
            high_threshold: 1200.0,
            wheel_circumference_cm: 11.78,
            calibrated: false,
        }
    }
}

impl SurveySettings {
    /// Load settings from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let settings: SurveySettings = basic_toml::from_str(&text)?;
        info!(
            "loaded settings: thresholds {:.0}/{:.0}, calibrated={}",
            settings.low_threshold, settings.high_threshold, settings.calibrated
        );
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = basic_toml::to_string(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            low: self.low_threshold,
            high: self.high_threshold,
        }
    }

    /// Fold freshly committed thresholds into the settings.
    pub fn apply_thresholds(&mut self, thresholds: Thresholds) {
        self.low_threshold = thresholds.low;
        self.high_threshold = thresholds.high;
        self.calibrated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SurveySettings::default();
        assert_eq!(settings.thresholds(), Thresholds::default());
        assert!(!settings.calibrated);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = SurveySettings::load(Path::new("/nonexistent/settings.toml")).unwrap();
        assert_eq!(settings, SurveySettings::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("cave-settings-{}.toml", std::process::id()));
        let mut settings = SurveySettings::default();
        settings.apply_thresholds(Thresholds {
            low: 1050.0,
            high: 1150.0,
        });
        settings.save(&path).unwrap();
        let loaded = SurveySettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert!(loaded.calibrated);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: SurveySettings = basic_toml::from_str("low_threshold = 1000.0").unwrap();
        assert_eq!(settings.low_threshold, 1000.0);
        assert_eq!(settings.high_threshold, 1200.0);
        assert_eq!(settings.wheel_circumference_cm, 11.78);
    }
}
