use crate::models::pose::{PoseError, PoseLabel, PoseResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Open interval of knee angles (degrees) mapped to a posture label.
///
/// Bounds are stored inclusively as configured, but membership is strict:
/// an angle equal to `min` or `max` is not inside the band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleBand {
    pub label: PoseLabel,
    pub min: f64,
    pub max: f64,
}

impl AngleBand {
    pub fn new(label: PoseLabel, min: f64, max: f64) -> Self {
        Self { label, min, max }
    }

    pub fn contains(&self, angle: f64) -> bool {
        self.min < angle && angle < self.max
    }

    fn overlaps(&self, other: &AngleBand) -> bool {
        self.min < other.max && other.min < self.max
    }
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Bands in evaluation order; the first band containing the angle wins
    pub bands: Vec<AngleBand>,
    /// Knees and ankles must have visibility strictly above this (0.0-1.0)
    pub visibility_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                AngleBand::new(PoseLabel::Squat, 110.0, 140.0),
                AngleBand::new(PoseLabel::Stand, 175.0, 185.0),
            ],
            visibility_threshold: 0.5,
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from file, creating it with defaults if it doesn't exist
    pub fn load_from(path: &Path) -> PoseResult<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: ClassifierConfig = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> PoseResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Overwrite the file at `path` with the default configuration
    pub fn reset_to(path: &Path) -> PoseResult<Self> {
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    /// Band for a label, if configured
    pub fn band(&self, label: PoseLabel) -> Option<&AngleBand> {
        self.bands.iter().find(|band| band.label == label)
    }

    /// Validate configuration values
    pub fn validate(&self) -> PoseResult<()> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(PoseError::InvalidConfig(format!(
                "Invalid visibility threshold: {}. Must be between 0.0 and 1.0",
                self.visibility_threshold
            )));
        }

        if self.bands.is_empty() {
            return Err(PoseError::InvalidConfig(
                "At least one angle band is required".to_string(),
            ));
        }

        for (i, band) in self.bands.iter().enumerate() {
            if band.label == PoseLabel::Unknown {
                return Err(PoseError::InvalidConfig(
                    "Angle band cannot map to the unknown label".to_string(),
                ));
            }

            if !band.min.is_finite() || !band.max.is_finite() || band.min >= band.max {
                return Err(PoseError::InvalidConfig(format!(
                    "Invalid {} band: [{}, {}]. Bounds must be finite with min < max",
                    band.label, band.min, band.max
                )));
            }

            for other in &self.bands[i + 1..] {
                if other.label == band.label {
                    return Err(PoseError::InvalidConfig(format!(
                        "Duplicate band for label {}",
                        band.label
                    )));
                }
                if band.overlaps(other) {
                    return Err(PoseError::InvalidConfig(format!(
                        "Bands {} and {} overlap",
                        band.label, other.label
                    )));
                }
            }
        }

        Ok(())
    }
}
