// Detection configuration
// Thresholds for voicing, clustering and note acceptance

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration schema version understood by this crate
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Errors raised when a configuration record is out of range
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and non-negative, got {value}")]
    NegativeOrNonFinite { field: &'static str, value: f64 },

    #[error("minConfidence must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f32),

    #[error("minFramesPerNote must be at least 1")]
    ZeroMinFrames,

    #[error("Unsupported config schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Knobs controlling note detection
///
/// Every field is optional on the wire; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectionConfig {
    /// Schema version of this record
    pub schema_version: u32,

    /// Minimum estimator confidence for a frame to count as voiced [0.0, 1.0]
    pub min_confidence: f32,

    /// Largest time gap (seconds) allowed between consecutive frames of one note
    pub max_gap_seconds: f64,

    /// Largest pitch jump (semitones) allowed between consecutive frames of one note
    pub max_jump_semitones: f64,

    /// Largest sample standard deviation (semitones) of pitches within one note
    pub max_std_dev_semitones: f64,

    /// Minimum number of frames a note must contain
    pub min_frames_per_note: usize,

    /// Minimum note duration in seconds
    pub min_note_seconds: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            schema_version: CONFIG_SCHEMA_VERSION,
            min_confidence: 0.3,
            max_gap_seconds: 0.05,
            max_jump_semitones: 1.2,
            max_std_dev_semitones: 0.6,
            min_frames_per_note: 3,
            min_note_seconds: 0.06,
        }
    }
}

impl DetectionConfig {
    /// Parse and validate a JSON configuration record
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DetectionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is in a usable range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != CONFIG_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchema {
                found: self.schema_version,
                expected: CONFIG_SCHEMA_VERSION,
            });
        }

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::ConfidenceOutOfRange(self.min_confidence));
        }

        let thresholds = [
            ("maxGapSeconds", self.max_gap_seconds),
            ("maxJumpSemitones", self.max_jump_semitones),
            ("maxStdDevSemitones", self.max_std_dev_semitones),
            ("minNoteSeconds", self.min_note_seconds),
        ];
        for (field, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeOrNonFinite { field, value });
            }
        }

        if self.min_frames_per_note == 0 {
            return Err(ConfigError::ZeroMinFrames);
        }

        Ok(())
    }

    pub fn with_min_confidence(mut self, value: f32) -> Self {
        self.min_confidence = value;
        self
    }

    pub fn with_max_gap_seconds(mut self, value: f64) -> Self {
        self.max_gap_seconds = value;
        self
    }

    pub fn with_max_jump_semitones(mut self, value: f64) -> Self {
        self.max_jump_semitones = value;
        self
    }

    pub fn with_max_std_dev_semitones(mut self, value: f64) -> Self {
        self.max_std_dev_semitones = value;
        self
    }

    pub fn with_min_frames_per_note(mut self, value: usize) -> Self {
        self.min_frames_per_note = value;
        self
    }

    pub fn with_min_note_seconds(mut self, value: f64) -> Self {
        self.min_note_seconds = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.min_confidence, 0.3);
        assert_eq!(config.max_gap_seconds, 0.05);
        assert_eq!(config.max_jump_semitones, 1.2);
        assert_eq!(config.max_std_dev_semitones, 0.6);
        assert_eq!(config.min_frames_per_note, 3);
        assert_eq!(config.min_note_seconds, 0.06);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = DetectionConfig::from_json_str(r#"{"minConfidence": 0.5}"#).unwrap();
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.min_frames_per_note, 3);
        assert_eq!(config.schema_version, CONFIG_SCHEMA_VERSION);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = DetectionConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DetectionConfig::default());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = DetectionConfig::default().with_max_gap_seconds(-0.1);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NegativeOrNonFinite { field: "maxGapSeconds", .. }
        ));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let config = DetectionConfig::default().with_max_std_dev_semitones(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_confidence_range() {
        assert!(DetectionConfig::default().with_min_confidence(1.5).validate().is_err());
        assert!(DetectionConfig::default().with_min_confidence(-0.1).validate().is_err());
        assert!(DetectionConfig::default().with_min_confidence(f32::NAN).validate().is_err());
        assert!(DetectionConfig::default().with_min_confidence(1.0).validate().is_ok());
    }

    #[test]
    fn test_zero_min_frames_rejected() {
        let config = DetectionConfig::default().with_min_frames_per_note(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMinFrames)));
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let result = DetectionConfig::from_json_str(r#"{"schemaVersion": 7}"#);
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedSchema { found: 7, .. })
        ));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(
            DetectionConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
