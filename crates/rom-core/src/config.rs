//! Analysis configuration.
//!
//! [`AnalysisConfig`] gathers every tunable threshold used by position
//! validation, keypoint gating, smoothing and session persistence. All
//! fields have sensible defaults; call [`AnalysisConfig::validate`] after
//! building a config by hand.
//!
//! # Example
//!
//! ```rust
//! use rom_core::config::AnalysisConfig;
//!
//! let cfg = AnalysisConfig::default();
//! assert!(cfg.validate().is_ok());
//! assert_eq!(cfg.smoothing_window, 5);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::movement::MovementSettings;
use crate::types::Side;

/// Default moving-average window for the ROM tracker.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Default per-keypoint confidence threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Default minimum share of confident keypoints for a usable detection.
pub const DEFAULT_MIN_KEYPOINTS_RATIO: f64 = 0.5;

/// Default shoulder width (pixels) below which the subject is assumed side-on.
pub const DEFAULT_FACING_CAMERA_THRESHOLD_PX: f64 = 50.0;

/// Default minimum limb segment length (pixels).
pub const DEFAULT_MIN_SEGMENT_LENGTH_PX: f64 = 50.0;

/// Default tracker record time-to-live in the backing store.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Tunable thresholds for frame analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of recent samples averaged before updating extrema.
    pub smoothing_window: usize,
    /// Keypoints scored below this are discarded.
    pub confidence_threshold: f64,
    /// Detections with a smaller share of confident keypoints are treated as empty.
    pub min_keypoints_ratio: f64,
    /// Shoulder width in pixels required to consider the subject frontal.
    ///
    /// This is resolution- and distance-dependent.
    pub facing_camera_threshold_px: f64,
    /// Minimum visible limb segment length in pixels.
    pub min_segment_length_px: f64,
    /// Time-to-live of persisted tracker records, in seconds.
    pub session_ttl_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            min_keypoints_ratio: DEFAULT_MIN_KEYPOINTS_RATIO,
            facing_camera_threshold_px: DEFAULT_FACING_CAMERA_THRESHOLD_PX,
            min_segment_length_px: DEFAULT_MIN_SEGMENT_LENGTH_PX,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be read and
    /// [`ConfigError::InvalidValue`] if it does not parse or fails validation.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::invalid_value("(file)", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize this configuration to pretty-printed JSON at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be written.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("(serialization)", e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every field for a usable value.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing_window == 0 {
            return Err(ConfigError::invalid_value("smoothing_window", "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::invalid_value(
                "confidence_threshold",
                format!("must be in [0, 1], got {}", self.confidence_threshold),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_keypoints_ratio) {
            return Err(ConfigError::invalid_value(
                "min_keypoints_ratio",
                format!("must be in [0, 1], got {}", self.min_keypoints_ratio),
            ));
        }
        if !(self.facing_camera_threshold_px > 0.0) {
            return Err(ConfigError::invalid_value("facing_camera_threshold_px", "must be > 0"));
        }
        if !(self.min_segment_length_px > 0.0) {
            return Err(ConfigError::invalid_value("min_segment_length_px", "must be > 0"));
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::invalid_value("session_ttl_secs", "must be > 0"));
        }
        Ok(())
    }

    /// Tracker record time-to-live as a [`Duration`].
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Movement construction settings for the given side.
    #[must_use]
    pub fn movement_settings(&self, side: Side) -> MovementSettings {
        MovementSettings {
            side,
            facing_camera_threshold_px: self.facing_camera_threshold_px,
            min_segment_length_px: self.min_segment_length_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = AnalysisConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.session_ttl(), Duration::from_secs(3600));
        assert_eq!(cfg.confidence_threshold, 0.3);
    }

    #[test]
    fn test_rejects_zero_window() {
        let cfg = AnalysisConfig { smoothing_window: 0, ..AnalysisConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { field: "smoothing_window", .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_ratio() {
        let cfg = AnalysisConfig { min_keypoints_ratio: 1.5, ..AnalysisConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = AnalysisConfig { facing_camera_threshold_px: f64::NAN, ..AnalysisConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str(r#"{"smoothing_window": 3}"#).unwrap();
        assert_eq!(cfg.smoothing_window, 3);
        assert_eq!(cfg.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("rom-config-{}.json", std::process::id()));
        let cfg = AnalysisConfig { facing_camera_threshold_px: 80.0, ..AnalysisConfig::default() };
        cfg.to_json(&path).unwrap();
        let loaded = AnalysisConfig::from_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let err = AnalysisConfig::from_json(Path::new("/nonexistent/rom.json")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
