//! Serializable per-frame analysis result.

use chrono::{DateTime, Utc};
use rom_core::{AngleMap, AngleRange, Guidance, KeypointSet, RomSnapshot};
use serde::{Deserialize, Serialize};

/// Range classification of the frame's primary angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub in_normal_range: bool,
    pub in_max_range: bool,
    pub message: String,
    pub normal_range: AngleRange,
    pub max_range: AngleRange,
    /// Phase label of the primary angle; absent when nothing was measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_phase: Option<String>,
}

impl ValidationReport {
    /// A report for a frame that could not be measured.
    #[must_use]
    pub fn unmeasured(message: impl Into<String>) -> Self {
        Self {
            in_normal_range: false,
            in_max_range: false,
            message: message.into(),
            normal_range: AngleRange::new(0.0, 0.0),
            max_range: AngleRange::new(0.0, 0.0),
            movement_phase: None,
        }
    }
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameMetrics {
    pub keypoints_detected: usize,
    pub angles_calculated: usize,
    pub processing_time_ms: f64,
}

/// Everything reported for one analyzed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub frame_id: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub body_part: String,
    pub movement_type: String,
    pub pose_detected: bool,
    pub angles: AngleMap,
    pub rom: RomSnapshot,
    pub pose_confidence: f64,
    pub validation: ValidationReport,
    pub guidance: Guidance,
    pub frame_metrics: FrameMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<KeypointSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton_connections: Option<Vec<[String; 2]>>,
    /// Set only for no-pose and invalid-position frames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FrameAnalysis {
    /// Returns `true` if the frame produced a measurement.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.pose_detected && self.message.is_none()
    }
}
