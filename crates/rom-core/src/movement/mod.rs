//! Movement definitions.
//!
//! A movement (e.g. lower-back flexion, elbow flexion) is described by the
//! [`Movement`] trait: which keypoints it needs, which computed angle is the
//! measured range of motion, its normal and safe ranges, how to compute its
//! angles, and how to decide whether a frame shows a usable position.
//!
//! Bespoke implementations live in the body-part modules. Movements without
//! one are served by [`TableMovement`], driven by the static
//! [`table`] of primary/secondary angles, ranges and calculation routines.

pub mod elbow;
pub mod generic;
pub mod lower_back;
pub mod shoulder;
pub mod table;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_FACING_CAMERA_THRESHOLD_PX, DEFAULT_MIN_SEGMENT_LENGTH_PX};
use crate::types::{AngleMap, AngleRange, KeypointSet, Side};

pub use generic::TableMovement;
pub use table::{movement_spec, movement_specs, AngleRef, CalculateFn, MovementSpec};

/// Message returned by every validator when a frame is usable.
pub const POSITION_CORRECT: &str = "Position is correct";

/// Construction-time parameters shared by all movement definitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSettings {
    /// Limb side measured by side-specific movements
    pub side: Side,
    /// Minimum shoulder width (pixels) for a frontal view
    pub facing_camera_threshold_px: f64,
    /// Minimum visible limb segment length (pixels)
    pub min_segment_length_px: f64,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            side: Side::default(),
            facing_camera_threshold_px: DEFAULT_FACING_CAMERA_THRESHOLD_PX,
            min_segment_length_px: DEFAULT_MIN_SEGMENT_LENGTH_PX,
        }
    }
}

impl MovementSettings {
    /// Returns these settings with a different side.
    #[must_use]
    pub fn with_side(self, side: Side) -> Self {
        Self { side, ..self }
    }
}

/// Outcome of a position validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCheck {
    /// Whether the frame can be measured
    pub valid: bool,
    /// Human-readable explanation
    pub message: String,
}

impl PositionCheck {
    /// A passing check with the standard message.
    #[must_use]
    pub fn ok() -> Self {
        Self::ok_with(POSITION_CORRECT)
    }

    /// A passing check with a custom message.
    #[must_use]
    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    /// A failing check.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Factory producing a movement for the given settings.
pub type MovementFactory = fn(&MovementSettings) -> Box<dyn Movement>;

/// A measurable movement of one body part.
pub trait Movement: Send + Sync {
    /// Identifier, e.g. `"lower_back_flexion"`.
    fn name(&self) -> &str;

    /// Keypoints that must be present (after virtual keypoints are added).
    fn required_keypoints(&self) -> Vec<String>;

    /// Key in [`calculate_angles`](Self::calculate_angles) holding the measured angle.
    fn primary_angle(&self) -> &str;

    /// Expected, comfortable range in degrees.
    fn normal_range(&self) -> AngleRange;

    /// Safe outer bound in degrees.
    fn max_range(&self) -> AngleRange {
        self.normal_range()
    }

    /// Computes every angle this movement reports. Unresolvable angles are omitted.
    fn calculate_angles(&self, keypoints: &KeypointSet) -> AngleMap;

    /// Decides whether the frame shows a measurable position.
    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck;

    /// Coarse phase label for a primary-angle value.
    fn movement_phase(&self, angle: f64) -> &'static str {
        range_phase(self.normal_range(), angle)
    }
}

/// Labels an angle as below, within or above a range.
#[must_use]
pub fn range_phase(range: AngleRange, angle: f64) -> &'static str {
    if angle < range.min {
        "below_normal"
    } else if angle > range.max {
        "above_normal"
    } else {
        "normal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_phase() {
        let range = AngleRange::new(0.0, 60.0);
        assert_eq!(range_phase(range, -1.0), "below_normal");
        assert_eq!(range_phase(range, 30.0), "normal");
        assert_eq!(range_phase(range, 60.5), "above_normal");
    }

    #[test]
    fn test_position_check_constructors() {
        assert_eq!(PositionCheck::ok().message, POSITION_CORRECT);
        assert!(!PositionCheck::fail("nope").valid);
    }

    #[test]
    fn test_settings_with_side() {
        let settings = MovementSettings::default().with_side(Side::Left);
        assert_eq!(settings.side, Side::Left);
        assert_eq!(settings.facing_camera_threshold_px, 50.0);
    }
}
