//! Shoulder flexion.

use crate::geometry::{add_virtual_keypoints, compute_named_angle, vertical_angle};
use crate::movement::validation::{finish, require_keypoints, shoulder_width, Step};
use crate::movement::{Movement, MovementSettings, PositionCheck};
use crate::types::{AngleMap, AngleRange, KeypointSet};

pub const FLEXION_NORMAL: AngleRange = AngleRange::new(0.0, 180.0);
pub const FLEXION_MAX: AngleRange = AngleRange::new(0.0, 190.0);

/// Shoulder width above which the subject is clearly frontal.
const FRONTAL_SHOULDER_WIDTH_PX: f64 = 150.0;
/// Wrist closer than this to the shoulder means the arm is hidden.
const MIN_WRIST_DISTANCE_PX: f64 = 30.0;

/// Raising the arm forward, reported under `shoulder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShoulderFlexion {
    settings: MovementSettings,
}

impl ShoulderFlexion {
    /// Creates the movement.
    #[must_use]
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }
}

impl Movement for ShoulderFlexion {
    fn name(&self) -> &str {
        "shoulder_flexion"
    }

    fn required_keypoints(&self) -> Vec<String> {
        let side = self.settings.side;
        vec![
            side.keypoint("Shoulder"),
            side.keypoint("Elbow"),
            "Hip".to_string(),
            "Neck".to_string(),
        ]
    }

    fn primary_angle(&self) -> &str {
        "shoulder"
    }

    fn normal_range(&self) -> AngleRange {
        FLEXION_NORMAL
    }

    fn max_range(&self) -> AngleRange {
        FLEXION_MAX
    }

    fn calculate_angles(&self, keypoints: &KeypointSet) -> AngleMap {
        let kp = add_virtual_keypoints(keypoints);
        let side = self.settings.side;
        let mut angles = AngleMap::new();
        if let Some(angle) = compute_named_angle(&side.angle("shoulder"), &kp, false) {
            angles.insert("shoulder".to_string(), angle);
        }
        if let (Some(hip), Some(neck)) = (kp.get("Hip"), kp.get("Neck")) {
            if let Some(trunk) = vertical_angle(hip, neck) {
                angles.insert("trunk".to_string(), trunk);
            }
        }
        if let Some(angle) = compute_named_angle(&side.angle("elbow"), &kp, false) {
            angles.insert("elbow".to_string(), angle);
        }
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        let kp = add_virtual_keypoints(keypoints);
        let side = self.settings.side;
        if let Err(failure) = require_keypoints(&kp, &self.required_keypoints()) {
            return failure;
        }
        if shoulder_width(&kp).is_some_and(|width| width > FRONTAL_SHOULDER_WIDTH_PX) {
            return PositionCheck::ok_with(
                "Good position - facing camera. Side view would be better for shoulder flexion.",
            );
        }
        let arm_visible = || -> Step {
            let reach = kp.distance(&side.keypoint("Wrist"), &side.keypoint("Shoulder"));
            match reach {
                Some(distance) if distance < MIN_WRIST_DISTANCE_PX => {
                    Err(PositionCheck::fail("Please extend your arm away from your body"))
                }
                _ => Ok(()),
            }
        };
        finish(arm_visible())
    }

    fn movement_phase(&self, angle: f64) -> &'static str {
        match angle {
            a if a < 0.0 => "hyperextension",
            a if a < 45.0 => "initial_flexion",
            a if a < 90.0 => "mid_flexion",
            a if a < 135.0 => "high_flexion",
            a if a <= 180.0 => "full_flexion",
            _ => "hyperflexion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Side view: trunk vertical, right arm raised forward toward +x.
    fn side_view(elbow: (f64, f64), wrist: (f64, f64)) -> KeypointSet {
        KeypointSet::new()
            .with("Neck", (250.0, 100.0))
            .with("Hip", (250.0, 250.0))
            .with("RShoulder", (250.0, 100.0))
            .with("RElbow", elbow)
            .with("RWrist", wrist)
    }

    #[test]
    fn test_arm_at_side_and_raised() {
        let movement = ShoulderFlexion::default();
        let down = movement.calculate_angles(&side_view((250.0, 180.0), (250.0, 260.0)));
        assert_abs_diff_eq!(down["shoulder"], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(down["trunk"], 0.0, epsilon = 1e-9);

        let forward = movement.calculate_angles(&side_view((330.0, 100.0), (410.0, 100.0)));
        assert_abs_diff_eq!(forward["shoulder"], 90.0, epsilon = 1e-9);
        assert_eq!(movement.movement_phase(forward["shoulder"]), "high_flexion");
    }

    #[test]
    fn test_wrist_too_close_fails() {
        let kp = side_view((250.0, 180.0), (260.0, 110.0));
        let check = ShoulderFlexion::default().validate_position(&kp);
        assert_eq!(check, PositionCheck::fail("Please extend your arm away from your body"));
    }

    #[test]
    fn test_frontal_view_passes_with_advice() {
        let kp = side_view((250.0, 180.0), (260.0, 110.0))
            .with("LShoulder", (420.0, 100.0));
        let check = ShoulderFlexion::default().validate_position(&kp);
        assert!(check.valid);
        assert!(check.message.contains("Side view would be better"));
    }

    #[test]
    fn test_missing_neck_and_hip() {
        let kp = KeypointSet::new()
            .with("RShoulder", (0.0, 0.0))
            .with("RElbow", (0.0, 80.0));
        let check = ShoulderFlexion::default().validate_position(&kp);
        assert_eq!(check.message, "Cannot detect: Hip, Neck");
    }
}
