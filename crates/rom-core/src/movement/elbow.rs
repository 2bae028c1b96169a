//! Elbow flexion and extension, measured from a view with the arm parallel
//! to the image plane.

use crate::geometry::{add_virtual_keypoints, compute_named_angle, feet_direction, raw_named_angle};
use crate::movement::validation::{finish, require_keypoints, require_segment, Step};
use crate::movement::{Movement, MovementSettings, PositionCheck};
use crate::types::{AngleMap, AngleRange, KeypointSet, Side};

pub const FLEXION_NORMAL: AngleRange = AngleRange::new(0.0, 145.0);
pub const FLEXION_MAX: AngleRange = AngleRange::new(0.0, 160.0);
pub const EXTENSION_NORMAL: AngleRange = AngleRange::new(0.0, 10.0);
pub const EXTENSION_MAX: AngleRange = AngleRange::new(-10.0, 10.0);

/// Minimum upper-arm length as a fraction of shoulder width.
const ARM_AWAY_FROM_BODY_RATIO: f64 = 0.3;

fn required(settings: &MovementSettings) -> Vec<String> {
    ["Shoulder", "Elbow", "Wrist"]
        .iter()
        .map(|base| settings.side.keypoint(base))
        .collect()
}

/// Elbow flexion in [0°, 180°]: 0 for a straight arm.
fn flexion_angle(keypoints: &KeypointSet, settings: &MovementSettings) -> Option<f64> {
    let raw = raw_named_angle(&settings.side.angle("elbow"), keypoints, false)?;
    Some((180.0 - raw.abs()).clamp(0.0, 180.0))
}

/// Signed deviation from a straight arm: positive when flexed, negative
/// when hyperextended.
///
/// Flexion swings the forearm toward the direction the subject faces. That
/// direction comes from the feet when both are visible; otherwise the
/// measured arm is assumed to be the one nearer the camera, so a right arm
/// faces +x and a left arm faces -x.
fn extension_angle(keypoints: &KeypointSet, settings: &MovementSettings) -> Option<f64> {
    let side = settings.side;
    let shoulder = keypoints.get(&side.keypoint("Shoulder"))?;
    let elbow = keypoints.get(&side.keypoint("Elbow"))?;
    let wrist = keypoints.get(&side.keypoint("Wrist"))?;
    let raw = raw_named_angle(&side.angle("elbow"), keypoints, false)?;
    let magnitude = 180.0 - raw.abs();

    let facing = feet_direction(keypoints).unwrap_or(match side {
        Side::Right => 1.0,
        Side::Left => -1.0,
    });
    let bend = elbow.sub(shoulder).cross(wrist.sub(elbow));
    Some(if bend * facing > 0.0 { -magnitude } else { magnitude })
}

fn context_angles(keypoints: &KeypointSet, settings: &MovementSettings, angles: &mut AngleMap) {
    if let Some(angle) = compute_named_angle(&settings.side.angle("shoulder"), keypoints, false) {
        angles.insert("shoulder".to_string(), angle);
    }
}

fn validate_arm(keypoints: &KeypointSet, settings: &MovementSettings) -> PositionCheck {
    let kp = add_virtual_keypoints(keypoints);
    let side = settings.side;
    let shoulder = side.keypoint("Shoulder");
    let elbow = side.keypoint("Elbow");
    let wrist = side.keypoint("Wrist");
    let min = settings.min_segment_length_px;

    let steps = || -> Step {
        require_keypoints(&kp, &required(settings))?;
        require_segment(&kp, &shoulder, &elbow, min, || {
            "Upper arm is not clearly visible. Please position your arm parallel to the camera."
                .to_string()
        })?;
        require_segment(&kp, &elbow, &wrist, min, || {
            "Forearm is not clearly visible. Please position your arm parallel to the camera."
                .to_string()
        })?;
        let other = side.opposite().keypoint("Shoulder");
        if let (Some(width), Some(upper_arm)) =
            (kp.distance(&other, &shoulder), kp.distance(&shoulder, &elbow))
        {
            if upper_arm < width * ARM_AWAY_FROM_BODY_RATIO {
                return Err(PositionCheck::fail(
                    "Please move your arm slightly away from your body",
                ));
            }
        }
        Ok(())
    };
    finish(steps())
}

/// Bending of the elbow, reported under `elbow`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElbowFlexion {
    settings: MovementSettings,
}

impl ElbowFlexion {
    /// Creates the movement.
    #[must_use]
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }
}

impl Movement for ElbowFlexion {
    fn name(&self) -> &str {
        "elbow_flexion"
    }

    fn required_keypoints(&self) -> Vec<String> {
        required(&self.settings)
    }

    fn primary_angle(&self) -> &str {
        "elbow"
    }

    fn normal_range(&self) -> AngleRange {
        FLEXION_NORMAL
    }

    fn max_range(&self) -> AngleRange {
        FLEXION_MAX
    }

    fn calculate_angles(&self, keypoints: &KeypointSet) -> AngleMap {
        let kp = add_virtual_keypoints(keypoints);
        let mut angles = AngleMap::new();
        if let Some(flexion) = flexion_angle(&kp, &self.settings) {
            angles.insert("elbow".to_string(), flexion);
        }
        context_angles(&kp, &self.settings, &mut angles);
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        validate_arm(keypoints, &self.settings)
    }

    fn movement_phase(&self, angle: f64) -> &'static str {
        match angle {
            a if a < 10.0 => "full_extension",
            a if a < 30.0 => "near_extension",
            a if a < 60.0 => "slight_flexion",
            a if a < 90.0 => "moderate_flexion",
            a if a < 120.0 => "significant_flexion",
            a if a < 145.0 => "near_full_flexion",
            _ => "full_flexion",
        }
    }
}

/// Straightening of the elbow, reported under `elbow`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElbowExtension {
    settings: MovementSettings,
}

impl ElbowExtension {
    /// Creates the movement.
    #[must_use]
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }
}

impl Movement for ElbowExtension {
    fn name(&self) -> &str {
        "elbow_extension"
    }

    fn required_keypoints(&self) -> Vec<String> {
        required(&self.settings)
    }

    fn primary_angle(&self) -> &str {
        "elbow"
    }

    fn normal_range(&self) -> AngleRange {
        EXTENSION_NORMAL
    }

    fn max_range(&self) -> AngleRange {
        EXTENSION_MAX
    }

    fn calculate_angles(&self, keypoints: &KeypointSet) -> AngleMap {
        let kp = add_virtual_keypoints(keypoints);
        let mut angles = AngleMap::new();
        if let Some(extension) = extension_angle(&kp, &self.settings) {
            angles.insert("elbow".to_string(), extension);
        }
        context_angles(&kp, &self.settings, &mut angles);
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        validate_arm(keypoints, &self.settings)
    }

    fn movement_phase(&self, angle: f64) -> &'static str {
        match angle {
            a if a < -10.0 => "excessive_hyperextension",
            a if a < 0.0 => "hyperextension",
            a if a < 5.0 => "full_extension",
            a if a < 15.0 => "slight_flexion",
            _ => "flexed",
        }
    }
}
