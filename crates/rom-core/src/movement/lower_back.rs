//! Lower-back movements measured from a frontal view.
//!
//! All four share the same gate: every required keypoint visible and a
//! shoulder width of at least the facing-camera threshold.

use crate::geometry::{
    add_virtual_keypoints, compute_named_angle, horizontal_angle, vertical_angle, wrap_degrees,
};
use crate::movement::validation::{finish, require_facing_camera, require_keypoints, Step};
use crate::movement::{Movement, MovementSettings, PositionCheck};
use crate::types::{AngleMap, AngleRange, KeypointSet, Point2, Side};

/// Keypoints needed by flexion and extension.
pub const SAGITTAL_KEYPOINTS: [&str; 6] = ["Neck", "Hip", "LHip", "RHip", "LShoulder", "RShoulder"];
/// Keypoints needed by lateral flexion.
pub const LATERAL_KEYPOINTS: [&str; 6] = ["Neck", "Hip", "LShoulder", "RShoulder", "LHip", "RHip"];
/// Keypoints needed by rotation.
pub const ROTATION_KEYPOINTS: [&str; 6] = ["LShoulder", "RShoulder", "LHip", "RHip", "Neck", "Hip"];

pub const FLEXION_NORMAL: AngleRange = AngleRange::new(0.0, 60.0);
pub const FLEXION_MAX: AngleRange = AngleRange::new(0.0, 90.0);
pub const EXTENSION_NORMAL: AngleRange = AngleRange::new(-30.0, 0.0);
pub const EXTENSION_MAX: AngleRange = AngleRange::new(-45.0, 0.0);
pub const LATERAL_NORMAL: AngleRange = AngleRange::new(-30.0, 30.0);
pub const LATERAL_MAX: AngleRange = AngleRange::new(-45.0, 45.0);
pub const ROTATION_NORMAL: AngleRange = AngleRange::new(-45.0, 45.0);
pub const ROTATION_MAX: AngleRange = AngleRange::new(-60.0, 60.0);

/// Flexion-style trunk angle above which extension is not measured.
const EXTENSION_START_LIMIT: f64 = 30.0;
/// Trunk lean above which rotation is not measured.
const ROTATION_LEAN_LIMIT: f64 = 30.0;

fn trunk_points(keypoints: &KeypointSet) -> Option<(Point2, Point2)> {
    Some((keypoints.get("Neck")?, keypoints.get("Hip")?))
}

/// Forward bend of the trunk: `180 - |vertical angle of Neck → Hip|`.
#[must_use]
pub fn trunk_flexion(keypoints: &KeypointSet, _side: Side) -> Option<f64> {
    let (neck, hip) = trunk_points(keypoints)?;
    Some(180.0 - vertical_angle(neck, hip)?.abs())
}

/// Backward bend of the trunk, mirror-signed to flexion (never positive).
#[must_use]
pub fn trunk_extension(keypoints: &KeypointSet, _side: Side) -> Option<f64> {
    let (neck, hip) = trunk_points(keypoints)?;
    Some(vertical_angle(neck, hip)?.abs() - 180.0)
}

/// Frontal-plane deviation of the Neck from vertically above the Hip.
#[must_use]
pub fn trunk_lateral(keypoints: &KeypointSet, _side: Side) -> Option<f64> {
    let (neck, hip) = trunk_points(keypoints)?;
    vertical_angle(hip, neck)
}

/// Shoulder-line orientation minus hip-line orientation, wrapped into (-180°, 180°].
#[must_use]
pub fn trunk_rotation(keypoints: &KeypointSet, _side: Side) -> Option<f64> {
    let shoulders = shoulder_line(keypoints)?;
    let hips = hip_line(keypoints)?;
    Some(wrap_degrees(shoulders - hips))
}

fn shoulder_line(keypoints: &KeypointSet) -> Option<f64> {
    horizontal_angle(keypoints.get("LShoulder")?, keypoints.get("RShoulder")?)
}

fn hip_line(keypoints: &KeypointSet) -> Option<f64> {
    horizontal_angle(keypoints.get("LHip")?, keypoints.get("RHip")?)
}

fn insert(angles: &mut AngleMap, key: &str, value: Option<f64>) {
    if let Some(value) = value.filter(|v| v.is_finite()) {
        angles.insert(key.to_string(), value);
    }
}

fn frontal_gate(keypoints: &KeypointSet, required: &[&str], settings: &MovementSettings) -> Step {
    require_keypoints(keypoints, required)?;
    require_facing_camera(keypoints, settings.facing_camera_threshold_px)
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Flexion
// ---------------------------------------------------------------------------

/// Forward bending of the lower back.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerBackFlexion {
    settings: MovementSettings,
}

impl LowerBackFlexion {
    /// Creates the movement.
    #[must_use]
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }
}

impl Movement for LowerBackFlexion {
    fn name(&self) -> &str {
        "lower_back_flexion"
    }

    fn required_keypoints(&self) -> Vec<String> {
        to_strings(&SAGITTAL_KEYPOINTS)
    }

    fn primary_angle(&self) -> &str {
        "trunk"
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
        insert(&mut angles, "trunk", trunk_flexion(&kp, self.settings.side));
        insert(&mut angles, "pelvis", hip_line(&kp));
        for side in [Side::Right, Side::Left] {
            let name = side.angle("hip");
            insert(&mut angles, &name, compute_named_angle(&name, &kp, true));
        }
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        let kp = add_virtual_keypoints(keypoints);
        finish(frontal_gate(&kp, &SAGITTAL_KEYPOINTS, &self.settings))
    }
}

// ---------------------------------------------------------------------------
// Extension
// ---------------------------------------------------------------------------

/// Backward bending of the lower back.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerBackExtension {
    settings: MovementSettings,
}

impl LowerBackExtension {
    /// Creates the movement.
    #[must_use]
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }
}

impl Movement for LowerBackExtension {
    fn name(&self) -> &str {
        "lower_back_extension"
    }

    fn required_keypoints(&self) -> Vec<String> {
        to_strings(&SAGITTAL_KEYPOINTS)
    }

    fn primary_angle(&self) -> &str {
        "trunk"
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
        insert(&mut angles, "trunk", trunk_extension(&kp, self.settings.side));
        insert(&mut angles, "pelvis", hip_line(&kp));
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        let kp = add_virtual_keypoints(keypoints);
        finish(frontal_gate(&kp, &SAGITTAL_KEYPOINTS, &self.settings).and_then(|()| {
            // a forward bend must not be read as extension
            match trunk_flexion(&kp, self.settings.side) {
                Some(flexion) if flexion > EXTENSION_START_LIMIT => {
                    Err(PositionCheck::fail("Please stand upright before extending"))
                }
                _ => Ok(()),
            }
        }))
    }
}

// ---------------------------------------------------------------------------
// Lateral flexion
// ---------------------------------------------------------------------------

/// Side bending of the lower back. Negative values bend toward -x.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerBackLateralFlexion {
    settings: MovementSettings,
}

impl LowerBackLateralFlexion {
    /// Creates the movement.
    #[must_use]
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }
}

impl Movement for LowerBackLateralFlexion {
    fn name(&self) -> &str {
        "lower_back_lateral_flexion"
    }

    fn required_keypoints(&self) -> Vec<String> {
        to_strings(&LATERAL_KEYPOINTS)
    }

    fn primary_angle(&self) -> &str {
        "trunk"
    }

    fn normal_range(&self) -> AngleRange {
        LATERAL_NORMAL
    }

    fn max_range(&self) -> AngleRange {
        LATERAL_MAX
    }

    fn calculate_angles(&self, keypoints: &KeypointSet) -> AngleMap {
        let kp = add_virtual_keypoints(keypoints);
        let mut angles = AngleMap::new();
        insert(&mut angles, "trunk", trunk_lateral(&kp, self.settings.side));
        insert(&mut angles, "shoulders", shoulder_line(&kp));
        insert(&mut angles, "pelvis", hip_line(&kp));
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        let kp = add_virtual_keypoints(keypoints);
        finish(frontal_gate(&kp, &LATERAL_KEYPOINTS, &self.settings))
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Axial rotation of the trunk, reported under `trunk_rotation`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerBackRotation {
    settings: MovementSettings,
}

impl LowerBackRotation {
    /// Creates the movement.
    #[must_use]
    pub fn new(settings: MovementSettings) -> Self {
        Self { settings }
    }
}

impl Movement for LowerBackRotation {
    fn name(&self) -> &str {
        "lower_back_rotation"
    }

    fn required_keypoints(&self) -> Vec<String> {
        to_strings(&ROTATION_KEYPOINTS)
    }

    fn primary_angle(&self) -> &str {
        "trunk_rotation"
    }

    fn normal_range(&self) -> AngleRange {
        ROTATION_NORMAL
    }

    fn max_range(&self) -> AngleRange {
        ROTATION_MAX
    }

    fn calculate_angles(&self, keypoints: &KeypointSet) -> AngleMap {
        let kp = add_virtual_keypoints(keypoints);
        let mut angles = AngleMap::new();
        insert(&mut angles, "shoulders", shoulder_line(&kp));
        insert(&mut angles, "pelvis", hip_line(&kp));
        insert(&mut angles, "trunk_rotation", trunk_rotation(&kp, self.settings.side));
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        let kp = add_virtual_keypoints(keypoints);
        finish(frontal_gate(&kp, &ROTATION_KEYPOINTS, &self.settings).and_then(|()| {
            let lean = trunk_points(&kp).and_then(|(neck, hip)| vertical_angle(hip, neck));
            match lean {
                Some(lean) if lean.abs() > ROTATION_LEAN_LIMIT => Err(PositionCheck::fail(
                    "Please stand more upright for rotation measurement",
                )),
                _ => Ok(()),
            }
        }))
    }
}
