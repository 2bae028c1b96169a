//! Named-angle evaluation over keypoint sets.

use crate::geometry::angle::{apply_fixed_angle_transform, points_to_angle};
use crate::geometry::definitions::{angle_definition, angle_definitions};
use crate::types::{AngleMap, KeypointSet, Point2};

const VIRTUAL_KEYPOINTS: [(&str, [&str; 2]); 2] =
    [("Neck", ["LShoulder", "RShoulder"]), ("Hip", ["LHip", "RHip"])];

/// The left/right pair a virtual point is the midpoint of, or `None` for
/// any other name.
#[must_use]
pub fn virtual_keypoint_sources(name: &str) -> Option<[&'static str; 2]> {
    VIRTUAL_KEYPOINTS
        .iter()
        .find(|(virtual_name, _)| *virtual_name == name)
        .map(|(_, sources)| *sources)
}

/// Returns a copy of `keypoints` with virtual `Neck` and `Hip` added.
///
/// `Neck` is the shoulder midpoint and `Hip` the hip midpoint. Existing
/// entries are never overwritten, so the function is idempotent.
#[must_use]
pub fn add_virtual_keypoints(keypoints: &KeypointSet) -> KeypointSet {
    let mut out = keypoints.clone();
    for (name, [left, right]) in VIRTUAL_KEYPOINTS {
        if out.contains(name) {
            continue;
        }
        if let (Some(l), Some(r)) = (keypoints.get(left), keypoints.get(right)) {
            out.insert(name, l.midpoint(r));
        }
    }
    out
}

/// Returns `true` for side-specific keypoint names such as `LShoulder` or `RHeel`.
#[must_use]
pub fn is_side_prefixed(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('L' | 'R'), Some(second)) if second.is_ascii_uppercase()
    )
}

/// Image x direction the subject faces, judged from the feet: `-1.0` when
/// either foot points toward -x, `1.0` otherwise. `None` unless both heels
/// and big toes are visible.
#[must_use]
pub fn feet_direction(keypoints: &KeypointSet) -> Option<f64> {
    let foot_delta = |toe: &str, heel: &str| -> Option<f64> {
        Some(keypoints.get(toe)?.x - keypoints.get(heel)?.x)
    };
    let left = foot_delta("LBigToe", "LHeel")?;
    let right = foot_delta("RBigToe", "RHeel")?;
    Some(if left < 0.0 || right < 0.0 { -1.0 } else { 1.0 })
}

/// Returns `true` when both feet are visible and either points toward -x.
#[must_use]
pub fn is_facing_reversed(keypoints: &KeypointSet) -> bool {
    feet_direction(keypoints) == Some(-1.0)
}

/// Computes the raw geometric angle of a named definition, before its
/// offset, scale and wrap are applied.
///
/// Returns `None` when the name is unknown, a keypoint is missing, or the
/// geometry is degenerate. With `flip_left_right`, a subject whose feet point
/// toward -x has the x coordinate of every side-prefixed point mirrored so the
/// sign convention does not depend on walking direction.
#[must_use]
pub fn raw_named_angle(name: &str, keypoints: &KeypointSet, flip_left_right: bool) -> Option<f64> {
    let definition = angle_definition(name)?;
    let mut points = definition
        .points
        .iter()
        .map(|kp| keypoints.get(kp))
        .collect::<Option<Vec<Point2>>>()?;

    if flip_left_right
        && definition.points.iter().any(|kp| is_side_prefixed(kp))
        && is_facing_reversed(keypoints)
    {
        for (kp, point) in definition.points.iter().zip(points.iter_mut()) {
            if is_side_prefixed(kp) {
                point.x = -point.x;
            }
        }
    }

    points_to_angle(&points)
}

/// Computes one named angle in clinical degrees.
///
/// See [`raw_named_angle`] for when the angle is unavailable.
#[must_use]
pub fn compute_named_angle(
    name: &str,
    keypoints: &KeypointSet,
    flip_left_right: bool,
) -> Option<f64> {
    let definition = angle_definition(name)?;
    let raw = raw_named_angle(name, keypoints, flip_left_right)?;
    let angle = apply_fixed_angle_transform(raw, definition);
    angle.is_finite().then_some(angle)
}

/// Computes several named angles, keeping only those that resolve.
///
/// `names = None` evaluates every known definition.
#[must_use]
pub fn compute_many_named_angles(
    keypoints: &KeypointSet,
    names: Option<&[&str]>,
    flip_left_right: bool,
) -> AngleMap {
    let resolve = |name: &str| {
        compute_named_angle(name, keypoints, flip_left_right).map(|angle| (name.to_string(), angle))
    };
    match names {
        Some(names) => names.iter().filter_map(|name| resolve(*name)).collect(),
        None => angle_definitions().iter().filter_map(|def| resolve(def.name)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn standing() -> KeypointSet {
        KeypointSet::new()
            .with("LShoulder", (390.0, 100.0))
            .with("RShoulder", (250.0, 100.0))
            .with("LHip", (360.0, 250.0))
            .with("RHip", (280.0, 250.0))
            .with("RElbow", (250.0, 180.0))
            .with("RWrist", (250.0, 260.0))
            .with("RKnee", (280.0, 350.0))
            .with("RAnkle", (280.0, 450.0))
    }

    #[test]
    fn test_virtual_keypoints_are_midpoints() {
        let out = add_virtual_keypoints(&standing());
        assert_eq!(out.get("Neck"), Some(Point2::new(320.0, 100.0)));
        assert_eq!(out.get("Hip"), Some(Point2::new(320.0, 250.0)));
    }

    #[test]
    fn test_virtual_keypoints_never_overwrite() {
        let set = standing().with("Neck", (1.0, 1.0));
        let out = add_virtual_keypoints(&set);
        assert_eq!(out.get("Neck"), Some(Point2::new(1.0, 1.0)));
    }

    #[test]
    fn test_virtual_keypoints_need_both_sides() {
        let set = KeypointSet::new().with("LShoulder", (1.0, 1.0));
        assert!(!add_virtual_keypoints(&set).contains("Neck"));
    }

    #[test]
    fn test_side_prefix_detection() {
        assert!(is_side_prefixed("LShoulder"));
        assert!(is_side_prefixed("RHeel"));
        assert!(!is_side_prefixed("Neck"));
        assert!(!is_side_prefixed("Hip"));
        assert!(!is_side_prefixed("L"));
        assert!(!is_side_prefixed("Ribs"));
    }

    #[test]
    fn test_virtual_keypoint_sources() {
        assert_eq!(virtual_keypoint_sources("Neck"), Some(["LShoulder", "RShoulder"]));
        assert_eq!(virtual_keypoint_sources("Hip"), Some(["LHip", "RHip"]));
        assert_eq!(virtual_keypoint_sources("RHip"), None);
    }

    #[test]
    fn test_feet_direction() {
        let forward = KeypointSet::new()
            .with("LHeel", (100.0, 500.0))
            .with("LBigToe", (120.0, 500.0))
            .with("RHeel", (110.0, 500.0))
            .with("RBigToe", (130.0, 500.0));
        assert_eq!(feet_direction(&forward), Some(1.0));
        let turned = forward.clone().with("RBigToe", (90.0, 500.0));
        assert_eq!(feet_direction(&turned), Some(-1.0));
        assert!(is_facing_reversed(&turned));
        assert_eq!(feet_direction(&standing()), None);
    }

    #[test]
    fn test_straight_limbs_read_zero() {
        let set = add_virtual_keypoints(&standing());
        assert_abs_diff_eq!(compute_named_angle("right elbow", &set, false).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compute_named_angle("right knee", &set, false).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compute_named_angle("pelvis", &set, false).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compute_named_angle("shoulders", &set, false).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_keypoint_is_unavailable() {
        let set = standing();
        assert!(compute_named_angle("left knee", &set, false).is_none());
        assert!(compute_named_angle("no such angle", &set, false).is_none());
    }

    #[test]
    fn test_flip_mirrors_side_points_when_feet_point_left() {
        let bent = KeypointSet::new()
            .with("RWrist", (300.0, 100.0))
            .with("RElbow", (200.0, 100.0))
            .with("RShoulder", (200.0, 0.0));
        let plain = compute_named_angle("right elbow", &bent, true).unwrap();

        let reversed = bent
            .clone()
            .with("LHeel", (100.0, 500.0))
            .with("LBigToe", (80.0, 500.0))
            .with("RHeel", (120.0, 500.0))
            .with("RBigToe", (100.0, 500.0));
        let flipped = compute_named_angle("right elbow", &reversed, true).unwrap();
        let unflipped = compute_named_angle("right elbow", &reversed, false).unwrap();

        assert_abs_diff_eq!(unflipped, plain, epsilon = 1e-9);
        assert_abs_diff_eq!(flipped, -plain, epsilon = 1e-9);
    }

    #[test]
    fn test_raw_angle_skips_transform() {
        let set = add_virtual_keypoints(&standing());
        let raw = raw_named_angle("right elbow", &set, false).unwrap();
        assert_abs_diff_eq!(raw.abs(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_compute_many_skips_unresolved() {
        let set = add_virtual_keypoints(&standing());
        let angles = compute_many_named_angles(&set, Some(&["right knee", "left knee", "trunk"]), false);
        assert!(angles.contains_key("right knee"));
        assert!(angles.contains_key("trunk"));
        assert!(!angles.contains_key("left knee"));

        let all = compute_many_named_angles(&set, None, false);
        assert!(all.len() >= angles.len());
        assert!(all.values().all(|a| a.is_finite()));
    }
}
