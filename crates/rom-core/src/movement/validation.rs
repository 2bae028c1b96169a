//! Reusable position-validation steps.
//!
//! Each step returns `Err(PositionCheck)` on failure so validators can chain
//! them with `?` and finish with [`finish`].

use crate::movement::PositionCheck;
use crate::types::KeypointSet;

/// Result of a single validation step.
pub type Step = Result<(), PositionCheck>;

/// Collapses a chain of steps into a [`PositionCheck`].
#[must_use]
pub fn finish(result: Step) -> PositionCheck {
    result.err().unwrap_or_else(PositionCheck::ok)
}

/// Fails with `"Cannot detect: a, b"` listing missing keypoints in `required` order.
pub fn require_keypoints<S: AsRef<str>>(keypoints: &KeypointSet, required: &[S]) -> Step {
    let missing = keypoints.missing(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PositionCheck::fail(format!("Cannot detect: {}", missing.join(", "))))
    }
}

/// Shoulder width in pixels, if both shoulders are visible.
#[must_use]
pub fn shoulder_width(keypoints: &KeypointSet) -> Option<f64> {
    keypoints.distance("LShoulder", "RShoulder")
}

/// Fails when both shoulders are visible but closer than `threshold_px`.
pub fn require_facing_camera(keypoints: &KeypointSet, threshold_px: f64) -> Step {
    match shoulder_width(keypoints) {
        Some(width) if width < threshold_px => {
            Err(PositionCheck::fail("Please face the camera directly"))
        }
        _ => Ok(()),
    }
}

/// Fails with `message` when segment `a`–`b` is shorter than `min_length_px`.
///
/// Missing endpoints are not checked here.
pub fn require_segment(
    keypoints: &KeypointSet,
    a: &str,
    b: &str,
    min_length_px: f64,
    message: impl FnOnce() -> String,
) -> Step {
    match keypoints.distance(a, b) {
        Some(length) if length < min_length_px => Err(PositionCheck::fail(message())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keypoints_message() {
        let kp = KeypointSet::new().with("Neck", (0.0, 0.0));
        let check = finish(require_keypoints(&kp, &["Neck", "Hip", "LHip"]));
        assert!(!check.valid);
        assert_eq!(check.message, "Cannot detect: Hip, LHip");
    }

    #[test]
    fn test_facing_camera() {
        let narrow = KeypointSet::new()
            .with("LShoulder", (322.0, 100.0))
            .with("RShoulder", (318.0, 100.0));
        assert!(require_facing_camera(&narrow, 50.0).is_err());
        assert!(require_facing_camera(&narrow, 3.0).is_ok());
        assert!(require_facing_camera(&KeypointSet::new(), 50.0).is_ok());
    }

    #[test]
    fn test_segment_length() {
        let kp = KeypointSet::new().with("A", (0.0, 0.0)).with("B", (0.0, 40.0));
        let step = require_segment(&kp, "A", "B", 50.0, || "too short".to_string());
        assert_eq!(finish(step).message, "too short");
        assert!(require_segment(&kp, "A", "C", 50.0, String::new).is_ok());
    }

    #[test]
    fn test_finish_ok() {
        assert_eq!(finish(Ok(())), PositionCheck::ok());
    }
}
