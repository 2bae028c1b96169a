//! Canned coaching text per movement and angle bucket.

use serde::{Deserialize, Serialize};

use crate::types::AngleRange;

/// Guidance attached to every analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Guidance {
    pub instruction: String,
    pub feedback: String,
    pub improvement: String,
}

impl Guidance {
    fn new(instruction: &str, feedback: impl Into<String>, improvement: &str) -> Self {
        Self {
            instruction: instruction.to_string(),
            feedback: feedback.into(),
            improvement: improvement.to_string(),
        }
    }

    /// Guidance for a frame without a detected person.
    #[must_use]
    pub fn no_pose() -> Self {
        Self::new(
            "Please ensure you are visible in the camera",
            "No person detected",
            "Move into the camera view",
        )
    }

    /// Guidance for a frame rejected by position validation.
    #[must_use]
    pub fn invalid_position(message: impl Into<String>) -> Self {
        Self::new(
            "Adjust your position",
            message,
            "Follow the positioning instructions",
        )
    }
}

#[derive(Clone, Copy)]
enum Bucket {
    Start,
    Reached,
    Progress,
}

/// Builds guidance for a measured frame. `feedback` is the range
/// classification message.
#[must_use]
pub fn movement_guidance(
    body_part: &str,
    movement_type: &str,
    angle: f64,
    normal_range: AngleRange,
    feedback: impl Into<String>,
) -> Guidance {
    let (instruction, improvement) = match (body_part, movement_type) {
        ("lower_back", "flexion") => match bucket(angle < 10.0, angle > 60.0) {
            Bucket::Start => ("Bend forward slowly from your hips", "Try to increase your forward bend"),
            Bucket::Reached => ("You've reached good flexion", "Hold this position or slowly return"),
            Bucket::Progress => ("Good position, continue the movement", "Maintain smooth, controlled motion"),
        },
        ("lower_back", "extension") => match bucket(angle > -5.0, angle < -30.0) {
            Bucket::Start => ("Lean backward slowly", "Engage your core for support"),
            Bucket::Reached => ("Maximum extension reached", "Don't push beyond comfort"),
            Bucket::Progress => ("Good extension position", "Keep the movement controlled"),
        },
        ("lower_back", "lateral_flexion") => match bucket(angle.abs() < 5.0, angle.abs() > 30.0) {
            Bucket::Start => ("Bend sideways from your waist", "Keep your body in one plane"),
            Bucket::Reached => ("Good lateral flexion achieved", "Try the other side for balance"),
            Bucket::Progress => ("Continue the side bend", "Keep shoulders and hips aligned"),
        },
        ("lower_back", "rotation") => match bucket(angle.abs() < 10.0, angle.abs() > 45.0) {
            Bucket::Start => ("Rotate your upper body", "Keep hips facing forward"),
            Bucket::Reached => ("Maximum rotation reached", "Hold briefly, then return"),
            Bucket::Progress => ("Good rotation angle", "Maintain controlled movement"),
        },
        _ => {
            let fraction = range_fraction(angle, normal_range);
            match bucket(fraction < 0.1, fraction > 1.0) {
                Bucket::Start => ("Begin the movement slowly", "Try to move a little further each time"),
                Bucket::Reached => ("You've reached the end of the normal range", "Don't push beyond comfort"),
                Bucket::Progress => ("Good position, continue the movement", "Keep the movement smooth and controlled"),
            }
        }
    };
    Guidance::new(instruction, feedback, improvement)
}

fn bucket(start: bool, reached: bool) -> Bucket {
    if start {
        Bucket::Start
    } else if reached {
        Bucket::Reached
    } else {
        Bucket::Progress
    }
}

/// Share of the normal range covered, measured from its lower bound.
fn range_fraction(angle: f64, range: AngleRange) -> f64 {
    let span = range.span();
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    (angle - range.min) / span
}
