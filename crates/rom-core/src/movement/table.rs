//! Static movement table: primary and secondary angles, ranges and the
//! calculation routine for every supported body part and movement.
//!
//! Bespoke [`Movement`](super::Movement) implementations take their ranges
//! from the same constants, so the table stays the single source of truth
//! for range classification.

use crate::geometry::compute_named_angle;
use crate::movement::{elbow, lower_back, shoulder};
use crate::types::{AngleRange, KeypointSet, Side};

/// Computes a movement's primary angle from keypoints (virtual keypoints
/// already added) for the given side.
pub type CalculateFn = fn(&KeypointSet, Side) -> Option<f64>;

/// Reference to an angle name, optionally side-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleRef {
    /// Used as is, e.g. `"trunk"`
    Fixed(&'static str),
    /// Prefixed with the side, e.g. `"knee"` → `"right knee"`
    Sided(&'static str),
}

impl AngleRef {
    /// Resolves to a concrete angle name.
    #[must_use]
    pub fn resolve(self, side: Side) -> String {
        match self {
            Self::Fixed(name) => name.to_string(),
            Self::Sided(base) => side.angle(base),
        }
    }
}

/// One row of the movement table.
#[derive(Debug, Clone, Copy)]
pub struct MovementSpec {
    pub body_part: &'static str,
    pub movement_type: &'static str,
    pub primary: AngleRef,
    pub secondary: &'static [AngleRef],
    pub normal_range: AngleRange,
    pub max_range: AngleRange,
    pub calculate: CalculateFn,
}

use AngleRef::{Fixed, Sided};

const fn range(min: f64, max: f64) -> AngleRange {
    AngleRange::new(min, max)
}

static MOVEMENT_TABLE: [MovementSpec; 17] = [
    MovementSpec {
        body_part: "lower_back",
        movement_type: "flexion",
        primary: Fixed("trunk"),
        secondary: &[Fixed("pelvis"), Fixed("right hip"), Fixed("left hip")],
        normal_range: lower_back::FLEXION_NORMAL,
        max_range: lower_back::FLEXION_MAX,
        calculate: lower_back::trunk_flexion,
    },
    MovementSpec {
        body_part: "lower_back",
        movement_type: "extension",
        primary: Fixed("trunk"),
        secondary: &[Fixed("pelvis")],
        normal_range: lower_back::EXTENSION_NORMAL,
        max_range: lower_back::EXTENSION_MAX,
        calculate: lower_back::trunk_extension,
    },
    MovementSpec {
        body_part: "lower_back",
        movement_type: "lateral_flexion",
        primary: Fixed("trunk"),
        secondary: &[Fixed("shoulders"), Fixed("pelvis")],
        normal_range: lower_back::LATERAL_NORMAL,
        max_range: lower_back::LATERAL_MAX,
        calculate: lower_back::trunk_lateral,
    },
    MovementSpec {
        body_part: "lower_back",
        movement_type: "rotation",
        primary: Fixed("trunk_rotation"),
        secondary: &[Fixed("shoulders"), Fixed("pelvis")],
        normal_range: lower_back::ROTATION_NORMAL,
        max_range: lower_back::ROTATION_MAX,
        calculate: lower_back::trunk_rotation,
    },
    MovementSpec {
        body_part: "shoulder",
        movement_type: "flexion",
        primary: Sided("shoulder"),
        secondary: &[Fixed("trunk")],
        normal_range: shoulder::FLEXION_NORMAL,
        max_range: shoulder::FLEXION_MAX,
        calculate: shoulder_angle,
    },
    MovementSpec {
        body_part: "shoulder",
        movement_type: "extension",
        primary: Sided("shoulder"),
        secondary: &[Fixed("trunk")],
        normal_range: range(0.0, 60.0),
        max_range: range(0.0, 80.0),
        calculate: shoulder_extension,
    },
    MovementSpec {
        body_part: "shoulder",
        movement_type: "abduction",
        primary: Sided("shoulder"),
        secondary: &[Fixed("trunk")],
        normal_range: range(0.0, 180.0),
        max_range: range(0.0, 190.0),
        calculate: shoulder_angle,
    },
    MovementSpec {
        body_part: "shoulder",
        movement_type: "adduction",
        primary: Sided("shoulder"),
        secondary: &[Fixed("trunk")],
        normal_range: range(0.0, 45.0),
        max_range: range(0.0, 60.0),
        calculate: shoulder_angle,
    },
    MovementSpec {
        body_part: "elbow",
        movement_type: "flexion",
        primary: Sided("elbow"),
        secondary: &[],
        normal_range: elbow::FLEXION_NORMAL,
        max_range: elbow::FLEXION_MAX,
        calculate: elbow_flexion,
    },
    MovementSpec {
        body_part: "elbow",
        movement_type: "extension",
        primary: Sided("elbow"),
        secondary: &[],
        normal_range: elbow::EXTENSION_NORMAL,
        max_range: elbow::EXTENSION_MAX,
        calculate: elbow_angle,
    },
    MovementSpec {
        body_part: "hip",
        movement_type: "flexion",
        primary: Sided("hip"),
        secondary: &[Fixed("pelvis"), Fixed("trunk")],
        normal_range: range(0.0, 120.0),
        max_range: range(0.0, 140.0),
        calculate: hip_angle,
    },
    MovementSpec {
        body_part: "hip",
        movement_type: "extension",
        primary: Sided("hip"),
        secondary: &[Fixed("pelvis")],
        normal_range: range(0.0, 30.0),
        max_range: range(0.0, 40.0),
        calculate: hip_extension,
    },
    MovementSpec {
        body_part: "hip",
        movement_type: "abduction",
        primary: Sided("hip"),
        secondary: &[Fixed("pelvis")],
        normal_range: range(0.0, 45.0),
        max_range: range(0.0, 60.0),
        calculate: hip_angle,
    },
    MovementSpec {
        body_part: "knee",
        movement_type: "flexion",
        primary: Sided("knee"),
        secondary: &[],
        normal_range: range(0.0, 135.0),
        max_range: range(0.0, 160.0),
        calculate: knee_flexion,
    },
    MovementSpec {
        body_part: "knee",
        movement_type: "extension",
        primary: Sided("knee"),
        secondary: &[],
        normal_range: range(0.0, 10.0),
        max_range: range(-10.0, 10.0),
        calculate: knee_angle,
    },
    MovementSpec {
        body_part: "ankle",
        movement_type: "dorsiflexion",
        primary: Sided("ankle"),
        secondary: &[],
        normal_range: range(0.0, 20.0),
        max_range: range(0.0, 30.0),
        calculate: ankle_dorsiflexion,
    },
    MovementSpec {
        body_part: "ankle",
        movement_type: "plantarflexion",
        primary: Sided("ankle"),
        secondary: &[],
        normal_range: range(0.0, 50.0),
        max_range: range(0.0, 60.0),
        calculate: ankle_plantarflexion,
    },
];

// ---------------------------------------------------------------------------
// Calculation routines
// ---------------------------------------------------------------------------

fn named(keypoints: &KeypointSet, side: Side, joint: &str) -> Option<f64> {
    compute_named_angle(&side.angle(joint), keypoints, true)
}

fn shoulder_angle(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    named(keypoints, side, "shoulder")
}

fn shoulder_extension(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    shoulder_angle(keypoints, side).map(|a| -a)
}

fn elbow_angle(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    named(keypoints, side, "elbow")
}

fn elbow_flexion(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    elbow_angle(keypoints, side).map(|a| 180.0 - a)
}

fn hip_angle(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    named(keypoints, side, "hip")
}

fn hip_extension(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    hip_angle(keypoints, side).map(|a| -a)
}

fn knee_angle(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    named(keypoints, side, "knee")
}

fn knee_flexion(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    knee_angle(keypoints, side).map(|a| -a)
}

fn ankle_dorsiflexion(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    named(keypoints, side, "ankle").map(|a| a - 90.0)
}

fn ankle_plantarflexion(keypoints: &KeypointSet, side: Side) -> Option<f64> {
    named(keypoints, side, "ankle").map(|a| 90.0 - a)
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Every table row.
#[must_use]
pub fn movement_specs() -> &'static [MovementSpec] {
    &MOVEMENT_TABLE
}

/// Looks up a table row.
#[must_use]
pub fn movement_spec(body_part: &str, movement_type: &str) -> Option<&'static MovementSpec> {
    MOVEMENT_TABLE
        .iter()
        .find(|spec| spec.body_part == body_part && spec.movement_type == movement_type)
}

/// Body parts in table order, without duplicates.
#[must_use]
pub fn table_body_parts() -> Vec<&'static str> {
    let mut parts: Vec<&'static str> = Vec::new();
    for spec in &MOVEMENT_TABLE {
        if !parts.contains(&spec.body_part) {
            parts.push(spec.body_part);
        }
    }
    parts
}

/// Movement types of a body part in table order.
#[must_use]
pub fn table_movements(body_part: &str) -> Vec<&'static str> {
    MOVEMENT_TABLE
        .iter()
        .filter(|spec| spec.body_part == body_part)
        .map(|spec| spec.movement_type)
        .collect()
}
