//! Static registry of named joint and segment angles.
//!
//! Joint angles use three or four keypoints, segment angles two. Offsets and
//! scales map the raw geometric angle onto the clinical convention of each
//! joint; pelvis and shoulders are unoriented lines and wrap within ±90°.

/// How an angle relates its keypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleKind {
    /// Angle between two body segments (3 or 4 keypoints)
    Joint,
    /// Orientation of one segment against the horizontal axis (2 keypoints)
    Segment,
}

/// Wrap-around range applied after offset and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapRule {
    /// (-90°, 90°], for lines whose orientation is ambiguous past perpendicular
    HalfTurn,
    /// (-180°, 180°]
    FullTurn,
}

/// A named angle: its keypoints and the transform to clinical degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDefinition {
    /// Angle name, e.g. `"right knee"`
    pub name: &'static str,
    /// Ordered keypoint names fed to [`points_to_angle`](super::points_to_angle)
    pub points: &'static [&'static str],
    /// Joint or segment angle
    pub kind: AngleKind,
    /// Degrees added to the raw angle
    pub offset: f64,
    /// Multiplier applied after the offset (±1)
    pub scale: f64,
    /// Wrap rule applied last
    pub wrap: WrapRule,
}

const fn joint(name: &'static str, points: &'static [&'static str], offset: f64, scale: f64) -> AngleDefinition {
    AngleDefinition { name, points, kind: AngleKind::Joint, offset, scale, wrap: WrapRule::FullTurn }
}

const fn segment(name: &'static str, points: &'static [&'static str]) -> AngleDefinition {
    AngleDefinition { name, points, kind: AngleKind::Segment, offset: 0.0, scale: -1.0, wrap: WrapRule::FullTurn }
}

const fn line(name: &'static str, points: &'static [&'static str]) -> AngleDefinition {
    AngleDefinition { name, points, kind: AngleKind::Segment, offset: 0.0, scale: -1.0, wrap: WrapRule::HalfTurn }
}

static ANGLE_DEFINITIONS: [AngleDefinition; 24] = [
    // Joint angles
    joint("right ankle", &["RKnee", "RAnkle", "RBigToe", "RHeel"], 90.0, 1.0),
    joint("left ankle", &["LKnee", "LAnkle", "LBigToe", "LHeel"], 90.0, 1.0),
    joint("right knee", &["RAnkle", "RKnee", "RHip"], -180.0, 1.0),
    joint("left knee", &["LAnkle", "LKnee", "LHip"], -180.0, 1.0),
    joint("right hip", &["RKnee", "RHip", "Hip", "Neck"], 0.0, -1.0),
    joint("left hip", &["LKnee", "LHip", "Hip", "Neck"], 0.0, -1.0),
    joint("right shoulder", &["RElbow", "RShoulder", "Hip", "Neck"], 0.0, -1.0),
    joint("left shoulder", &["LElbow", "LShoulder", "Hip", "Neck"], 0.0, -1.0),
    joint("right elbow", &["RWrist", "RElbow", "RShoulder"], 180.0, -1.0),
    joint("left elbow", &["LWrist", "LElbow", "LShoulder"], 180.0, -1.0),
    // Segment angles
    segment("right foot", &["RBigToe", "RHeel"]),
    segment("left foot", &["LBigToe", "LHeel"]),
    segment("right shank", &["RAnkle", "RKnee"]),
    segment("left shank", &["LAnkle", "LKnee"]),
    segment("right thigh", &["RKnee", "RHip"]),
    segment("left thigh", &["LKnee", "LHip"]),
    line("pelvis", &["LHip", "RHip"]),
    segment("trunk", &["Neck", "Hip"]),
    line("shoulders", &["LShoulder", "RShoulder"]),
    segment("head", &["Head", "Neck"]),
    segment("right arm", &["RElbow", "RShoulder"]),
    segment("left arm", &["LElbow", "LShoulder"]),
    segment("right forearm", &["RWrist", "RElbow"]),
    segment("left forearm", &["LWrist", "LElbow"]),
];

/// All named angle definitions.
#[must_use]
pub fn angle_definitions() -> &'static [AngleDefinition] {
    &ANGLE_DEFINITIONS
}

/// Looks up a named angle definition.
#[must_use]
pub fn angle_definition(name: &str) -> Option<&'static AngleDefinition> {
    ANGLE_DEFINITIONS.iter().find(|def| def.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HALPE_26_KEYPOINTS;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = angle_definitions().iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), angle_definitions().len());
    }

    #[test]
    fn test_kind_matches_point_count() {
        for def in angle_definitions() {
            match def.kind {
                AngleKind::Segment => assert_eq!(def.points.len(), 2, "{}", def.name),
                AngleKind::Joint => assert!((3..=4).contains(&def.points.len()), "{}", def.name),
            }
            assert!(def.scale == 1.0 || def.scale == -1.0);
        }
    }

    #[test]
    fn test_only_unoriented_lines_use_half_turn() {
        let half: Vec<_> = angle_definitions()
            .iter()
            .filter(|d| d.wrap == WrapRule::HalfTurn)
            .map(|d| d.name)
            .collect();
        assert_eq!(half, vec!["pelvis", "shoulders"]);
    }

    #[test]
    fn test_points_are_halpe_keypoints() {
        for def in angle_definitions() {
            for point in def.points {
                assert!(HALPE_26_KEYPOINTS.contains(point), "{}: {point}", def.name);
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(angle_definition("right knee").unwrap().offset, -180.0);
        assert!(angle_definition("tail").is_none());
    }
}
