//! Table-driven fallback for movements without a bespoke definition.

use crate::geometry::{
    add_virtual_keypoints, angle_definition, compute_named_angle, virtual_keypoint_sources,
};
use crate::movement::table::MovementSpec;
use crate::movement::validation::{finish, require_keypoints, require_segment, Step};
use crate::movement::{Movement, MovementSettings, PositionCheck};
use crate::types::{AngleMap, AngleRange, KeypointSet};

/// A [`Movement`] backed by one row of the movement table.
#[derive(Debug, Clone)]
pub struct TableMovement {
    spec: &'static MovementSpec,
    settings: MovementSettings,
    name: String,
    primary: String,
}

impl TableMovement {
    /// Creates a movement from a table row.
    #[must_use]
    pub fn new(spec: &'static MovementSpec, settings: MovementSettings) -> Self {
        Self {
            spec,
            settings,
            name: format!("{}_{}", spec.body_part, spec.movement_type),
            primary: spec.primary.resolve(settings.side),
        }
    }

    /// Keypoint pairs forming the segments of the primary angle.
    fn primary_segments(&self) -> Vec<(&'static str, &'static str)> {
        let Some(def) = angle_definition(&self.primary) else {
            return Vec::new();
        };
        match *def.points {
            [a, b] => vec![(a, b)],
            [a, b, c] => vec![(a, b), (b, c)],
            [a, b, c, d] => vec![(a, b), (c, d)],
            _ => Vec::new(),
        }
    }
}

impl Movement for TableMovement {
    fn name(&self) -> &str {
        &self.name
    }

    /// Detected keypoints the angle needs; virtual points are replaced by
    /// the pair they are derived from.
    fn required_keypoints(&self) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            let names = match virtual_keypoint_sources(name) {
                Some(pair) => pair.to_vec(),
                None => vec![name],
            };
            for name in names {
                if !required.iter().any(|r| r == name) {
                    required.push(name.to_string());
                }
            }
        };
        if let Some(def) = angle_definition(&self.primary) {
            def.points.iter().for_each(|p| push(*p));
        } else {
            for secondary in self.spec.secondary {
                if let Some(def) = angle_definition(&secondary.resolve(self.settings.side)) {
                    def.points.iter().for_each(|p| push(*p));
                }
            }
        }
        required
    }

    fn primary_angle(&self) -> &str {
        &self.primary
    }

    fn normal_range(&self) -> AngleRange {
        self.spec.normal_range
    }

    fn max_range(&self) -> AngleRange {
        self.spec.max_range
    }

    fn calculate_angles(&self, keypoints: &KeypointSet) -> AngleMap {
        let kp = add_virtual_keypoints(keypoints);
        let mut angles = AngleMap::new();
        if let Some(primary) = (self.spec.calculate)(&kp, self.settings.side) {
            if primary.is_finite() {
                angles.insert(self.primary.clone(), primary);
            }
        }
        for secondary in self.spec.secondary {
            let name = secondary.resolve(self.settings.side);
            if angles.contains_key(&name) {
                continue;
            }
            if let Some(angle) = compute_named_angle(&name, &kp, true) {
                angles.insert(name, angle);
            }
        }
        angles
    }

    fn validate_position(&self, keypoints: &KeypointSet) -> PositionCheck {
        let kp = add_virtual_keypoints(keypoints);
        let min = self.settings.min_segment_length_px;
        let steps = || -> Step {
            require_keypoints(&kp, &self.required_keypoints())?;
            for (a, b) in self.primary_segments() {
                require_segment(&kp, a, b, min, || {
                    format!(
                        "{a}-{b} segment is not clearly visible. \
                         Please position your limb parallel to the camera."
                    )
                })?;
            }
            Ok(())
        };
        finish(steps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::table::movement_spec;
    use crate::types::Side;
    use approx::assert_abs_diff_eq;

    fn knee_flexion(side: Side) -> TableMovement {
        let settings = MovementSettings::default().with_side(side);
        TableMovement::new(movement_spec("knee", "flexion").unwrap(), settings)
    }

    fn bent_right_leg() -> KeypointSet {
        KeypointSet::new()
            .with("RHip", (0.0, 0.0))
            .with("RKnee", (0.0, 100.0))
            .with("RAnkle", (100.0, 100.0))
    }

    #[test]
    fn test_identity_follows_table_and_side() {
        let movement = knee_flexion(Side::Left);
        assert_eq!(movement.name(), "knee_flexion");
        assert_eq!(movement.primary_angle(), "left knee");
        assert_eq!(movement.required_keypoints(), vec!["LAnkle", "LKnee", "LHip"]);
        assert_eq!(movement.normal_range(), AngleRange::new(0.0, 135.0));
        assert_eq!(movement.max_range(), AngleRange::new(0.0, 160.0));
    }

    #[test]
    fn test_calculates_primary_from_table_routine() {
        let angles = knee_flexion(Side::Right).calculate_angles(&bent_right_leg());
        assert_abs_diff_eq!(angles["right knee"], 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_secondary_angles_when_resolvable() {
        let movement = TableMovement::new(
            movement_spec("hip", "flexion").unwrap(),
            MovementSettings::default(),
        );
        let kp = bent_right_leg()
            .with("LHip", (40.0, 0.0))
            .with("LShoulder", (40.0, -150.0))
            .with("RShoulder", (0.0, -150.0));
        let angles = movement.calculate_angles(&kp);
        assert!(angles.contains_key("right hip"));
        assert!(angles.contains_key("pelvis"));
        assert!(angles.contains_key("trunk"));
    }

    #[test]
    fn test_validation_checks_segments() {
        let movement = knee_flexion(Side::Right);
        assert!(movement.validate_position(&bent_right_leg()).valid);

        let short_shank = bent_right_leg().with("RAnkle", (20.0, 100.0));
        let check = movement.validate_position(&short_shank);
        assert_eq!(
            check.message,
            "RAnkle-RKnee segment is not clearly visible. Please position your limb parallel to the camera."
        );

        let check = movement.validate_position(&KeypointSet::new().with("RHip", (0.0, 0.0)));
        assert_eq!(check.message, "Cannot detect: RAnkle, RKnee");
    }

    #[test]
    fn test_required_keypoints_expand_virtual_points() {
        let movement = TableMovement::new(
            movement_spec("lower_back", "flexion").unwrap(),
            MovementSettings::default(),
        );
        let required = movement.required_keypoints();
        assert_eq!(required, vec!["LShoulder", "RShoulder", "LHip", "RHip"]);

        let kp = KeypointSet::new()
            .with("LShoulder", (40.0, -150.0))
            .with("RShoulder", (0.0, -150.0));
        let check = movement.validate_position(&kp);
        assert!(!check.valid);
        assert_eq!(check.message, "Cannot detect: LHip, RHip");
    }
}
