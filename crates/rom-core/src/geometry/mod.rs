//! Angle geometry for 2D keypoints.
//!
//! Everything here is pure: no state, no allocation beyond the returned
//! values. Unresolvable angles (missing keypoints, degenerate vectors,
//! unsupported point counts) are reported as `None`, never as errors.
//!
//! - [`angle`]: the multi-point angle formula, the offset/scale/wrap
//!   transform, and reference-axis helpers
//! - [`definitions`]: the static table of named joint and segment angles
//! - [`keypoints`]: virtual keypoints, flip correction and named-angle
//!   evaluation over a [`KeypointSet`](crate::types::KeypointSet)

pub mod angle;
pub mod definitions;
pub mod keypoints;

pub use angle::{
    apply_fixed_angle_transform, horizontal_angle, points_to_angle, vertical_angle, wrap_degrees,
};
pub use definitions::{angle_definition, angle_definitions, AngleDefinition, AngleKind, WrapRule};
pub use keypoints::{
    add_virtual_keypoints, compute_many_named_angles, compute_named_angle, feet_direction,
    is_facing_reversed, is_side_prefixed, raw_named_angle, virtual_keypoint_sources,
};
