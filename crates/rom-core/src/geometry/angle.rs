//! The generic 2/3/4-point angle formula and its normalisation.

use crate::geometry::definitions::{AngleDefinition, WrapRule};
use crate::types::Point2;

/// Signed angle in degrees defined by 2, 3 or 4 points.
///
/// - 2 points `[a, b]`: direction of `a - b` against the horizontal axis.
/// - 3 points `[a, b, c]`: angle at vertex `b` from ray `b→c` to ray `b→a`.
/// - 4 points `[a, b, c, d]`: angle from segment `c→d` to segment `a→b`.
///
/// The result lies in (-180°, 180°]. Returns `None` for any other point
/// count, for non-finite coordinates, and when either vector has zero length.
#[must_use]
pub fn points_to_angle(points: &[Point2]) -> Option<f64> {
    if points.iter().any(|p| !p.is_finite()) {
        return None;
    }
    let (u, v) = match *points {
        [a, b] => (a.sub(b), Point2::new(1.0, 0.0)),
        [a, b, c] => (a.sub(b), c.sub(b)),
        [a, b, c, d] => (b.sub(a), d.sub(c)),
        _ => return None,
    };
    signed_angle_between(v, u)
}

/// Signed rotation from `from` to `to` in degrees, in (-180°, 180°].
fn signed_angle_between(from: Point2, to: Point2) -> Option<f64> {
    if from.norm() == 0.0 || to.norm() == 0.0 {
        return None;
    }
    let degrees = from.cross(to).atan2(from.dot(to)).to_degrees();
    // atan2 yields -180 for the negative-zero cross product case
    Some(if degrees <= -180.0 { 180.0 } else { degrees })
}

/// Applies a definition's offset and scale, then wraps by its [`WrapRule`].
#[must_use]
pub fn apply_fixed_angle_transform(raw_degrees: f64, definition: &AngleDefinition) -> f64 {
    let angle = (raw_degrees + definition.offset) * definition.scale;
    match definition.wrap {
        WrapRule::HalfTurn => wrap_half_turn(angle),
        WrapRule::FullTurn => wrap_degrees(angle),
    }
}

/// Wraps an angle into (-180°, 180°].
#[must_use]
pub fn wrap_degrees(angle: f64) -> f64 {
    wrap_period(angle, 360.0)
}

/// Wraps a line orientation into (-90°, 90°].
fn wrap_half_turn(angle: f64) -> f64 {
    wrap_period(angle, 180.0)
}

/// Wraps into (-period/2, period/2]. Non-finite input is returned unchanged.
fn wrap_period(angle: f64, period: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let half = period / 2.0;
    let wrapped = (angle + half).rem_euclid(period) - half;
    if wrapped <= -half {
        wrapped + period
    } else {
        wrapped
    }
}

/// Orientation of the vector `p1 → p2` against the image x axis, in degrees.
#[must_use]
pub fn horizontal_angle(p1: Point2, p2: Point2) -> Option<f64> {
    let v = p2.sub(p1);
    if v.norm() == 0.0 {
        return None;
    }
    Some(v.y.atan2(v.x).to_degrees())
}

/// Signed deviation of the vector `p1 → p2` from the image "up" axis, in (-180°, 180°].
///
/// Positive when the vector leans toward +x. A vector pointing straight
/// down (e.g. Neck → Hip for an upright trunk) yields 180°.
#[must_use]
pub fn vertical_angle(p1: Point2, p2: Point2) -> Option<f64> {
    let v = p2.sub(p1);
    if v.norm() == 0.0 {
        return None;
    }
    Some(wrap_degrees(v.x.atan2(-v.y).to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::definitions::angle_definition;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_two_point_angle_against_horizontal() {
        assert_abs_diff_eq!(points_to_angle(&[p(1.0, 0.0), p(0.0, 0.0)]).unwrap(), 0.0);
        assert_abs_diff_eq!(points_to_angle(&[p(0.0, 1.0), p(0.0, 0.0)]).unwrap(), 90.0);
        assert_abs_diff_eq!(points_to_angle(&[p(-1.0, 0.0), p(0.0, 0.0)]).unwrap(), 180.0);
    }

    #[test]
    fn test_three_point_right_angle() {
        // ray b→c along +x, ray b→a along +y
        let angle = points_to_angle(&[p(0.0, 10.0), p(0.0, 0.0), p(10.0, 0.0)]).unwrap();
        assert_abs_diff_eq!(angle, 90.0, epsilon = 1e-9);
        let mirrored = points_to_angle(&[p(10.0, 0.0), p(0.0, 0.0), p(0.0, 10.0)]).unwrap();
        assert_abs_diff_eq!(mirrored, -90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_three_point_straight_line() {
        let angle = points_to_angle(&[p(0.0, 0.0), p(0.0, 50.0), p(0.0, 100.0)]).unwrap();
        assert_abs_diff_eq!(angle, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_four_point_segments() {
        // a→b along +x, c→d along +y
        let angle =
            points_to_angle(&[p(0.0, 0.0), p(5.0, 0.0), p(3.0, 3.0), p(3.0, 9.0)]).unwrap();
        assert_abs_diff_eq!(angle, -90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unsupported_counts_and_degenerate_vectors() {
        assert!(points_to_angle(&[]).is_none());
        assert!(points_to_angle(&[p(1.0, 1.0)]).is_none());
        assert!(points_to_angle(&[p(0.0, 0.0); 5]).is_none());
        assert!(points_to_angle(&[p(2.0, 2.0), p(2.0, 2.0)]).is_none());
        assert!(points_to_angle(&[p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0)]).is_none());
        assert!(points_to_angle(&[p(f64::NAN, 0.0), p(0.0, 0.0)]).is_none());
    }

    #[test]
    fn test_transform_applies_offset_then_scale() {
        let elbow = angle_definition("right elbow").unwrap();
        // straight arm: raw 180 -> (180 + 180) * -1 = -360 -> 0
        assert_abs_diff_eq!(apply_fixed_angle_transform(180.0, elbow), 0.0);
        // raw 90 -> -270 -> 90
        assert_abs_diff_eq!(apply_fixed_angle_transform(90.0, elbow), 90.0);
    }

    #[test]
    fn test_transform_half_turn_wrap() {
        let pelvis = angle_definition("pelvis").unwrap();
        assert_abs_diff_eq!(apply_fixed_angle_transform(180.0, pelvis), 0.0);
        assert_abs_diff_eq!(apply_fixed_angle_transform(-100.0, pelvis), -80.0);
        assert_abs_diff_eq!(apply_fixed_angle_transform(90.0, pelvis), 90.0);
    }

    #[test]
    fn test_wrap_degrees_boundaries() {
        assert_abs_diff_eq!(wrap_degrees(180.0), 180.0);
        assert_abs_diff_eq!(wrap_degrees(-180.0), 180.0);
        assert_abs_diff_eq!(wrap_degrees(540.0), 180.0);
        assert_abs_diff_eq!(wrap_degrees(-190.0), 170.0);
        assert!(wrap_degrees(f64::NAN).is_nan());
    }

    #[test]
    fn test_wrap_handles_huge_inputs() {
        for angle in [1e300, -1e300, 7.2e17 + 45.0] {
            let wrapped = wrap_degrees(angle);
            assert!(wrapped > -180.0 && wrapped <= 180.0, "{angle} -> {wrapped}");
            let half = wrap_half_turn(angle);
            assert!(half > -90.0 && half <= 90.0, "{angle} -> {half}");
        }
        assert_abs_diff_eq!(wrap_degrees(3600.0 + 45.0), 45.0);
    }

    #[test]
    fn test_reference_axis_helpers() {
        assert_abs_diff_eq!(vertical_angle(p(320.0, 100.0), p(320.0, 250.0)).unwrap(), 180.0);
        assert_abs_diff_eq!(vertical_angle(p(0.0, 10.0), p(0.0, 0.0)).unwrap(), 0.0);
        assert_abs_diff_eq!(horizontal_angle(p(0.0, 0.0), p(0.0, 5.0)).unwrap(), 90.0);
        assert_abs_diff_eq!(vertical_angle(p(0.0, 10.0), p(10.0, 0.0)).unwrap(), 45.0);
        assert_abs_diff_eq!(vertical_angle(p(0.0, 10.0), p(-10.0, 0.0)).unwrap(), -45.0);
        assert!(vertical_angle(p(1.0, 1.0), p(1.0, 1.0)).is_none());
    }
}
