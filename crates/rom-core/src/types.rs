//! Core data types shared by the geometry, movement and tracking modules.
//!
//! - [`Point2`]: a 2D pixel coordinate
//! - [`KeypointSet`]: name → coordinate mapping for one person in one frame
//! - [`AngleMap`]: name → degrees mapping of resolved angles
//! - [`AngleRange`]: an inclusive `(min, max)` interval in degrees
//! - [`Side`]: which limb a side-specific movement measures

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Keypoint names of the 26-point "body with feet" layout, in model output order.
pub const HALPE_26_KEYPOINTS: [&str; 26] = [
    "Nose", "LEye", "REye", "LEar", "REar", "LShoulder", "RShoulder", "LElbow", "RElbow",
    "LWrist", "RWrist", "LHip", "RHip", "LKnee", "RKnee", "LAnkle", "RAnkle", "Head", "Neck",
    "Hip", "LBigToe", "RBigToe", "LSmallToe", "RSmallToe", "LHeel", "RHeel",
];

/// A 2D point in image pixel space (x grows right, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
}

impl Point2 {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Euclidean norm of the point treated as a vector.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.sub(other).norm()
    }

    /// Dot product with another vector.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component) with another vector.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Named keypoints for a single person in a single frame.
///
/// Sets are produced fresh per frame and treated as values: derived keypoints
/// are added by building a new set (see
/// [`add_virtual_keypoints`](crate::geometry::add_virtual_keypoints)).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeypointSet(BTreeMap<String, Point2>);

impl KeypointSet {
    /// Creates an empty keypoint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, point: impl Into<Point2>) -> Self {
        self.insert(name, point);
        self
    }

    /// Inserts or replaces a keypoint.
    pub fn insert(&mut self, name: impl Into<String>, point: impl Into<Point2>) {
        self.0.insert(name.into(), point.into());
    }

    /// Returns the coordinate of a keypoint, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Point2> {
        self.0.get(name).copied()
    }

    /// Returns `true` if the keypoint is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of keypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no keypoints are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, point)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Point2)> {
        self.0.iter().map(|(name, point)| (name.as_str(), *point))
    }

    /// Returns the names from `required` that are absent, preserving their order.
    #[must_use]
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Pixel distance between two keypoints, if both are present.
    #[must_use]
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(a)?.distance(self.get(b)?))
    }
}

impl<N: Into<String>, P: Into<Point2>> FromIterator<(N, P)> for KeypointSet {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, point)| (name.into(), point.into()))
                .collect(),
        )
    }
}

/// Resolved angles in degrees, keyed by angle name.
pub type AngleMap = BTreeMap<String, f64>;

/// An inclusive angle interval in degrees, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct AngleRange {
    /// Lower bound in degrees
    pub min: f64,
    /// Upper bound in degrees
    pub max: f64,
}

impl AngleRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `angle` lies within the range (inclusive).
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }

    /// Width of the range in degrees.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl From<(f64, f64)> for AngleRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

impl From<AngleRange> for (f64, f64) {
    fn from(range: AngleRange) -> Self {
        (range.min, range.max)
    }
}

impl fmt::Display for AngleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1}°, {:.1}°]", self.min, self.max)
    }
}

/// The body side a side-specific movement is measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Subject's left side
    Left,
    /// Subject's right side
    #[default]
    Right,
}

impl Side {
    /// Keypoint name prefix (`"L"` / `"R"`).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
        }
    }

    /// Lower-case side name used in angle names (`"left"` / `"right"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// The opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Keypoint name for this side, e.g. `Side::Right.keypoint("Elbow") == "RElbow"`.
    #[must_use]
    pub fn keypoint(self, base: &str) -> String {
        format!("{}{base}", self.prefix())
    }

    /// Angle name for this side, e.g. `Side::Left.angle("knee") == "left knee"`.
    #[must_use]
    pub fn angle(self, base: &str) -> String {
        format!("{} {base}", self.name())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rounds to a fixed number of decimal places for presentation.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_point_geometry() {
        let a = Point2::new(3.0, 4.0);
        assert_abs_diff_eq!(a.norm(), 5.0);
        assert_eq!(a.midpoint(Point2::new(5.0, 6.0)), Point2::new(4.0, 5.0));
        assert_abs_diff_eq!(Point2::new(1.0, 0.0).cross(Point2::new(0.0, 1.0)), 1.0);
    }

    #[test]
    fn test_missing_preserves_order() {
        let set = KeypointSet::new().with("Neck", (1.0, 2.0));
        let missing = set.missing(&["Neck", "Hip", "LHip"]);
        assert_eq!(missing, vec!["Hip".to_string(), "LHip".to_string()]);
    }

    #[test]
    fn test_keypoint_set_serializes_as_map() {
        let set = KeypointSet::new().with("Neck", (320.0, 100.0));
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["Neck"]["x"], 320.0);
    }

    #[test]
    fn test_angle_range_serializes_as_pair() {
        let range = AngleRange::new(-30.0, 0.0);
        assert_eq!(serde_json::to_string(&range).unwrap(), "[-30.0,0.0]");
        assert!(range.contains(-30.0));
        assert!(!range.contains(0.1));
    }

    #[test]
    fn test_side_names() {
        assert_eq!(Side::Right.keypoint("Elbow"), "RElbow");
        assert_eq!(Side::Left.angle("knee"), "left knee");
        assert_eq!(Side::default(), Side::Right);
    }

    #[test]
    fn test_round_to() {
        assert_abs_diff_eq!(round_to(18.75, 1), 18.8);
        assert_abs_diff_eq!(round_to(0.12345, 3), 0.123);
    }
}
