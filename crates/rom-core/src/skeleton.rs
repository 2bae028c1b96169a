//! Limb connections used to draw a detected skeleton.

/// Keypoint pairs joined by a limb segment.
pub const SKELETON_CONNECTIONS: [(&str, &str); 16] = [
    ("LShoulder", "RShoulder"),
    ("LShoulder", "LElbow"),
    ("LElbow", "LWrist"),
    ("RShoulder", "RElbow"),
    ("RElbow", "RWrist"),
    ("LShoulder", "LHip"),
    ("RShoulder", "RHip"),
    ("LHip", "RHip"),
    ("LHip", "LKnee"),
    ("LKnee", "LAnkle"),
    ("RHip", "RKnee"),
    ("RKnee", "RAnkle"),
    ("Neck", "Hip"),
    ("Neck", "Head"),
    ("LAnkle", "LBigToe"),
    ("RAnkle", "RBigToe"),
];

/// Owned copy of [`SKELETON_CONNECTIONS`], serialized as `[[a, b], ...]`.
#[must_use]
pub fn skeleton_connections() -> Vec<[String; 2]> {
    SKELETON_CONNECTIONS
        .iter()
        .map(|(a, b)| [(*a).to_string(), (*b).to_string()])
        .collect()
}
