//! Classification of a measured angle against a movement's ranges.

use serde::{Deserialize, Serialize};

use crate::types::AngleRange;

/// Result of classifying one angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeAssessment {
    /// Angle lies within the normal range
    pub in_normal_range: bool,
    /// Angle lies within the safe (max) range
    pub in_max_range: bool,
    /// `false` when the angle is beyond either safe bound
    pub is_safe: bool,
    /// Human-readable status
    pub message: String,
}

/// Classifies `angle` in four tiers: below the safe minimum, above the safe
/// maximum, outside normal but safe, and within normal.
#[must_use]
pub fn assess_range(angle: f64, normal: AngleRange, max: AngleRange) -> RangeAssessment {
    let in_normal_range = normal.contains(angle);
    let in_max_range = max.contains(angle);
    let (is_safe, message) = if angle < max.min {
        (false, format!("Angle {angle:.1}° is below minimum safe range"))
    } else if angle > max.max {
        (false, format!("Angle {angle:.1}° exceeds maximum safe range"))
    } else if !in_normal_range {
        (true, format!("Angle {angle:.1}° is outside normal range"))
    } else {
        (true, "Angle is within normal range".to_string())
    };
    RangeAssessment {
        in_normal_range,
        in_max_range,
        is_safe,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMAL: AngleRange = AngleRange::new(0.0, 60.0);
    const MAX: AngleRange = AngleRange::new(0.0, 90.0);

    #[test]
    fn test_within_normal() {
        let a = assess_range(30.0, NORMAL, MAX);
        assert!(a.in_normal_range && a.in_max_range && a.is_safe);
        assert_eq!(a.message, "Angle is within normal range");
    }

    #[test]
    fn test_outside_normal_but_safe() {
        let a = assess_range(75.25, NORMAL, MAX);
        assert!(!a.in_normal_range);
        assert!(a.in_max_range);
        assert!(a.is_safe);
        assert_eq!(a.message, "Angle 75.2° is outside normal range");
    }

    #[test]
    fn test_unsafe_tiers() {
        let below = assess_range(-5.0, NORMAL, MAX);
        assert!(!below.is_safe);
        assert_eq!(below.message, "Angle -5.0° is below minimum safe range");

        let above = assess_range(95.0, NORMAL, MAX);
        assert!(!above.is_safe && !above.in_max_range);
        assert_eq!(above.message, "Angle 95.0° exceeds maximum safe range");
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(assess_range(60.0, NORMAL, MAX).in_normal_range);
        assert!(assess_range(90.0, NORMAL, MAX).is_safe);
    }
}
