//! Per-session range-of-motion tracker.
//!
//! A tracker accumulates the primary angle of one `(body_part, movement_type)`
//! pair. Each valid sample is pushed into a bounded history; the mean of that
//! history is the smoothed angle, and the extrema of the smoothed series only
//! ever widen until [`RomTracker::reset`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SMOOTHING_WINDOW;
use crate::types::{round_to, AngleMap};

/// ROM snapshot, rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RomSnapshot {
    /// Smoothed current angle
    pub current: f64,
    /// Smallest smoothed angle seen
    pub min: f64,
    /// Largest smoothed angle seen
    pub max: f64,
    /// `max - min`
    pub range: f64,
}

impl RomSnapshot {
    fn rounded(current: f64, min: f64, max: f64) -> Self {
        Self {
            current: round_to(current, 1),
            min: round_to(min, 1),
            max: round_to(max, 1),
            range: round_to(max - min, 1),
        }
    }
}

/// Lifecycle of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    /// No valid sample yet
    Empty,
    /// At least one valid sample; extrema defined
    Tracking,
}

/// Persisted form of a tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerRecord {
    pub min_angle: Option<f64>,
    pub max_angle: Option<f64>,
    pub frame_count: u64,
    pub valid_frame_count: u64,
    pub body_part: String,
    pub movement_type: String,
    #[serde(default)]
    pub angle_history: Vec<f64>,
}

/// Smoothed range-of-motion accumulator for one movement.
#[derive(Debug, Clone)]
pub struct RomTracker {
    body_part: String,
    movement_type: String,
    window: usize,
    history: VecDeque<f64>,
    min_angle: Option<f64>,
    max_angle: Option<f64>,
    frame_count: u64,
    valid_frame_count: u64,
}

impl RomTracker {
    /// Creates an empty tracker. A zero window is treated as one.
    #[must_use]
    pub fn new(
        body_part: impl Into<String>,
        movement_type: impl Into<String>,
        window: usize,
    ) -> Self {
        let window = window.max(1);
        Self {
            body_part: body_part.into(),
            movement_type: movement_type.into(),
            window,
            history: VecDeque::with_capacity(window),
            min_angle: None,
            max_angle: None,
            frame_count: 0,
            valid_frame_count: 0,
        }
    }

    /// Creates an empty tracker with the default smoothing window.
    #[must_use]
    pub fn with_default_window(body_part: impl Into<String>, movement_type: impl Into<String>) -> Self {
        Self::new(body_part, movement_type, DEFAULT_SMOOTHING_WINDOW)
    }

    /// Feeds one frame's angles. Every call counts as a frame; only a finite
    /// `angles[primary]` counts as a valid sample.
    pub fn update(&mut self, angles: &AngleMap, primary: &str) -> RomSnapshot {
        self.record(angles.get(primary).copied())
    }

    /// Feeds one primary-angle reading directly.
    pub fn record(&mut self, angle: Option<f64>) -> RomSnapshot {
        self.frame_count += 1;
        let Some(angle) = angle.filter(|a| a.is_finite()) else {
            return self.current_rom();
        };

        self.valid_frame_count += 1;
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(angle);

        let smoothed = self.smoothed().unwrap_or(angle);
        let min = self.min_angle.map_or(smoothed, |m| m.min(smoothed));
        let max = self.max_angle.map_or(smoothed, |m| m.max(smoothed));
        self.min_angle = Some(min);
        self.max_angle = Some(max);

        RomSnapshot::rounded(smoothed, min, max)
    }

    /// Current snapshot; all zeros while [`TrackerState::Empty`].
    #[must_use]
    pub fn current_rom(&self) -> RomSnapshot {
        match (self.smoothed(), self.min_angle, self.max_angle) {
            (Some(current), Some(min), Some(max)) => RomSnapshot::rounded(current, min, max),
            _ => RomSnapshot::default(),
        }
    }

    /// Clears history, extrema and both counters.
    pub fn reset(&mut self) {
        self.history.clear();
        self.min_angle = None;
        self.max_angle = None;
        self.frame_count = 0;
        self.valid_frame_count = 0;
    }

    #[must_use]
    pub fn state(&self) -> TrackerState {
        if self.min_angle.is_some() && !self.history.is_empty() {
            TrackerState::Tracking
        } else {
            TrackerState::Empty
        }
    }

    fn smoothed(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
    }

    #[must_use]
    pub fn body_part(&self) -> &str {
        &self.body_part
    }

    #[must_use]
    pub fn movement_type(&self) -> &str {
        &self.movement_type
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn valid_frame_count(&self) -> u64 {
        self.valid_frame_count
    }

    /// Unrounded smallest smoothed angle, if any.
    #[must_use]
    pub fn min_angle(&self) -> Option<f64> {
        self.min_angle
    }

    /// Unrounded largest smoothed angle, if any.
    #[must_use]
    pub fn max_angle(&self) -> Option<f64> {
        self.max_angle
    }

    /// Raw samples currently in the smoothing window, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Captures the tracker for persistence.
    #[must_use]
    pub fn to_record(&self) -> TrackerRecord {
        TrackerRecord {
            min_angle: self.min_angle,
            max_angle: self.max_angle,
            frame_count: self.frame_count,
            valid_frame_count: self.valid_frame_count,
            body_part: self.body_part.clone(),
            movement_type: self.movement_type.clone(),
            angle_history: self.history.iter().copied().collect(),
        }
    }

    /// Rebuilds a tracker from a persisted record. Only the newest `window`
    /// history samples are kept; non-finite values are dropped.
    #[must_use]
    pub fn from_record(record: TrackerRecord, window: usize) -> Self {
        let mut tracker = Self::new(record.body_part, record.movement_type, window);
        let finite: Vec<f64> = record
            .angle_history
            .into_iter()
            .filter(|a| a.is_finite())
            .collect();
        let skip = finite.len().saturating_sub(tracker.window);
        tracker.history.extend(finite.into_iter().skip(skip));
        tracker.min_angle = record.min_angle.filter(|a| a.is_finite());
        tracker.max_angle = record.max_angle.filter(|a| a.is_finite());
        tracker.frame_count = record.frame_count;
        tracker.valid_frame_count = record.valid_frame_count;
        tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn angles(primary: f64) -> AngleMap {
        let mut map = AngleMap::new();
        map.insert("trunk".to_string(), primary);
        map
    }

    #[test]
    fn test_accumulation_window_five() {
        let mut tracker = RomTracker::new("lower_back", "flexion", 5);
        let mut last = RomSnapshot::default();
        for angle in [10.0, 20.0, 15.0, 30.0, 5.0] {
            last = tracker.update(&angles(angle), "trunk");
        }
        // smoothed series: 10, 15, 15, 18.75, 16
        assert_abs_diff_eq!(last.current, 16.0);
        assert_abs_diff_eq!(last.min, 10.0);
        assert_abs_diff_eq!(last.max, 18.8);
        assert_abs_diff_eq!(last.range, 8.8);
        assert_eq!(tracker.frame_count(), 5);
        assert_eq!(tracker.valid_frame_count(), 5);
    }

    #[test]
    fn test_window_one_tracks_raw_extrema() {
        let mut tracker = RomTracker::new("lower_back", "flexion", 1);
        for angle in [10.0, 20.0, 15.0, 30.0, 5.0] {
            tracker.update(&angles(angle), "trunk");
        }
        let rom = tracker.current_rom();
        assert_abs_diff_eq!(rom.current, 5.0);
        assert_abs_diff_eq!(rom.min, 5.0);
        assert_abs_diff_eq!(rom.max, 30.0);
        assert_abs_diff_eq!(rom.range, 25.0);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut tracker = RomTracker::new("knee", "flexion", 2);
        for angle in [1.0, 2.0, 3.0] {
            tracker.record(Some(angle));
        }
        assert_eq!(tracker.history().collect::<Vec<_>>(), vec![2.0, 3.0]);
        assert_abs_diff_eq!(tracker.current_rom().current, 2.5);
    }

    #[test]
    fn test_missing_and_nan_count_as_frames_only() {
        let mut tracker = RomTracker::with_default_window("lower_back", "flexion");
        tracker.update(&angles(12.0), "trunk");
        let before = tracker.current_rom();
        let after_missing = tracker.update(&AngleMap::new(), "trunk");
        let after_nan = tracker.update(&angles(f64::NAN), "trunk");
        assert_eq!(before, after_missing);
        assert_eq!(before, after_nan);
        assert_eq!(tracker.frame_count(), 3);
        assert_eq!(tracker.valid_frame_count(), 1);
    }

    #[test]
    fn test_empty_state_reports_zeros() {
        let mut tracker = RomTracker::with_default_window("lower_back", "flexion");
        assert_eq!(tracker.state(), TrackerState::Empty);
        assert_eq!(tracker.current_rom(), RomSnapshot::default());
        tracker.update(&AngleMap::new(), "trunk");
        assert_eq!(tracker.state(), TrackerState::Empty);
        assert_eq!(tracker.frame_count(), 1);
    }

    #[test]
    fn test_reset() {
        let mut tracker = RomTracker::with_default_window("lower_back", "flexion");
        for angle in [10.0, 40.0, 25.0] {
            tracker.update(&angles(angle), "trunk");
        }
        assert_eq!(tracker.state(), TrackerState::Tracking);
        tracker.reset();
        let rom = tracker.current_rom();
        assert_eq!(rom, RomSnapshot::default());
        assert_eq!(tracker.frame_count(), 0);
        assert_eq!(tracker.valid_frame_count(), 0);
        assert_eq!(tracker.state(), TrackerState::Empty);
    }

    #[test]
    fn test_record_round_trip_reproduces_next_snapshot() {
        let mut original = RomTracker::new("hip", "flexion", 3);
        for angle in [30.0, 45.0, 60.0, 50.0] {
            original.update(&angles(angle), "trunk");
        }
        let json = serde_json::to_string(&original.to_record()).unwrap();
        let record: TrackerRecord = serde_json::from_str(&json).unwrap();
        let mut restored = RomTracker::from_record(record, 3);

        assert_eq!(restored.current_rom(), original.current_rom());
        let a = original.update(&angles(70.0), "trunk");
        let b = restored.update(&angles(70.0), "trunk");
        assert_eq!(a, b);
        assert_eq!(restored.frame_count(), original.frame_count());
        assert_eq!(restored.body_part(), "hip");
    }

    #[test]
    fn test_from_record_truncates_to_window() {
        let record = TrackerRecord {
            min_angle: Some(1.0),
            max_angle: Some(9.0),
            frame_count: 9,
            valid_frame_count: 9,
            body_part: "knee".into(),
            movement_type: "flexion".into(),
            angle_history: (1..=9).map(f64::from).collect(),
        };
        let tracker = RomTracker::from_record(record, 2);
        assert_eq!(tracker.history().collect::<Vec<_>>(), vec![8.0, 9.0]);
        assert_eq!(tracker.window(), 2);
    }

    #[test]
    fn test_record_json_field_names() {
        let tracker = RomTracker::new("elbow", "flexion", 5);
        let value = serde_json::to_value(tracker.to_record()).unwrap();
        for key in [
            "min_angle",
            "max_angle",
            "frame_count",
            "valid_frame_count",
            "body_part",
            "movement_type",
            "angle_history",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["min_angle"].is_null());
    }
}
