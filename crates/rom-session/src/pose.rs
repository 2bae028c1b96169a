//! Pose detection seam and keypoint naming.
//!
//! The pose model itself is external. It is wrapped in a [`PoseSource`] that
//! the caller constructs once and injects into a [`PoseProcessor`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rom_core::geometry::add_virtual_keypoints;
use rom_core::{KeypointSet, Point2, HALPE_26_KEYPOINTS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A decoded video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    /// Packed pixel data, row-major
    pub pixels: Vec<u8>,
}

/// One person returned by a pose source: points in HALPE-26 order with
/// parallel confidence scores.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectedPerson {
    pub points: Vec<[f64; 2]>,
    pub scores: Vec<f64>,
}

/// Pose source failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PoseError {
    /// The model could not be loaded or is not ready.
    #[error("Pose model unavailable: {message}")]
    ModelUnavailable {
        /// Details
        message: String,
    },

    /// Inference failed for this frame.
    #[error("Pose inference failed: {message}")]
    Inference {
        /// Details
        message: String,
    },

    /// The frame could not be decoded.
    #[error("Invalid frame: {message}")]
    InvalidFrame {
        /// Details
        message: String,
    },
}

/// A pose model that detects people in a frame.
#[async_trait]
pub trait PoseSource: Send + Sync {
    /// Detects every person in `frame`.
    async fn detect(&self, frame: &FrameImage) -> Result<Vec<DetectedPerson>, PoseError>;
}

/// Names HALPE-26 points, keeping those scoring at least `confidence_threshold`,
/// and adds the virtual `Neck` / `Hip` points.
#[must_use]
pub fn to_named_keypoints(points: &[[f64; 2]], scores: &[f64], confidence_threshold: f64) -> KeypointSet {
    let named: KeypointSet = HALPE_26_KEYPOINTS
        .iter()
        .zip(points.iter().zip(scores))
        .filter(|(_, (_, score))| **score >= confidence_threshold)
        .map(|(name, (&[x, y], _))| (*name, Point2::new(x, y)))
        .collect();
    add_virtual_keypoints(&named)
}

/// Keypoints of the first detected person and their mean confidence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseEstimate {
    pub keypoints: KeypointSet,
    pub confidence: f64,
}

/// Turns frames into named keypoints via an injected [`PoseSource`].
#[derive(Clone)]
pub struct PoseProcessor {
    source: Arc<dyn PoseSource>,
    confidence_threshold: f64,
    min_keypoints_ratio: f64,
}

impl fmt::Debug for PoseProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseProcessor")
            .field("confidence_threshold", &self.confidence_threshold)
            .field("min_keypoints_ratio", &self.min_keypoints_ratio)
            .finish_non_exhaustive()
    }
}

impl PoseProcessor {
    #[must_use]
    pub fn new(source: Arc<dyn PoseSource>, confidence_threshold: f64, min_keypoints_ratio: f64) -> Self {
        Self {
            source,
            confidence_threshold,
            min_keypoints_ratio,
        }
    }

    /// Detects the first person in `frame`.
    ///
    /// Detection errors and empty detections yield an empty estimate with zero
    /// confidence; see [`estimate_person`] for the gating.
    pub async fn process_frame(&self, frame: &FrameImage) -> PoseEstimate {
        let people = match self.source.detect(frame).await {
            Ok(people) => people,
            Err(err) => {
                warn!(error = %err, "pose detection failed");
                return PoseEstimate::default();
            }
        };
        let Some(person) = people.into_iter().next() else {
            return PoseEstimate::default();
        };
        self.estimate(&person)
    }

    /// Applies this processor's confidence gating to one detected person.
    #[must_use]
    pub fn estimate(&self, person: &DetectedPerson) -> PoseEstimate {
        estimate_person(person, self.confidence_threshold, self.min_keypoints_ratio)
    }
}

/// Confidence gating for one detected person.
///
/// When fewer than `min_keypoints_ratio` of the points reach
/// `confidence_threshold`, the keypoints are dropped and the passing ratio is
/// reported as confidence. Otherwise the confidence is the mean score of the
/// passing points.
#[must_use]
pub fn estimate_person(
    person: &DetectedPerson,
    confidence_threshold: f64,
    min_keypoints_ratio: f64,
) -> PoseEstimate {
    if person.scores.is_empty() {
        return PoseEstimate::default();
    }
    let passing: Vec<f64> = person
        .scores
        .iter()
        .copied()
        .filter(|score| *score >= confidence_threshold)
        .collect();
    let ratio = passing.len() as f64 / person.scores.len() as f64;
    if ratio < min_keypoints_ratio {
        debug!(ratio, "too few confident keypoints");
        return PoseEstimate {
            keypoints: KeypointSet::new(),
            confidence: ratio,
        };
    }
    let confidence = if passing.is_empty() {
        0.0
    } else {
        passing.iter().sum::<f64>() / passing.len() as f64
    };
    PoseEstimate {
        keypoints: to_named_keypoints(&person.points, &person.scores, confidence_threshold),
        confidence,
    }
}
