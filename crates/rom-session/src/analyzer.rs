//! Per-frame analysis.
//!
//! [`FrameAnalyzer`] resolves the movement for a request, validates the
//! subject's position, computes angles, updates the session tracker and
//! assembles a [`FrameAnalysis`]. Missing people and unusable positions
//! produce degraded results; only unsupported movements and malformed
//! session ids are errors.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rom_core::geometry::add_virtual_keypoints;
use rom_core::types::round_to;
use rom_core::{
    assess_range, movement_guidance, skeleton_connections, AnalysisConfig, AngleMap, Guidance,
    KeypointSet, MovementRegistry, RomSnapshot, Side,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AnalysisError, AnalysisResult};
use crate::pose::{estimate_person, DetectedPerson, FrameImage, PoseProcessor};
use crate::result::{FrameAnalysis, FrameMetrics, ValidationReport};
use crate::session::{validate_session_id, SessionManager, SessionSummary, TrackerKey};
use crate::storage::{InMemoryStore, KeyValueStore};

/// Message reported when no person is found.
pub const NO_PERSON_MESSAGE: &str = "No person detected in frame";

/// What to analyze and how to report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub session_id: String,
    pub body_part: String,
    pub movement_type: String,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub include_keypoints: bool,
    /// Caller-provided frame id; generated when absent
    #[serde(default)]
    pub frame_id: Option<String>,
}

impl AnalysisRequest {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        body_part: impl Into<String>,
        movement_type: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            body_part: body_part.into(),
            movement_type: movement_type.into(),
            side: Side::default(),
            include_keypoints: false,
            frame_id: None,
        }
    }

    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn with_keypoints(mut self, include: bool) -> Self {
        self.include_keypoints = include;
        self
    }

    #[must_use]
    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }
}

/// Orchestrates movement resolution, tracking and reporting.
#[derive(Debug)]
pub struct FrameAnalyzer {
    config: AnalysisConfig,
    registry: Arc<MovementRegistry>,
    sessions: Arc<SessionManager>,
    pose: Option<PoseProcessor>,
}

impl FrameAnalyzer {
    #[must_use]
    pub fn new(
        config: AnalysisConfig,
        registry: Arc<MovementRegistry>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            config,
            registry,
            sessions,
            pose: None,
        }
    }

    /// An analyzer with the default registry over the given store.
    #[must_use]
    pub fn with_store(config: AnalysisConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let sessions = SessionManager::new(store, config.smoothing_window, config.session_ttl());
        Self::new(
            config,
            Arc::new(MovementRegistry::with_defaults()),
            Arc::new(sessions),
        )
    }

    /// An analyzer with the default registry and a process-local store.
    #[must_use]
    pub fn in_memory(config: AnalysisConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    /// Attaches the pose processor used by [`analyze_frame`](Self::analyze_frame).
    #[must_use]
    pub fn with_pose_processor(mut self, pose: PoseProcessor) -> Self {
        self.pose = Some(pose);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &MovementRegistry {
        &self.registry
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Fails unless the pair is registered or present in the movement table.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::UnsupportedBodyPart`] or [`AnalysisError::UnsupportedMovement`].
    pub fn check_supported(&self, body_part: &str, movement_type: &str) -> AnalysisResult<()> {
        self.registry
            .resolve(body_part, movement_type, &self.config.movement_settings(Side::default()))
            .map(|_| ())
            .map_err(AnalysisError::from)
    }

    /// Runs pose detection on `frame`, then analyzes the result.
    ///
    /// Without a pose processor every frame is reported as having no person.
    ///
    /// # Errors
    ///
    /// See [`analyze_keypoints`](Self::analyze_keypoints).
    pub async fn analyze_frame(
        &self,
        request: &AnalysisRequest,
        frame: &FrameImage,
    ) -> AnalysisResult<FrameAnalysis> {
        let estimate = match &self.pose {
            Some(pose) => pose.process_frame(frame).await,
            None => {
                warn!("no pose processor configured");
                Default::default()
            }
        };
        self.analyze_keypoints(request, &estimate.keypoints, estimate.confidence)
            .await
    }

    /// Analyzes raw detector output for one person.
    ///
    /// # Errors
    ///
    /// See [`analyze_keypoints`](Self::analyze_keypoints).
    pub async fn analyze_detection(
        &self,
        request: &AnalysisRequest,
        person: &DetectedPerson,
    ) -> AnalysisResult<FrameAnalysis> {
        let estimate = estimate_person(
            person,
            self.config.confidence_threshold,
            self.config.min_keypoints_ratio,
        );
        self.analyze_keypoints(request, &estimate.keypoints, estimate.confidence)
            .await
    }

    /// Analyzes one frame's named keypoints.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidSessionId`] for a malformed session id and
    /// [`AnalysisError::UnsupportedBodyPart`] / [`AnalysisError::UnsupportedMovement`]
    /// for an unknown pair. Detection and position problems are reported in
    /// the result instead.
    #[tracing::instrument(
        skip(self, request, keypoints),
        fields(
            session_id = %request.session_id,
            body_part = %request.body_part,
            movement_type = %request.movement_type,
        )
    )]
    pub async fn analyze_keypoints(
        &self,
        request: &AnalysisRequest,
        keypoints: &KeypointSet,
        confidence: f64,
    ) -> AnalysisResult<FrameAnalysis> {
        let started = Instant::now();
        validate_session_id(&request.session_id).map_err(AnalysisError::invalid_session_id)?;

        let settings = self.config.movement_settings(request.side);
        let movement = self
            .registry
            .resolve(&request.body_part, &request.movement_type, &settings)?;

        let frame_id = request
            .frame_id
            .clone()
            .unwrap_or_else(|| generate_frame_id(&request.session_id));

        if keypoints.is_empty() {
            debug!("no pose in frame");
            return Ok(self.no_pose(request, frame_id));
        }
        let keypoints = add_virtual_keypoints(keypoints);

        let position = movement.validate_position(&keypoints);
        if !position.valid {
            debug!(message = %position.message, "position rejected");
            return Ok(self.invalid_position(request, frame_id, position.message, confidence));
        }

        let angles = movement.calculate_angles(&keypoints);
        let primary = movement.primary_angle();
        let primary_value = angles.get(primary).copied().unwrap_or(0.0);

        let key = TrackerKey::new(
            &request.session_id,
            &request.body_part,
            &request.movement_type,
        );
        let tracker = self.sessions.tracker(&key).await;
        let (rom, record) = {
            let mut tracker = tracker.lock();
            let rom = tracker.update(&angles, primary);
            (rom, tracker.to_record())
        };

        let normal_range = movement.normal_range();
        let max_range = movement.max_range();
        let assessment = assess_range(primary_value, normal_range, max_range);
        let guidance = movement_guidance(
            &request.body_part,
            &request.movement_type,
            primary_value,
            normal_range,
            assessment.message.clone(),
        );
        let validation = ValidationReport {
            in_normal_range: assessment.in_normal_range,
            in_max_range: assessment.in_max_range,
            message: assessment.message,
            normal_range,
            max_range,
            movement_phase: Some(movement.movement_phase(primary_value).to_string()),
        };

        let frame_metrics = FrameMetrics {
            keypoints_detected: keypoints.len(),
            angles_calculated: angles.len(),
            processing_time_ms: round_to(started.elapsed().as_secs_f64() * 1000.0, 2),
        };

        self.sessions.persist(&key, &record).await;
        debug!(
            primary = primary_value,
            min = rom.min,
            max = rom.max,
            "frame analyzed"
        );

        let (keypoints_out, connections) = if request.include_keypoints {
            (Some(keypoints), Some(skeleton_connections()))
        } else {
            (None, None)
        };

        Ok(FrameAnalysis {
            frame_id,
            timestamp: Utc::now(),
            session_id: request.session_id.clone(),
            body_part: request.body_part.clone(),
            movement_type: request.movement_type.clone(),
            pose_detected: true,
            angles: round_angles(&angles),
            rom,
            pose_confidence: round_to(confidence, 3),
            validation,
            guidance,
            frame_metrics,
            keypoints: keypoints_out,
            skeleton_connections: connections,
            message: None,
        })
    }

    /// Summary of a session's trackers.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidSessionId`], [`AnalysisError::SessionNotFound`]
    /// or a storage failure.
    pub async fn get_session(&self, session_id: &str) -> AnalysisResult<SessionSummary> {
        validate_session_id(session_id).map_err(AnalysisError::invalid_session_id)?;
        self.sessions
            .get_session(session_id)
            .await?
            .ok_or_else(|| AnalysisError::session_not_found(session_id))
    }

    /// Deletes a session's trackers. Returns the number of stored records removed.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidSessionId`] or a storage failure.
    pub async fn clear_session(&self, session_id: &str) -> AnalysisResult<usize> {
        validate_session_id(session_id).map_err(AnalysisError::invalid_session_id)?;
        Ok(self.sessions.clear_session(session_id).await?)
    }

    fn no_pose(&self, request: &AnalysisRequest, frame_id: String) -> FrameAnalysis {
        self.unmeasured(
            request,
            frame_id,
            false,
            0.0,
            ValidationReport::unmeasured("No pose detected"),
            Guidance::no_pose(),
            NO_PERSON_MESSAGE.to_string(),
        )
    }

    fn invalid_position(
        &self,
        request: &AnalysisRequest,
        frame_id: String,
        message: String,
        confidence: f64,
    ) -> FrameAnalysis {
        self.unmeasured(
            request,
            frame_id,
            true,
            round_to(confidence, 3),
            ValidationReport::unmeasured(message.clone()),
            Guidance::invalid_position(message.clone()),
            message,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn unmeasured(
        &self,
        request: &AnalysisRequest,
        frame_id: String,
        pose_detected: bool,
        pose_confidence: f64,
        validation: ValidationReport,
        guidance: Guidance,
        message: String,
    ) -> FrameAnalysis {
        FrameAnalysis {
            frame_id,
            timestamp: Utc::now(),
            session_id: request.session_id.clone(),
            body_part: request.body_part.clone(),
            movement_type: request.movement_type.clone(),
            pose_detected,
            angles: AngleMap::new(),
            rom: RomSnapshot::default(),
            pose_confidence,
            validation,
            guidance,
            frame_metrics: FrameMetrics::default(),
            keypoints: None,
            skeleton_connections: None,
            message: Some(message),
        }
    }
}

/// `"{session_id}_{8 hex chars}"` from a fresh UUID v4.
fn generate_frame_id(session_id: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{session_id}_{}", &hex[..8])
}

fn round_angles(angles: &AngleMap) -> AngleMap {
    angles
        .iter()
        .map(|(name, value)| (name.clone(), round_to(*value, 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_format() {
        let id = generate_frame_id("s1");
        assert!(id.starts_with("s1_"));
        assert_eq!(id.len(), 11);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_request_builder_defaults() {
        let request = AnalysisRequest::new("s1", "elbow", "flexion")
            .with_side(Side::Left)
            .with_keypoints(true);
        assert_eq!(request.side, Side::Left);
        assert!(request.include_keypoints);
        assert!(request.frame_id.is_none());

        let parsed: AnalysisRequest = serde_json::from_str(
            r#"{"session_id":"s1","body_part":"knee","movement_type":"flexion"}"#,
        )
        .unwrap();
        assert_eq!(parsed.side, Side::Right);
        assert!(!parsed.include_keypoints);
    }

    #[test]
    fn test_check_supported() {
        let analyzer = FrameAnalyzer::in_memory(AnalysisConfig::default());
        assert!(analyzer.check_supported("ankle", "plantarflexion").is_ok());
        assert!(matches!(
            analyzer.check_supported("neck", "flexion"),
            Err(AnalysisError::UnsupportedBodyPart { .. })
        ));
    }
}
