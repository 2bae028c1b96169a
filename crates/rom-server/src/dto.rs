//! Request and response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rom_core::{KeypointSet, Side};
use rom_session::{AnalysisRequest, DetectedPerson, FrameAnalysis};
use serde::{Deserialize, Serialize};

/// One frame to analyze, without the session id.
///
/// Exactly one input is used: named `keypoints` when present, otherwise the
/// raw `detection` of a single person.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FramePayload {
    pub body_part: String,
    pub movement_type: String,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub include_keypoints: bool,
    #[serde(default)]
    pub frame_id: Option<String>,
    #[serde(default)]
    pub keypoints: Option<KeypointSet>,
    /// Pose confidence reported with named `keypoints`; defaults to 1.0
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub detection: Option<DetectedPerson>,
}

impl FramePayload {
    /// Analysis parameters for `session_id`.
    pub fn to_request(&self, session_id: &str) -> AnalysisRequest {
        let mut request = AnalysisRequest::new(session_id, &self.body_part, &self.movement_type)
            .with_side(self.side.unwrap_or_default())
            .with_keypoints(self.include_keypoints);
        if let Some(frame_id) = &self.frame_id {
            request = request.with_frame_id(frame_id);
        }
        request
    }
}

/// `POST /api/v1/analyze` body.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub session_id: String,
    #[serde(flatten)]
    pub frame: FramePayload,
}

/// `DELETE /api/v1/session/:id` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClearedResponse {
    pub message: String,
    pub session_id: String,
    pub removed: usize,
}

/// `GET /api/v1/movements` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementsResponse {
    /// Every supported pair, body part → movement types
    pub movements: BTreeMap<String, Vec<String>>,
    /// Pairs with a bespoke definition
    pub registered: BTreeMap<String, Vec<String>>,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// `GET /health/ready` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub active_sessions: usize,
    pub timestamp: DateTime<Utc>,
}

/// Server → client WebSocket message.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WsReply {
    /// Analysis result with `"status": "success"`
    Success {
        status: &'static str,
        #[serde(flatten)]
        analysis: Box<FrameAnalysis>,
    },
    /// `{"status": "error", "error": ...}`
    Error { status: &'static str, error: String },
    /// Idle keep-alive, `{"type": "ping"}`
    Ping {
        #[serde(rename = "type")]
        kind: &'static str,
    },
}

impl WsReply {
    pub fn success(analysis: FrameAnalysis) -> Self {
        Self::Success {
            status: "success",
            analysis: Box::new(analysis),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            status: "error",
            error: error.into(),
        }
    }

    pub fn ping() -> Self {
        Self::Ping { kind: "ping" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_request_flattens_payload() {
        let request: AnalyzeRequest = serde_json::from_str(
            r#"{
                "session_id": "s1",
                "body_part": "elbow",
                "movement_type": "flexion",
                "side": "left",
                "keypoints": {"LShoulder": {"x": 1.0, "y": 2.0}}
            }"#,
        )
        .unwrap();
        assert_eq!(request.session_id, "s1");
        assert_eq!(request.frame.side, Some(Side::Left));
        assert_eq!(request.frame.keypoints.as_ref().map(KeypointSet::len), Some(1));
        assert!(request.frame.detection.is_none());

        let analysis = request.frame.to_request(&request.session_id);
        assert_eq!(analysis.side, Side::Left);
        assert!(analysis.frame_id.is_none());
    }

    #[test]
    fn test_ws_reply_shapes() {
        assert_eq!(
            serde_json::to_value(WsReply::ping()).unwrap(),
            serde_json::json!({"type": "ping"})
        );
        assert_eq!(
            serde_json::to_value(WsReply::error("boom")).unwrap(),
            serde_json::json!({"status": "error", "error": "boom"})
        );
    }
}
