//! HTTP handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use rom_session::{FrameAnalysis, SessionSummary};

use crate::dto::{
    AnalyzeRequest, FramePayload, HealthResponse, MovementsResponse, ReadyResponse,
    SessionClearedResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Runs one frame through the analyzer. Shared by HTTP and WebSocket.
pub(crate) async fn analyze_payload(
    state: &AppState,
    session_id: &str,
    payload: &FramePayload,
) -> ApiResult<FrameAnalysis> {
    let analyzer = state.analyzer();
    let request = payload.to_request(session_id);
    let analysis = match (&payload.keypoints, &payload.detection) {
        (Some(keypoints), _) => {
            let confidence = payload.confidence.unwrap_or(1.0);
            analyzer
                .analyze_keypoints(&request, keypoints, confidence)
                .await?
        }
        (None, Some(person)) => analyzer.analyze_detection(&request, person).await?,
        (None, None) => {
            return Err(ApiError::bad_request(
                "either keypoints or detection is required",
            ))
        }
    };
    Ok(analysis)
}

/// `POST /api/v1/analyze`
#[tracing::instrument(skip(state, request), fields(session_id = %request.session_id))]
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<FrameAnalysis>> {
    let analysis = analyze_payload(&state, &request.session_id, &request.frame).await?;
    Ok(Json(analysis))
}

/// `GET /api/v1/session/:session_id`
#[tracing::instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionSummary>> {
    let summary = state.analyzer().get_session(&session_id).await?;
    Ok(Json(summary))
}

/// `DELETE /api/v1/session/:session_id`
#[tracing::instrument(skip(state))]
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionClearedResponse>> {
    let removed = state.analyzer().clear_session(&session_id).await?;
    Ok(Json(SessionClearedResponse {
        message: "Session cleared".to_string(),
        session_id,
        removed,
    }))
}

/// `GET /api/v1/movements`
pub async fn list_movements(State(state): State<AppState>) -> Json<MovementsResponse> {
    let registry = state.analyzer().registry();
    Json(MovementsResponse {
        movements: registry.supported(),
        registered: registry.list(None),
    })
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: rom_session::VERSION.to_string(),
    })
}

/// `GET /health/ready`
pub async fn ready(State(state): State<AppState>) -> ApiResult<Json<ReadyResponse>> {
    let sessions = state
        .analyzer()
        .sessions()
        .active_sessions()
        .await
        .map_err(|err| ApiError::internal(err.to_string()))?;
    Ok(Json(ReadyResponse {
        status: "ready".to_string(),
        active_sessions: sessions.len(),
        timestamp: Utc::now(),
    }))
}
