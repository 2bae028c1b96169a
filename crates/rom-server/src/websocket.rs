//! WebSocket endpoint for streaming frame analysis.
//!
//! ## Protocol
//!
//! Clients connect to `/ws/:session_id` and send one JSON [`FramePayload`]
//! per text message. Each message is answered with the analysis result plus
//! `"status": "success"`, or `{"status": "error", "error": ...}`. The text
//! message `ping` is answered with `pong`. After 30 seconds without input
//! the server sends `{"type": "ping"}`.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::dto::{FramePayload, WsReply};
use crate::handlers::analyze_payload;
use crate::state::AppState;

/// Idle time before the server pings the client.
pub const IDLE_PING_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket upgrade handler.
#[tracing::instrument(skip(state, ws))]
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

async fn handle_socket(socket: WebSocket, session_id: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    info!(%session_id, "websocket connected");
    let mut frames = 0u64;

    loop {
        let message = match tokio::time::timeout(IDLE_PING_INTERVAL, receiver.next()).await {
            Err(_) => {
                debug!(%session_id, "websocket idle, sending ping");
                if send_reply(&mut sender, &WsReply::ping()).await.is_err() {
                    break;
                }
                continue;
            }
            Ok(None) => break,
            Ok(Some(Err(err))) => {
                warn!(%session_id, error = %err, "websocket receive failed");
                break;
            }
            Ok(Some(Ok(message))) => message,
        };

        let reply = match message {
            Message::Text(text) if text.trim() == "ping" => {
                if sender.send(Message::Text("pong".to_string())).await.is_err() {
                    break;
                }
                continue;
            }
            Message::Text(text) => handle_text(&state, &session_id, &text).await,
            Message::Close(_) => break,
            _ => continue,
        };
        frames += 1;
        if send_reply(&mut sender, &reply).await.is_err() {
            break;
        }
    }

    info!(%session_id, frames, "websocket disconnected");
}

/// Analyzes one text message.
pub(crate) async fn handle_text(state: &AppState, session_id: &str, text: &str) -> WsReply {
    let payload: FramePayload = match serde_json::from_str(text) {
        Ok(payload) => payload,
        Err(err) => return WsReply::error(format!("Invalid frame message: {err}")),
    };
    match analyze_payload(state, session_id, &payload).await {
        Ok(analysis) => WsReply::success(analysis),
        Err(err) => WsReply::error(format!("Analysis failed: {err}")),
    }
}

async fn send_reply<S>(sender: &mut S, reply: &WsReply) -> Result<(), ()>
where
    S: futures_util::Sink<Message> + Unpin,
{
    let json = serde_json::to_string(reply).map_err(|err| {
        warn!(error = %err, "failed to encode websocket reply");
    })?;
    sender.send(Message::Text(json)).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_text_success() {
        let state = AppState::default();
        let reply = handle_text(
            &state,
            "s1",
            r#"{"body_part": "lower_back", "movement_type": "flexion", "keypoints": {}}"#,
        )
        .await;
        let json = serde_json::to_value(reply).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["pose_detected"], false);
        assert_eq!(json["message"], "No person detected in frame");
    }

    #[tokio::test]
    async fn test_handle_text_errors() {
        let state = AppState::default();
        let reply = handle_text(&state, "s1", "not json").await;
        assert!(matches!(reply, WsReply::Error { .. }));

        let reply = handle_text(
            &state,
            "s1",
            r#"{"body_part": "neck", "movement_type": "flexion", "keypoints": {}}"#,
        )
        .await;
        let json = serde_json::to_value(reply).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Analysis failed: Unsupported body part: neck")));
    }
}
