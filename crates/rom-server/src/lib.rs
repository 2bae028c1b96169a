//! # ROM Server
//!
//! HTTP and WebSocket front end for joint range-of-motion analysis.
//!
//! ## Endpoints
//!
//! ### Analysis
//! - `POST /api/v1/analyze` - Analyze one frame of keypoints or a raw detection
//! - `GET /api/v1/movements` - List supported body part / movement pairs
//!
//! ### Sessions
//! - `GET /api/v1/session/:session_id` - ROM summary for every tracker in a session
//! - `DELETE /api/v1/session/:session_id` - Clear a session
//!
//! ### Health
//! - `GET /health` - Liveness and version
//! - `GET /health/ready` - Readiness and active session count
//!
//! ### WebSocket
//! - `WS /ws/:session_id` - Stream frames, receive one analysis per frame

#![forbid(unsafe_code)]

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;
pub mod websocket;

use axum::{routing::get, routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use dto::{AnalyzeRequest, FramePayload, WsReply};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create the API router with all endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use rom_server::{create_router, AppState};
///
/// #[tokio::main]
/// async fn main() {
///     let app = create_router(AppState::default());
///     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
///     axum::serve(listener, app).await.unwrap();
/// }
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Analysis
        .route("/api/v1/analyze", post(handlers::analyze))
        .route("/api/v1/movements", get(handlers::list_movements))
        // Sessions
        .route(
            "/api/v1/session/:session_id",
            get(handlers::get_session).delete(handlers::clear_session),
        )
        // Health
        .route("/health", get(handlers::health))
        .route("/health/ready", get(handlers::ready))
        // WebSocket
        .route("/ws/:session_id", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
