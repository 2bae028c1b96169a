//! # ROM Session
//!
//! Session-scoped range-of-motion analysis on top of [`rom_core`].
//!
//! - [`FrameAnalyzer`]: the per-frame pipeline (movement resolution, position
//!   validation, angle computation, tracking, classification, guidance).
//! - [`SessionManager`]: tracker cache with best-effort persistence to a
//!   [`KeyValueStore`]; [`InMemoryStore`] is the bundled backend.
//! - [`PoseSource`] / [`PoseProcessor`]: the injected pose model seam and
//!   HALPE-26 keypoint naming.
//! - [`FrameAnalysis`]: the serializable result of one frame.

#![forbid(unsafe_code)]

pub mod analyzer;
pub mod error;
pub mod pose;
pub mod result;
pub mod session;
pub mod storage;

pub use analyzer::{AnalysisRequest, FrameAnalyzer, NO_PERSON_MESSAGE};
pub use error::{AnalysisError, AnalysisResult};
pub use pose::{
    estimate_person, to_named_keypoints, DetectedPerson, FrameImage, PoseError, PoseEstimate,
    PoseProcessor, PoseSource,
};
pub use result::{FrameAnalysis, FrameMetrics, ValidationReport};
pub use session::{
    validate_session_id, SessionManager, SessionSummary, SharedTracker, TrackerKey,
    TrackerSummary,
};
pub use storage::{InMemoryStore, KeyValueStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
