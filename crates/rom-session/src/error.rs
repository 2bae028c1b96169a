//! Error types for session tracking and frame analysis.

use rom_core::{CoreError, StorageError};
use thiserror::Error;

/// Result alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors surfaced by the analyzer and session manager.
///
/// Data-quality problems (no pose, bad geometry, invalid position) are never
/// errors; they produce degraded results instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    /// Body part known to neither the registry nor the movement table.
    #[error("Unsupported body part: {body_part}. Available: {available:?}")]
    UnsupportedBodyPart {
        /// Requested body part
        body_part: String,
        /// Supported body parts
        available: Vec<String>,
    },

    /// Movement type unknown for a supported body part.
    #[error("Unsupported movement for {body_part}: {movement_type}. Available: {available:?}")]
    UnsupportedMovement {
        /// Requested body part
        body_part: String,
        /// Requested movement type
        movement_type: String,
        /// Supported movement types for the body part
        available: Vec<String>,
    },

    /// Malformed session identifier.
    #[error("Invalid session id: {reason}")]
    InvalidSessionId {
        /// What is wrong with the id
        reason: String,
    },

    /// No tracker state exists for the session.
    #[error("Session not found: {session_id}")]
    SessionNotFound {
        /// Requested session id
        session_id: String,
    },

    /// Backing store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Any other core error.
    #[error(transparent)]
    Core(CoreError),
}

impl AnalysisError {
    /// Creates an invalid session id error.
    #[must_use]
    pub fn invalid_session_id(reason: impl Into<String>) -> Self {
        Self::InvalidSessionId {
            reason: reason.into(),
        }
    }

    /// Creates a session not found error.
    #[must_use]
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    /// Returns `true` if the error was caused by caller input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::UnsupportedBodyPart { .. }
            | Self::UnsupportedMovement { .. }
            | Self::InvalidSessionId { .. }
            | Self::SessionNotFound { .. } => true,
            Self::Core(err) => err.is_client_error(),
            Self::Storage(_) => false,
        }
    }
}

impl From<CoreError> for AnalysisError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownBodyPart {
                body_part,
                available,
            } => Self::UnsupportedBodyPart {
                body_part,
                available,
            },
            CoreError::UnknownMovement {
                body_part,
                movement_type,
                available,
            } => Self::UnsupportedMovement {
                body_part,
                movement_type,
                available,
            },
            CoreError::Storage(err) => Self::Storage(err),
            other => Self::Core(other),
        }
    }
}
