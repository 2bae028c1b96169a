//! Error types for the ROM analysis core.
//!
//! This module provides error handling using [`thiserror`] for automatic
//! `Display` and `Error` trait implementations.
//!
//! # Error Hierarchy
//!
//! - [`CoreError`]: Top-level error type for registry lookups, configuration
//!   and validation failures
//! - [`ConfigError`]: Configuration validation and file loading
//! - [`StorageError`]: Errors raised by tracker persistence backends
//!
//! Data-quality problems (missing keypoints, degenerate geometry) are never
//! errors: they surface as unavailable angles or as a failed
//! [`PositionCheck`](crate::movement::PositionCheck).
//!
//! # Example
//!
//! ```rust
//! use rom_core::error::CoreError;
//!
//! let err = CoreError::unknown_body_part("neck", vec!["elbow".into(), "knee".into()]);
//! assert!(err.to_string().starts_with("Unknown body part: neck"));
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Top-level error type for the ROM analysis core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Body part has neither a registered definition nor a table entry
    #[error("Unknown body part: {body_part}. Available: {available:?}")]
    UnknownBodyPart {
        /// The requested body part
        body_part: String,
        /// Body parts that are known
        available: Vec<String>,
    },

    /// Movement type is not known for an otherwise valid body part
    #[error("Unknown movement type for {body_part}: {movement_type}. Available: {available:?}")]
    UnknownMovement {
        /// The body part the movement was requested for
        body_part: String,
        /// The requested movement type
        movement_type: String,
        /// Movement types that are known for this body part
        available: Vec<String>,
    },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation error for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what validation failed
        message: String,
    },
}

impl CoreError {
    /// Creates a new unknown body part error.
    #[must_use]
    pub fn unknown_body_part(body_part: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownBodyPart {
            body_part: body_part.into(),
            available,
        }
    }

    /// Creates a new unknown movement error.
    #[must_use]
    pub fn unknown_movement(
        body_part: impl Into<String>,
        movement_type: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::UnknownMovement {
            body_part: body_part.into(),
            movement_type: movement_type.into(),
            available,
        }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` if the error was caused by the caller's request
    /// rather than by the deployment or a backend.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownBodyPart { .. } | Self::UnknownMovement { .. } | Self::Validation { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_recoverable(),
            Self::UnknownBodyPart { .. }
            | Self::UnknownMovement { .. }
            | Self::Config(_)
            | Self::Validation { .. } => false,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors produced when loading or validating an
/// [`AnalysisConfig`](crate::config::AnalysisConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field has an invalid value.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field
        field: &'static str,
        /// Why the value is invalid
        reason: String,
    },

    /// The configuration file could not be read or written.
    #[error("Failed to access config file {path:?}: {source}")]
    FileRead {
        /// Path that was accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates a new invalid value error.
    #[must_use]
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors from tracker persistence backends.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StorageError {
    /// Backend could not be reached or rejected the operation
    #[error("Storage backend error: {message}")]
    Backend {
        /// Description of the backend failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error
        message: String,
    },

    /// Record not found
    #[error("Record not found: {key}")]
    NotFound {
        /// Key that was looked up
        key: String,
    },
}

impl StorageError {
    /// Creates a new backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Backend { .. } => true,
            Self::Serialization { .. } | Self::NotFound { .. } => false,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
