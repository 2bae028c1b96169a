//! # ROM Core
//!
//! Joint range-of-motion measurement from 2D body keypoints.
//!
//! This crate holds everything that does not touch I/O:
//!
//! - **Geometry**: [`points_to_angle`], the named angle definition table and
//!   virtual keypoints (`Neck`, `Hip`) in the [`geometry`] module.
//!
//! - **Movements**: the [`Movement`] contract, bespoke definitions for the
//!   lower back, elbow and shoulder, and the table-driven fallback for every
//!   other supported `(body_part, movement_type)` pair.
//!
//! - **Registry**: [`MovementRegistry`] maps a pair to its definition.
//!
//! - **Tracking**: [`RomTracker`] smooths the primary angle and keeps
//!   monotonic extrema.
//!
//! - **Presentation helpers**: range classification, canned guidance and
//!   skeleton topology.
//!
//! ## Example
//!
//! ```rust
//! use rom_core::prelude::*;
//!
//! let keypoints = KeypointSet::new()
//!     .with("Neck", (320.0, 100.0))
//!     .with("Hip", (320.0, 250.0))
//!     .with("LShoulder", (250.0, 100.0))
//!     .with("RShoulder", (390.0, 100.0))
//!     .with("LHip", (290.0, 250.0))
//!     .with("RHip", (350.0, 250.0));
//!
//! let registry = MovementRegistry::with_defaults();
//! let movement = registry.resolve("lower_back", "flexion", &MovementSettings::default())?;
//! assert!(movement.validate_position(&keypoints).valid);
//!
//! let angles = movement.calculate_angles(&keypoints);
//! let mut tracker = RomTracker::with_default_window("lower_back", "flexion");
//! let rom = tracker.update(&angles, movement.primary_angle());
//! assert_eq!(rom.current, 0.0);
//! # Ok::<(), rom_core::CoreError>(())
//! ```

#![forbid(unsafe_code)]

pub mod assessment;
pub mod config;
pub mod error;
pub mod geometry;
pub mod guidance;
pub mod movement;
pub mod registry;
pub mod skeleton;
pub mod tracker;
pub mod types;

pub use assessment::{assess_range, RangeAssessment};
pub use config::AnalysisConfig;
pub use error::{ConfigError, CoreError, CoreResult, StorageError};
pub use geometry::{add_virtual_keypoints, points_to_angle};
pub use guidance::{movement_guidance, Guidance};
pub use movement::{Movement, MovementSettings, PositionCheck, TableMovement};
pub use registry::MovementRegistry;
pub use skeleton::{skeleton_connections, SKELETON_CONNECTIONS};
pub use tracker::{RomSnapshot, RomTracker, TrackerRecord, TrackerState};
pub use types::{AngleMap, AngleRange, KeypointSet, Point2, Side, HALPE_26_KEYPOINTS};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
///
/// ```rust
/// use rom_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::movement::{Movement, MovementSettings, PositionCheck};
    pub use crate::registry::MovementRegistry;
    pub use crate::tracker::{RomSnapshot, RomTracker};
    pub use crate::types::{AngleMap, AngleRange, KeypointSet, Point2, Side};
}
