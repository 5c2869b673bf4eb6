//! Shared data models for the ShotLab capture core.
//!
//! This crate provides the value types passed between the detector,
//! capture buffer, analysis pipeline and storage layers:
//! - Pose landmarks and arm-side selection
//! - Raw frame handles
//! - Shot events, outcomes and per-shot records
//! - Session identity, stats and metadata documents

pub mod frame;
pub mod landmark;
pub mod session;
pub mod shot;

// Re-export common types
pub use frame::Frame;
pub use landmark::{ArmLandmarks, ArmSide, LandmarkPoint, PoseFrame};
pub use session::{SessionId, SessionMetadata, SessionStats};
pub use shot::{Outcome, ShotEvent, ShotRecord};
