//! Shot detection from per-frame pose landmarks.
//!
//! [`ShotDetector`] consumes one optional [`shotlab_models::PoseFrame`]
//! per video frame and emits start/release signals for shooting motions.
//! [`MotionHistory`] provides the fixed-capacity sliding window the
//! detector computes its velocity and arm-extension trends over.

pub mod detector;
pub mod history;

pub use detector::{DetectorConfig, DetectorSignal, DetectorState, ShotDetector};
pub use history::{MotionHistory, MotionSample};
