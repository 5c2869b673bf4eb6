//! Shot events, outcomes and per-shot records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ArmSide;

/// Result of one shot attempt, determined post-hoc from the captured clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Made,
    /// Default when the classifier fails or its answer is unclear.
    #[default]
    Missed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Made => "made",
            Outcome::Missed => "missed",
        }
    }

    pub fn is_made(&self) -> bool {
        matches!(self, Outcome::Made)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected shot attempt. Created when the detector arms; immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotEvent {
    /// Monotonic per-session shot number, starting at 1.
    pub shot_number: u32,
    /// Arm that triggered detection.
    pub arm: ArmSide,
    /// Frame width at capture time.
    pub frame_width: u32,
    /// Frame height at capture time.
    pub frame_height: u32,
}

impl ShotEvent {
    pub fn new(shot_number: u32, arm: ArmSide, frame_width: u32, frame_height: u32) -> Self {
        Self {
            shot_number,
            arm,
            frame_width,
            frame_height,
        }
    }
}

/// A finalized shot as persisted into the session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub shot_number: u32,
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
    pub clip_path: PathBuf,
    pub feedback: String,
}

impl ShotRecord {
    pub fn new(
        shot_number: u32,
        outcome: Outcome,
        clip_path: impl Into<PathBuf>,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            shot_number,
            timestamp: Utc::now(),
            outcome,
            clip_path: clip_path.into(),
            feedback: feedback.into(),
        }
    }
}
