//! Pose landmark types produced by the external pose source.

use serde::{Deserialize, Serialize};

/// Which arm a landmark set (or a detected shot) belongs to.
///
/// The detector tries the right arm first since it is the most common
/// shooting arm, then falls back to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmSide {
    Right,
    Left,
}

impl ArmSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArmSide::Right => "right",
            ArmSide::Left => "left",
        }
    }
}

impl std::fmt::Display for ArmSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single joint observation in normalized frame coordinates.
///
/// `x` and `y` are fractions of the frame width/height in `[0, 1]`, with
/// `y` increasing downward. `confidence` is the pose model's visibility
/// score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Euclidean distance to another point, ignoring confidence.
    pub fn distance_to(&self, other: &LandmarkPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The three joints of one arm needed for shot detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmLandmarks {
    pub wrist: LandmarkPoint,
    pub elbow: LandmarkPoint,
    pub shoulder: LandmarkPoint,
}

impl ArmLandmarks {
    pub fn new(wrist: LandmarkPoint, elbow: LandmarkPoint, shoulder: LandmarkPoint) -> Self {
        Self {
            wrist,
            elbow,
            shoulder,
        }
    }

    /// True when all three joints clear the confidence threshold.
    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.wrist.confidence > min_confidence
            && self.elbow.confidence > min_confidence
            && self.shoulder.confidence > min_confidence
    }

    /// Forearm length (elbow to wrist) in normalized units.
    pub fn forearm_extension(&self) -> f64 {
        self.wrist.distance_to(&self.elbow)
    }
}

/// Per-frame pose observations for both arm candidates.
///
/// `None` for an arm means the pose source did not report those joints at
/// all; low-confidence joints are reported and filtered by the consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub right: Option<ArmLandmarks>,
    pub left: Option<ArmLandmarks>,
}

impl PoseFrame {
    pub fn new(right: Option<ArmLandmarks>, left: Option<ArmLandmarks>) -> Self {
        Self { right, left }
    }

    /// Landmarks for a specific side, if present.
    pub fn arm(&self, side: ArmSide) -> Option<&ArmLandmarks> {
        match side {
            ArmSide::Right => self.right.as_ref(),
            ArmSide::Left => self.left.as_ref(),
        }
    }

    /// Pick the shooting-arm candidate: right first, then left.
    ///
    /// Returns `None` when neither arm has all three joints above the
    /// confidence threshold.
    pub fn resolve(&self, min_confidence: f64) -> Option<(ArmSide, &ArmLandmarks)> {
        for side in [ArmSide::Right, ArmSide::Left] {
            if let Some(arm) = self.arm(side) {
                if arm.is_confident(min_confidence) {
                    return Some((side, arm));
                }
            }
        }
        None
    }
}
