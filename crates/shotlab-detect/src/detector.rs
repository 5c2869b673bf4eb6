//! The shot-detection state machine.

use tracing::{debug, info, warn};

use shotlab_models::{ArmLandmarks, ArmSide, PoseFrame};

use crate::history::{MotionHistory, MotionSample};

/// Detection thresholds, in normalized frame coordinates (y increases
/// downward).
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Minimum joint confidence for an arm to be resolvable.
    pub min_confidence: f64,
    /// Upward wrist speed (units/frame) required to arm. Compared against
    /// the magnitude of a rising (negative-dy) windowed velocity.
    pub upward_velocity_threshold: f64,
    /// Downward wrist speed (units/frame) that confirms release.
    pub downward_velocity_threshold: f64,
    /// Valid wrist band for arming, as fractions of frame height.
    pub min_wrist_height: f64,
    pub max_wrist_height: f64,
    /// Hard band exits while armed: wrist implausibly high or back down low.
    pub armed_exit_high: f64,
    pub armed_exit_low: f64,
    /// Required forearm-extension increase across the window.
    pub extension_threshold: f64,
    /// How far above the shoulder the wrist must sit (normalized).
    pub wrist_above_shoulder_margin: f64,
    /// History depth required before arming is evaluated.
    pub arming_history: usize,
    /// Frames spent in cooldown before returning to idle.
    pub cooldown_frames: u32,
    /// Consecutive unresolvable frames tolerated before a full reset.
    pub missing_grace_frames: u32,
    /// Motion-history window capacity.
    pub history_capacity: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            upward_velocity_threshold: 0.012,
            downward_velocity_threshold: 0.005,
            min_wrist_height: 0.25,
            max_wrist_height: 0.85,
            armed_exit_high: 0.10,
            armed_exit_low: 0.95,
            extension_threshold: 0.08,
            wrist_above_shoulder_margin: 0.05,
            arming_history: 7,
            cooldown_frames: 90,
            missing_grace_frames: 90,
            history_capacity: MotionHistory::DEFAULT_CAPACITY,
        }
    }
}

/// Detector lifecycle state. One episode is `Idle -> Armed -> Cooldown ->
/// Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    /// A shooting motion is in progress.
    Armed,
    /// Release signaled; waiting out the confirmation window.
    Cooldown,
}

/// Signals emitted to the caller on state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorSignal {
    /// Idle -> Armed: a shooting motion started on the given arm.
    ShotStarted(ArmSide),
    /// Armed -> Cooldown: the ball left the hand. Emitted at most once
    /// per episode.
    ShotReleased,
}

/// Detects shot attempts from noisy per-frame pose landmarks.
///
/// Arming requires, simultaneously: confident wrist/elbow/shoulder
/// joints, wrist inside the valid height band, windowed wrist velocity
/// rising faster than the strictness threshold, wrist meaningfully above
/// the shoulder (the bend-down false-positive guard), and the forearm
/// extending across the window. Release fires when the wrist velocity
/// reverses, the wrist exits the band, or the wrist drops back below the
/// shoulder.
#[derive(Debug)]
pub struct ShotDetector {
    config: DetectorConfig,
    state: DetectorState,
    history: MotionHistory,
    /// Arm side locked for the current episode. Set on the first
    /// resolvable sample, cleared only on reset, so one history window
    /// never mixes sides.
    tracked_arm: Option<ArmSide>,
    frames_without_landmarks: u32,
    cooldown_elapsed: u32,
    release_signaled: bool,
}

impl ShotDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let history = MotionHistory::new(config.history_capacity);
        Self {
            config,
            state: DetectorState::Idle,
            history,
            tracked_arm: None,
            frames_without_landmarks: 0,
            cooldown_elapsed: 0,
            release_signaled: false,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn tracked_arm(&self) -> Option<ArmSide> {
        self.tracked_arm
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Feed one frame's pose observation. `None` means no subject.
    pub fn observe(&mut self, pose: Option<&PoseFrame>) -> Option<DetectorSignal> {
        // Cooldown advances on every frame, resolvable or not.
        if self.state == DetectorState::Cooldown {
            self.cooldown_elapsed += 1;
            if self.cooldown_elapsed >= self.config.cooldown_frames {
                debug!("cooldown complete, detector idle");
                self.reset();
            }
        }

        let Some((side, arm)) = pose.and_then(|p| self.resolve_arm(p)) else {
            self.frames_without_landmarks += 1;
            if self.frames_without_landmarks > self.config.missing_grace_frames {
                warn!(
                    frames = self.frames_without_landmarks,
                    "landmarks missing past grace window, resetting detector"
                );
                self.reset();
            }
            return None;
        };

        self.frames_without_landmarks = 0;
        if self.tracked_arm.is_none() {
            self.tracked_arm = Some(side);
        }

        let sample = MotionSample::from_arm(&arm);
        self.history.push(sample);

        let wrist_y = sample.wrist.y;
        let above_shoulder =
            (sample.shoulder.y - sample.wrist.y) > self.config.wrist_above_shoulder_margin;

        match self.state {
            DetectorState::Idle => self.try_arm(side, wrist_y, above_shoulder),
            DetectorState::Armed => self.try_release(wrist_y, above_shoulder),
            DetectorState::Cooldown => None,
        }
    }

    /// Resolve the tracked arm, or pick one (right first) when no episode
    /// is in progress.
    fn resolve_arm(&self, pose: &PoseFrame) -> Option<(ArmSide, ArmLandmarks)> {
        match self.tracked_arm {
            Some(side) => pose
                .arm(side)
                .filter(|arm| arm.is_confident(self.config.min_confidence))
                .map(|arm| (side, *arm)),
            None => pose
                .resolve(self.config.min_confidence)
                .map(|(side, arm)| (side, *arm)),
        }
    }

    fn try_arm(
        &mut self,
        side: ArmSide,
        wrist_y: f64,
        above_shoulder: bool,
    ) -> Option<DetectorSignal> {
        if self.history.len() < self.config.arming_history {
            return None;
        }
        let (_, vy) = self.history.wrist_velocity()?;

        let rising = vy < -self.config.upward_velocity_threshold;
        let in_band = wrist_y > self.config.min_wrist_height && wrist_y < self.config.max_wrist_height;
        if !(rising && in_band && above_shoulder) {
            return None;
        }

        let extension_delta = self.history.extension_delta()?;
        if extension_delta <= self.config.extension_threshold {
            return None;
        }

        self.state = DetectorState::Armed;
        self.release_signaled = false;
        info!(
            arm = %side,
            velocity = vy,
            extension_delta,
            "shot motion detected"
        );
        Some(DetectorSignal::ShotStarted(side))
    }

    fn try_release(&mut self, wrist_y: f64, above_shoulder: bool) -> Option<DetectorSignal> {
        let (_, vy) = self.history.wrist_velocity()?;

        let descending = vy > self.config.downward_velocity_threshold;
        let out_of_band =
            wrist_y > self.config.armed_exit_low || wrist_y < self.config.armed_exit_high;
        if !(descending || out_of_band || !above_shoulder) {
            return None;
        }

        self.state = DetectorState::Cooldown;
        self.cooldown_elapsed = 0;
        if self.release_signaled {
            return None;
        }
        self.release_signaled = true;
        info!(velocity = vy, wrist_y, "shot release confirmed");
        Some(DetectorSignal::ShotReleased)
    }

    /// Full reset to idle, discarding history and the tracked side.
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.history.clear();
        self.tracked_arm = None;
        self.frames_without_landmarks = 0;
        self.cooldown_elapsed = 0;
        self.release_signaled = false;
    }
}

impl Default for ShotDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotlab_models::{ArmLandmarks, LandmarkPoint};

    fn pose(wrist_y: f64, elbow_y: f64, shoulder_y: f64, confidence: f64) -> PoseFrame {
        let arm = ArmLandmarks::new(
            LandmarkPoint::new(0.5, wrist_y, confidence),
            LandmarkPoint::new(0.5, elbow_y, confidence),
            LandmarkPoint::new(0.5, shoulder_y, confidence),
        );
        PoseFrame::new(Some(arm), None)
    }

    /// Wrist rising 0.02/frame with the forearm extending, well above
    /// shoulder. Arms the detector within `frames` observations.
    fn feed_arming_sequence(detector: &mut ShotDetector, frames: usize) -> Vec<DetectorSignal> {
        let mut signals = Vec::new();
        for i in 0..frames {
            let wrist_y = 0.60 - 0.02 * i as f64;
            // Elbow fixed below the wrist: extension grows as the wrist rises.
            let p = pose(wrist_y, 0.62, 0.90, 0.9);
            if let Some(signal) = detector.observe(Some(&p)) {
                signals.push(signal);
            }
        }
        signals
    }

    #[test]
    fn test_low_confidence_never_arms() {
        let mut detector = ShotDetector::default();
        for i in 0..60 {
            let p = pose(0.60 - 0.02 * (i % 10) as f64, 0.62, 0.90, 0.3);
            assert_eq!(detector.observe(Some(&p)), None);
        }
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn test_arming_emits_shot_started_once() {
        let mut detector = ShotDetector::default();
        let signals = feed_arming_sequence(&mut detector, 10);
        assert_eq!(signals, vec![DetectorSignal::ShotStarted(ArmSide::Right)]);
        assert_eq!(detector.state(), DetectorState::Armed);
    }

    #[test]
    fn test_insufficient_history_blocks_arming() {
        let mut detector = ShotDetector::default();
        let signals = feed_arming_sequence(&mut detector, 6);
        assert!(signals.is_empty());
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn test_wrist_below_shoulder_blocks_arming() {
        let mut detector = ShotDetector::default();
        for i in 0..15 {
            let wrist_y = 0.60 - 0.02 * i as f64;
            // Shoulder above the wrist the whole way up.
            let p = pose(wrist_y, 0.62, 0.20, 0.9);
            assert_eq!(detector.observe(Some(&p)), None);
        }
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn test_release_emitted_exactly_once() {
        let mut detector = ShotDetector::default();
        feed_arming_sequence(&mut detector, 10);
        assert_eq!(detector.state(), DetectorState::Armed);

        // Wrist comes back down; velocity reverses after a few frames.
        let mut releases = 0;
        for j in 0..40 {
            let wrist_y = 0.42 + 0.03 * j as f64;
            let p = pose(wrist_y.min(0.90), 0.62, 0.95, 0.9);
            if detector.observe(Some(&p)) == Some(DetectorSignal::ShotReleased) {
                releases += 1;
            }
        }
        assert_eq!(releases, 1);
    }

    #[test]
    fn test_cooldown_returns_to_idle_and_rearms() {
        let mut detector = ShotDetector::default();
        feed_arming_sequence(&mut detector, 10);
        for j in 0..40 {
            let wrist_y = (0.42 + 0.03 * j as f64).min(0.90);
            detector.observe(Some(&pose(wrist_y, 0.62, 0.95, 0.9)));
        }
        assert_eq!(detector.state(), DetectorState::Cooldown);

        // Hold still until the cooldown window expires.
        for _ in 0..120 {
            if detector.state() == DetectorState::Idle {
                break;
            }
            detector.observe(Some(&pose(0.60, 0.62, 0.90, 0.9)));
        }
        assert_eq!(detector.state(), DetectorState::Idle);

        // A fresh episode can start.
        let signals = feed_arming_sequence(&mut detector, 10);
        assert_eq!(signals, vec![DetectorSignal::ShotStarted(ArmSide::Right)]);
    }

    #[test]
    fn test_missing_landmarks_reset_after_grace() {
        let mut detector = ShotDetector::default();
        feed_arming_sequence(&mut detector, 10);
        assert_eq!(detector.state(), DetectorState::Armed);

        // Short gaps do not reset.
        for _ in 0..30 {
            detector.observe(None);
        }
        assert_eq!(detector.state(), DetectorState::Armed);

        for _ in 0..70 {
            detector.observe(None);
        }
        assert_eq!(detector.state(), DetectorState::Idle);
        assert_eq!(detector.history_len(), 0);
        assert_eq!(detector.tracked_arm(), None);
    }

    #[test]
    fn test_side_locked_for_episode() {
        let mut detector = ShotDetector::default();
        let right = pose(0.60, 0.62, 0.90, 0.9);
        detector.observe(Some(&right));
        assert_eq!(detector.tracked_arm(), Some(ArmSide::Right));

        // A frame where only the left arm is confident does not switch
        // sides; it counts against the grace window instead.
        let left_only = PoseFrame::new(
            None,
            Some(ArmLandmarks::new(
                LandmarkPoint::new(0.5, 0.5, 0.9),
                LandmarkPoint::new(0.5, 0.6, 0.9),
                LandmarkPoint::new(0.5, 0.7, 0.9),
            )),
        );
        detector.observe(Some(&left_only));
        assert_eq!(detector.tracked_arm(), Some(ArmSide::Right));
        assert_eq!(detector.history_len(), 1);
    }
}
