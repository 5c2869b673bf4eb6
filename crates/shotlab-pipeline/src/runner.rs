//! Live-loop glue: detector + capture buffer + orchestrator.

use tracing::{info, warn};

use shotlab_capture::CaptureBuffer;
use shotlab_detect::{DetectorSignal, DetectorState, ShotDetector};
use shotlab_models::{Frame, PoseFrame, ShotEvent};

use crate::config::SessionConfig;
use crate::metrics;
use crate::orchestrator::AnalysisOrchestrator;

/// Drives the detector and capture buffer from the live frame stream and
/// hands completed captures to the orchestrator.
///
/// Single cooperative producer: `process_frame` does no I/O and never
/// waits on analysis work. At most one capture is in flight; a new
/// episode cannot begin until the detector resolves the current one.
pub struct SessionRunner {
    detector: ShotDetector,
    capture: CaptureBuffer,
    orchestrator: AnalysisOrchestrator,
    post_roll_frames: u32,
    /// Countdown from release to recording close, when running.
    post_roll_remaining: Option<u32>,
    active_event: Option<ShotEvent>,
    next_shot: u32,
    frame_width: u32,
    frame_height: u32,
}

impl SessionRunner {
    pub fn new(config: &SessionConfig, orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            detector: ShotDetector::new(config.detector.clone()),
            capture: CaptureBuffer::new(config.ring_capacity()),
            orchestrator,
            post_roll_frames: config.post_roll_frames,
            post_roll_remaining: None,
            active_event: None,
            next_shot: 1,
            frame_width: config.frame_width,
            frame_height: config.frame_height,
        }
    }

    /// Feed one frame and its pose observation through the pipeline.
    pub fn process_frame(&mut self, frame: Frame, pose: Option<&PoseFrame>) {
        // The pre-roll ring sees every frame; an open recording extends
        // with every frame after its snapshot.
        self.capture.observe(frame.clone());
        if self.capture.is_recording() {
            self.capture.append_active(frame);
        }

        match self.detector.observe(pose) {
            Some(DetectorSignal::ShotStarted(arm)) => {
                if self.active_event.is_none() && self.capture.begin_recording() {
                    let event =
                        ShotEvent::new(self.next_shot, arm, self.frame_width, self.frame_height);
                    self.next_shot += 1;
                    metrics::record_shot_detected();
                    info!(shot = event.shot_number, arm = %arm, "shot detected, recording");
                    self.active_event = Some(event);
                }
            }
            Some(DetectorSignal::ShotReleased) => {
                if self.active_event.is_some() && self.post_roll_remaining.is_none() {
                    info!(frames = self.post_roll_frames, "release confirmed, capturing post-roll");
                    self.post_roll_remaining = Some(self.post_roll_frames);
                }
            }
            None => {
                // An episode that dies without a release (landmark-loss
                // reset) still closes its capture.
                if self.active_event.is_some()
                    && self.post_roll_remaining.is_none()
                    && self.detector.state() == DetectorState::Idle
                {
                    warn!("episode reset without release, closing capture");
                    self.finish_capture();
                }
            }
        }

        if let Some(remaining) = self.post_roll_remaining.as_mut() {
            if *remaining > 0 {
                *remaining -= 1;
            }
            if *remaining == 0 {
                self.finish_capture();
            }
        }
    }

    /// Shots detected so far.
    pub fn shots_detected(&self) -> u32 {
        self.next_shot - 1
    }

    pub fn is_capturing(&self) -> bool {
        self.active_event.is_some()
    }

    /// Close an open capture and wait for analysis tasks to finish.
    ///
    /// A capture still inside its post-roll window is submitted with the
    /// frames gathered so far rather than dropped.
    pub async fn shutdown(&mut self) {
        if self.active_event.is_some() {
            info!("session ending with an open capture, submitting early");
            self.finish_capture();
        }
        self.orchestrator.drain().await;
    }

    fn finish_capture(&mut self) {
        self.post_roll_remaining = None;
        let frames = self.capture.end_recording();
        let Some(event) = self.active_event.take() else {
            return;
        };
        if frames.is_empty() {
            warn!(shot = event.shot_number, "empty capture discarded");
            return;
        }
        info!(
            shot = event.shot_number,
            frames = frames.len(),
            "capture complete, submitting for analysis"
        );
        self.orchestrator.submit(event, frames);
    }
}
