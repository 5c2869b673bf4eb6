//! End-to-end session flow: synthetic pose stream in, persisted shot
//! records out.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use shotlab_detect::DetectorConfig;
use shotlab_models::{ArmLandmarks, Frame, LandmarkPoint, Outcome, PoseFrame};
use shotlab_pipeline::{
    FeedbackGenerator, OutcomeClassifier, OverlayRenderer, PipelineError, PipelineResult, Session,
    SessionConfig,
};

struct MadeClassifier;

#[async_trait]
impl OutcomeClassifier for MadeClassifier {
    async fn classify(&self, _clip: &Path) -> PipelineResult<Outcome> {
        Ok(Outcome::Made)
    }
}

struct OfflineClassifier;

#[async_trait]
impl OutcomeClassifier for OfflineClassifier {
    async fn classify(&self, _clip: &Path) -> PipelineResult<Outcome> {
        Err(PipelineError::classification_failed("offline"))
    }
}

struct CannedFeedback;

#[async_trait]
impl FeedbackGenerator for CannedFeedback {
    async fn generate(&self, _clip: &Path, _outcome: Outcome) -> PipelineResult<String> {
        Ok("hold the follow-through".to_string())
    }
}

struct CopyRenderer;

#[async_trait]
impl OverlayRenderer for CopyRenderer {
    async fn render(&self, source: &Path, _text: &str, dest: &Path) -> PipelineResult<()> {
        tokio::fs::copy(source, dest).await?;
        Ok(())
    }
}

const WIDTH: u32 = 4;
const HEIGHT: u32 = 4;

fn config(data_dir: &Path) -> SessionConfig {
    SessionConfig {
        data_dir: data_dir.to_path_buf(),
        frame_width: WIDTH,
        frame_height: HEIGHT,
        ..SessionConfig::default()
    }
}

fn pose(wrist_y: f64, shoulder_y: f64) -> PoseFrame {
    let arm = ArmLandmarks::new(
        LandmarkPoint::new(0.5, wrist_y, 0.9),
        LandmarkPoint::new(0.5, 0.62, 0.9),
        LandmarkPoint::new(0.5, shoulder_y, 0.9),
    );
    PoseFrame::new(Some(arm), None)
}

fn frame() -> Frame {
    Frame::from(vec![0u8; (WIDTH * HEIGHT * 3) as usize])
}

/// Hold, rise, descend, settle: one full shooting motion.
fn shot_trajectory() -> Vec<f64> {
    let mut ys = Vec::new();
    ys.extend(std::iter::repeat(0.60).take(30));
    ys.extend((1..=20).map(|i| 0.60 - 0.015 * i as f64));
    ys.extend((1..=25).map(|i| (0.30 + 0.03 * i as f64).min(0.90)));
    ys.extend(std::iter::repeat(0.60).take(150));
    ys
}

#[tokio::test]
async fn full_session_produces_persisted_shot() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, mut completions) = Session::start(
        &config(dir.path()),
        Arc::new(MadeClassifier),
        Arc::new(CannedFeedback),
        Arc::new(CopyRenderer),
    )
    .await
    .unwrap();

    for wrist_y in shot_trajectory() {
        session.process_frame(frame(), Some(&pose(wrist_y, 0.90)));
    }
    assert_eq!(session.shots_detected(), 1);

    let completion = tokio::time::timeout(Duration::from_secs(5), completions.recv())
        .await
        .expect("analysis timed out")
        .expect("completion channel closed");

    assert_eq!(completion.shot_number, 1);
    assert_eq!(completion.outcome, Outcome::Made);
    assert_eq!(completion.feedback, "hold the follow-through");
    let clip = completion.clip_path.expect("final clip path");
    assert!(clip.exists());
    assert!(clip
        .to_string_lossy()
        .ends_with("shot_001_made_with_feedback.clip"));

    // The clip contains pre-roll plus post-roll: more frames than the
    // post-roll alone, bounded by ring capacity + post-roll.
    let cfg = config(dir.path());
    let clip_bytes = tokio::fs::read(&clip).await.unwrap();
    let frames_in_clip = clip_bytes.len() / (WIDTH * HEIGHT * 3) as usize;
    assert!(frames_in_clip > cfg.post_roll_frames as usize);
    assert!(frames_in_clip <= cfg.ring_capacity() + cfg.post_roll_frames as usize + 1);

    assert_eq!(session.stats().total_shots, 1);
    assert_eq!(session.stats().shots_made, 1);

    let metadata = session.end(None).await.unwrap();
    assert_eq!(metadata.total_shots, 1);
    assert!(metadata.end_time.is_some());
    assert_eq!(metadata.shots[0].shot_number, 1);
}

#[tokio::test]
async fn classifier_outage_still_persists_shot() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, mut completions) = Session::start(
        &config(dir.path()),
        Arc::new(OfflineClassifier),
        Arc::new(CannedFeedback),
        Arc::new(CopyRenderer),
    )
    .await
    .unwrap();

    for wrist_y in shot_trajectory() {
        session.process_frame(frame(), Some(&pose(wrist_y, 0.90)));
    }

    let completion = tokio::time::timeout(Duration::from_secs(5), completions.recv())
        .await
        .expect("analysis timed out")
        .expect("completion channel closed");

    assert_eq!(completion.outcome, Outcome::Missed);
    assert!(completion.clip_path.is_some());
    assert_eq!(session.stats().shots_missed, 1);
}

#[tokio::test]
async fn wrist_below_shoulder_never_triggers() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _completions) = Session::start(
        &config(dir.path()),
        Arc::new(MadeClassifier),
        Arc::new(CannedFeedback),
        Arc::new(CopyRenderer),
    )
    .await
    .unwrap();

    // Same rising motion, but the shoulder stays above the wrist.
    for wrist_y in shot_trajectory() {
        session.process_frame(frame(), Some(&pose(wrist_y, 0.20)));
    }
    assert_eq!(session.shots_detected(), 0);
    assert_eq!(session.stats().total_shots, 0);
}

#[tokio::test]
async fn ending_session_waits_for_inflight_analyses() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _completions) = Session::start(
        &config(dir.path()),
        Arc::new(MadeClassifier),
        Arc::new(CannedFeedback),
        Arc::new(CopyRenderer),
    )
    .await
    .unwrap();

    for wrist_y in shot_trajectory() {
        session.process_frame(frame(), Some(&pose(wrist_y, 0.90)));
    }
    assert_eq!(session.shots_detected(), 1);

    // End immediately, without receiving the completion first. The shot
    // record must still be in the final document.
    let metadata = session.end(None).await.unwrap();
    assert_eq!(metadata.total_shots, 1);
    assert_eq!(metadata.shots_made, 1);
}

#[tokio::test]
async fn ending_mid_post_roll_flushes_open_capture() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, mut completions) = Session::start(
        &config(dir.path()),
        Arc::new(MadeClassifier),
        Arc::new(CannedFeedback),
        Arc::new(CopyRenderer),
    )
    .await
    .unwrap();

    // Stop right after release, long before the post-roll expires.
    let mut ys: Vec<f64> = Vec::new();
    ys.extend(std::iter::repeat(0.60).take(30));
    ys.extend((1..=20).map(|i| 0.60 - 0.015 * i as f64));
    ys.extend((1..=12).map(|i| 0.30 + 0.03 * i as f64));
    for wrist_y in ys {
        session.process_frame(frame(), Some(&pose(wrist_y, 0.90)));
    }
    assert_eq!(session.shots_detected(), 1);

    // The capture is still open; ending the session must submit it with
    // the frames gathered so far instead of dropping the shot.
    let metadata = session.end(None).await.unwrap();
    assert_eq!(metadata.total_shots, 1);

    let completion = completions.recv().await.expect("completion channel closed");
    assert_eq!(completion.shot_number, 1);
    assert!(completion.clip_path.is_some());
}

#[tokio::test]
async fn detector_thresholds_come_from_session_config() {
    let dir = tempfile::tempdir().unwrap();
    // Demand more joint confidence than the pose source provides.
    let strict = SessionConfig {
        detector: DetectorConfig {
            min_confidence: 0.95,
            ..DetectorConfig::default()
        },
        ..config(dir.path())
    };
    let (mut session, _completions) = Session::start(
        &strict,
        Arc::new(MadeClassifier),
        Arc::new(CannedFeedback),
        Arc::new(CopyRenderer),
    )
    .await
    .unwrap();

    for wrist_y in shot_trajectory() {
        session.process_frame(frame(), Some(&pose(wrist_y, 0.90)));
    }
    assert_eq!(session.shots_detected(), 0);
}

#[tokio::test]
async fn subject_loss_mid_episode_still_submits_capture() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, mut completions) = Session::start(
        &config(dir.path()),
        Arc::new(MadeClassifier),
        Arc::new(CannedFeedback),
        Arc::new(CopyRenderer),
    )
    .await
    .unwrap();

    // Rise far enough to arm, then the subject disappears entirely.
    let mut ys: Vec<f64> = Vec::new();
    ys.extend(std::iter::repeat(0.60).take(10));
    ys.extend((1..=20).map(|i| 0.60 - 0.015 * i as f64));
    for wrist_y in ys {
        session.process_frame(frame(), Some(&pose(wrist_y, 0.90)));
    }
    assert_eq!(session.shots_detected(), 1);

    for _ in 0..120 {
        session.process_frame(frame(), None);
    }

    // The episode reset through the grace window; the capture was closed
    // and submitted rather than dropped.
    let completion = tokio::time::timeout(Duration::from_secs(5), completions.recv())
        .await
        .expect("analysis timed out")
        .expect("completion channel closed");
    assert_eq!(completion.shot_number, 1);
    assert!(completion.clip_path.is_some());
}
