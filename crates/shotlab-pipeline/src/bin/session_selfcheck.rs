//! End-to-end selfcheck: drives a synthetic shot through the full
//! detector -> capture -> analysis pipeline with stub collaborators.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shotlab_models::{ArmLandmarks, Frame, LandmarkPoint, Outcome, PoseFrame};
use shotlab_pipeline::{
    FeedbackGenerator, OutcomeClassifier, OverlayRenderer, PipelineResult, Session, SessionConfig,
};

struct SelfcheckClassifier;

#[async_trait]
impl OutcomeClassifier for SelfcheckClassifier {
    async fn classify(&self, _clip: &Path) -> PipelineResult<Outcome> {
        Ok(Outcome::Made)
    }
}

struct SelfcheckFeedback;

#[async_trait]
impl FeedbackGenerator for SelfcheckFeedback {
    async fn generate(&self, _clip: &Path, outcome: Outcome) -> PipelineResult<String> {
        Ok(format!("selfcheck feedback ({outcome})"))
    }
}

struct SelfcheckRenderer;

#[async_trait]
impl OverlayRenderer for SelfcheckRenderer {
    async fn render(&self, source: &Path, _text: &str, dest: &Path) -> PipelineResult<()> {
        tokio::fs::copy(source, dest).await?;
        Ok(())
    }
}

fn pose(wrist_y: f64) -> PoseFrame {
    let arm = ArmLandmarks::new(
        LandmarkPoint::new(0.5, wrist_y, 0.9),
        LandmarkPoint::new(0.5, 0.62, 0.9),
        LandmarkPoint::new(0.5, 0.90, 0.9),
    );
    PoseFrame::new(Some(arm), None)
}

/// A synthetic shooting motion: hold, rise, descend, settle.
fn wrist_trajectory() -> Vec<f64> {
    let mut ys = Vec::new();
    ys.extend(std::iter::repeat(0.60).take(30));
    ys.extend((1..=20).map(|i| 0.60 - 0.015 * i as f64));
    ys.extend((1..=25).map(|i| (0.30 + 0.03 * i as f64).min(0.90)));
    ys.extend(std::iter::repeat(0.60).take(150));
    ys
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shotlab=info,session_selfcheck=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    let config = SessionConfig::from_env();
    println!(
        "session-selfcheck: starting with data_dir={}",
        config.data_dir.display()
    );
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let (mut session, mut completions) = Session::start(
        &config,
        Arc::new(SelfcheckClassifier),
        Arc::new(SelfcheckFeedback),
        Arc::new(SelfcheckRenderer),
    )
    .await?;

    let frame_len = config.frame_width as usize * config.frame_height as usize * 3;
    for wrist_y in wrist_trajectory() {
        let frame = Frame::from(vec![0u8; frame_len]);
        session.process_frame(frame, Some(&pose(wrist_y)));
    }

    anyhow::ensure!(
        session.shots_detected() == 1,
        "expected 1 detected shot, got {}",
        session.shots_detected()
    );

    let completion = tokio::time::timeout(Duration::from_secs(10), completions.recv())
        .await?
        .ok_or_else(|| anyhow::anyhow!("completion channel closed without a result"))?;
    info!(
        shot = completion.shot_number,
        outcome = %completion.outcome,
        "completion received"
    );
    anyhow::ensure!(completion.clip_path.is_some(), "final clip path missing");

    let stats = session.stats();
    let metadata = session.end(Some("selfcheck session".to_string())).await?;
    anyhow::ensure!(metadata.total_shots == 1, "metadata shot count mismatch");

    println!(
        "session-selfcheck: ok (shots={} made={} missed={})",
        stats.total_shots, stats.shots_made, stats.shots_missed
    );
    Ok(())
}
