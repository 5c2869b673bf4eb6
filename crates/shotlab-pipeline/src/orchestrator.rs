//! The per-shot analysis orchestrator.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use shotlab_models::{Frame, Outcome, SessionId, ShotEvent, ShotRecord};
use shotlab_storage::{ClipStore, MetadataStore};

use crate::aggregate::SessionAggregate;
use crate::collaborators::{FeedbackGenerator, OutcomeClassifier, OverlayRenderer};
use crate::metrics;

/// Terminal result of one analysis task, delivered exactly once per
/// submission. `clip_path` is `None` when the task failed before a clip
/// could be kept (raw persistence or final metadata write failed).
#[derive(Debug, Clone)]
pub struct ShotCompletion {
    pub shot_number: u32,
    pub outcome: Outcome,
    pub feedback: String,
    pub clip_path: Option<PathBuf>,
}

/// Everything an analysis task needs, shared across tasks.
struct TaskContext {
    session: SessionId,
    clips: Arc<ClipStore>,
    metadata: Arc<MetadataStore>,
    aggregate: Arc<SessionAggregate>,
    classifier: Arc<dyn OutcomeClassifier>,
    feedback: Arc<dyn FeedbackGenerator>,
    renderer: Arc<dyn OverlayRenderer>,
}

/// Fans out one background pipeline per completed capture and fans their
/// results in on a single completion channel.
///
/// Stages run strictly in order within a task; tasks for different shots
/// run concurrently (bounded by a semaphore) and may complete out of
/// order. `submit` never blocks the caller.
pub struct AnalysisOrchestrator {
    ctx: Arc<TaskContext>,
    completions: mpsc::UnboundedSender<ShotCompletion>,
    task_semaphore: Arc<Semaphore>,
    /// Handles of spawned tasks, awaited by `drain`.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AnalysisOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: SessionId,
        clips: Arc<ClipStore>,
        metadata: Arc<MetadataStore>,
        aggregate: Arc<SessionAggregate>,
        classifier: Arc<dyn OutcomeClassifier>,
        feedback: Arc<dyn FeedbackGenerator>,
        renderer: Arc<dyn OverlayRenderer>,
        max_concurrent: usize,
    ) -> (Self, mpsc::UnboundedReceiver<ShotCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            ctx: Arc::new(TaskContext {
                session,
                clips,
                metadata,
                aggregate,
                classifier,
                feedback,
                renderer,
            }),
            completions: tx,
            task_semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tasks: Mutex::new(Vec::new()),
        };
        (orchestrator, rx)
    }

    /// Spawn the analysis pipeline for one captured shot.
    ///
    /// Fire-and-forget from the producer's perspective; the handle is
    /// retained so `drain` can wait out in-flight work at session end.
    pub fn submit(&self, event: ShotEvent, frames: Vec<Frame>) {
        let ctx = Arc::clone(&self.ctx);
        let completions = self.completions.clone();
        let semaphore = Arc::clone(&self.task_semaphore);

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    error!(shot = event.shot_number, "task semaphore closed, dropping analysis");
                    return;
                }
            };
            let completion = run_analysis(&ctx, &event, frames).await;
            if completions.send(completion).is_err() {
                warn!(shot = event.shot_number, "completion receiver dropped");
            }
        });
        self.lock_tasks().push(handle);
    }

    /// Wait for every submitted analysis task to finish.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.lock_tasks());
        if handles.is_empty() {
            return;
        }
        debug!(tasks = handles.len(), "draining analysis tasks");
        for result in join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "analysis task panicked");
            }
        }
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The five ordered stages for one shot. Infallible by construction:
/// every exit path produces a `ShotCompletion`.
async fn run_analysis(ctx: &TaskContext, event: &ShotEvent, frames: Vec<Frame>) -> ShotCompletion {
    let shot = event.shot_number;
    info!(
        session = %ctx.session,
        shot,
        arm = %event.arm,
        frames = frames.len(),
        "analysis started"
    );

    // Stage 1: persist the raw capture under a provisional missed label.
    // Nothing to analyze if this fails, so the task ends here.
    let provisional = ctx
        .clips
        .shot_clip_path(&ctx.session, shot, Outcome::Missed, false);
    if let Err(e) = ctx
        .clips
        .save_clip(&provisional, &frames, event.frame_width, event.frame_height)
        .await
    {
        error!(shot, error = %e, "raw capture persistence failed, aborting task");
        let stage = if e.is_capture_rejection() {
            "capture_validation"
        } else {
            "persist_raw"
        };
        metrics::record_analysis_failed(stage);
        return ShotCompletion {
            shot_number: shot,
            outcome: Outcome::Missed,
            feedback: format!("Analysis aborted: {e}"),
            clip_path: None,
        };
    }
    drop(frames);

    // Stage 2: determine the outcome. Classifier failure degrades to the
    // default missed label; the session continues.
    let mut clip_path = provisional;
    let outcome = match ctx.classifier.classify(&clip_path).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(shot, error = %e, "outcome classification failed, defaulting to missed");
            metrics::record_analysis_degraded("classification");
            Outcome::Missed
        }
    };
    if outcome != Outcome::Missed {
        let corrected = ctx.clips.shot_clip_path(&ctx.session, shot, outcome, false);
        match ctx.clips.relocate(&clip_path, &corrected).await {
            Ok(()) => clip_path = corrected,
            Err(e) => {
                warn!(shot, error = %e, "relocation failed, keeping provisional path");
                metrics::record_analysis_degraded("relocate");
            }
        }
    }

    // Stage 3: feedback text. An error becomes the feedback string so the
    // clip is never silently lost.
    let feedback = match ctx.feedback.generate(&clip_path, outcome).await {
        Ok(text) => text,
        Err(e) => {
            warn!(shot, error = %e, "feedback generation failed");
            metrics::record_analysis_degraded("feedback");
            format!("Feedback unavailable: {e}")
        }
    };

    // Stage 4: overlay render. On failure the un-overlaid clip is the
    // final artifact.
    let overlaid = ctx.clips.shot_clip_path(&ctx.session, shot, outcome, true);
    let final_path = match ctx.renderer.render(&clip_path, &feedback, &overlaid).await {
        Ok(()) => overlaid,
        Err(e) => {
            warn!(shot, error = %e, "overlay rendering failed, using raw clip");
            metrics::record_analysis_degraded("overlay");
            clip_path.clone()
        }
    };

    // Stage 5: persist the shot record and finish.
    let record = ShotRecord::new(shot, outcome, final_path.clone(), feedback.clone());
    if let Err(e) = ctx.aggregate.record_shot(record.clone()) {
        warn!(shot, error = %e, "aggregate rejected record");
    }
    if let Err(e) = ctx.metadata.append_shot(&ctx.session, record).await {
        error!(shot, error = %e, "shot metadata persistence failed");
        metrics::record_analysis_degraded("metadata");
        return ShotCompletion {
            shot_number: shot,
            outcome,
            feedback,
            clip_path: None,
        };
    }

    info!(session = %ctx.session, shot, outcome = %outcome, "analysis completed");
    metrics::record_analysis_completed(outcome);
    ShotCompletion {
        shot_number: shot,
        outcome,
        feedback,
        clip_path: Some(final_path),
    }
}
