//! Training-session lifecycle.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use shotlab_models::{Frame, PoseFrame, SessionId, SessionMetadata, SessionStats};
use shotlab_storage::{ClipStore, MetadataStore};

use crate::aggregate::SessionAggregate;
use crate::collaborators::{FeedbackGenerator, OutcomeClassifier, OverlayRenderer};
use crate::config::SessionConfig;
use crate::error::PipelineResult;
use crate::orchestrator::{AnalysisOrchestrator, ShotCompletion};
use crate::runner::SessionRunner;

/// One training session: identity, live-loop runner, aggregate and
/// persistence, assembled as an explicit context rather than process
/// globals, so multiple sessions can coexist.
pub struct Session {
    id: SessionId,
    runner: SessionRunner,
    aggregate: Arc<SessionAggregate>,
    metadata: Arc<MetadataStore>,
}

impl Session {
    /// Start a new session: fresh id, persisted metadata document, and a
    /// wired-up orchestrator. Returns the session and its completion
    /// channel.
    pub async fn start(
        config: &SessionConfig,
        classifier: Arc<dyn OutcomeClassifier>,
        feedback: Arc<dyn FeedbackGenerator>,
        renderer: Arc<dyn OverlayRenderer>,
    ) -> PipelineResult<(Self, mpsc::UnboundedReceiver<ShotCompletion>)> {
        let id = SessionId::new();
        let clips = Arc::new(ClipStore::new(config.clips_dir()));
        let metadata = Arc::new(MetadataStore::new(config.sessions_dir()));
        metadata.create(&id).await?;

        let aggregate = Arc::new(SessionAggregate::new());
        let (orchestrator, completions) = AnalysisOrchestrator::new(
            id.clone(),
            clips,
            Arc::clone(&metadata),
            Arc::clone(&aggregate),
            classifier,
            feedback,
            renderer,
            config.max_concurrent_analyses,
        );
        let runner = SessionRunner::new(config, orchestrator);

        info!(session = %id, "session started");
        Ok((
            Self {
                id,
                runner,
                aggregate,
                metadata,
            },
            completions,
        ))
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Feed one live frame through the detector and capture buffer.
    pub fn process_frame(&mut self, frame: Frame, pose: Option<&PoseFrame>) {
        self.runner.process_frame(frame, pose);
    }

    pub fn stats(&self) -> SessionStats {
        self.aggregate.stats()
    }

    pub fn shots_detected(&self) -> u32 {
        self.runner.shots_detected()
    }

    /// End the session: close any capture still open, wait for in-flight
    /// analyses to land their records, then freeze the aggregate and
    /// finalize the metadata document.
    pub async fn end(mut self, summary: Option<String>) -> PipelineResult<SessionMetadata> {
        self.runner.shutdown().await;
        self.aggregate.freeze();
        let metadata = self.metadata.finish_session(&self.id, summary).await?;
        info!(
            session = %self.id,
            total = metadata.total_shots,
            made = metadata.shots_made,
            "session ended"
        );
        Ok(metadata)
    }
}
