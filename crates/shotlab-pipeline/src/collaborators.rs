//! Boundary traits for the external analysis collaborators.
//!
//! The pipeline only ever sees these seams; the real implementations
//! (generative video analysis, overlay rendering) live outside this core.

use std::path::Path;

use async_trait::async_trait;

use shotlab_models::Outcome;

use crate::error::PipelineResult;

/// Determines a shot's outcome from its persisted clip.
///
/// A failure here is non-fatal: the orchestrator falls back to
/// [`Outcome::Missed`] and logs the degradation.
#[async_trait]
pub trait OutcomeClassifier: Send + Sync {
    async fn classify(&self, clip: &Path) -> PipelineResult<Outcome>;
}

/// Produces coaching feedback text for a clip and its outcome.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, clip: &Path, outcome: Outcome) -> PipelineResult<String>;
}

/// Burns feedback text into a clip at a new path.
#[async_trait]
pub trait OverlayRenderer: Send + Sync {
    async fn render(&self, source: &Path, text: &str, dest: &Path) -> PipelineResult<()>;
}
