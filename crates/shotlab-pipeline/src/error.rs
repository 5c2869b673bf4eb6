//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("outcome classification failed: {0}")]
    ClassificationFailed(String),

    #[error("feedback generation failed: {0}")]
    FeedbackFailed(String),

    #[error("overlay rendering failed: {0}")]
    RenderFailed(String),

    #[error("session is frozen, no further shots accepted")]
    SessionFrozen,

    #[error("storage error: {0}")]
    Storage(#[from] shotlab_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn classification_failed(msg: impl Into<String>) -> Self {
        Self::ClassificationFailed(msg.into())
    }

    pub fn feedback_failed(msg: impl Into<String>) -> Self {
        Self::FeedbackFailed(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }
}
