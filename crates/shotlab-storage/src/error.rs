//! Storage error types.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("empty capture: no frames to persist")]
    EmptyCapture,

    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("frame {index} payload is {actual} bytes, expected {expected}")]
    FramePayloadMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("session metadata not found: {0}")]
    MetadataNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StorageError {
    /// Errors detected before any filesystem write.
    pub fn is_capture_rejection(&self) -> bool {
        matches!(
            self,
            StorageError::EmptyCapture
                | StorageError::InvalidDimensions { .. }
                | StorageError::FramePayloadMismatch { .. }
        )
    }
}
