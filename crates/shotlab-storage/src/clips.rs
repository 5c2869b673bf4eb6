//! Clip file layout and raw-frame persistence.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use shotlab_models::{Frame, Outcome, SessionId};

use crate::error::{StorageError, StorageResult};

/// Bytes per pixel for raw captures (packed RGB).
const BYTES_PER_PIXEL: usize = 3;

/// Owns the on-disk clip layout for all sessions.
///
/// Paths are deterministic:
/// `{base}/session_{id}/shot_{number:03}_{outcome}[_with_feedback].clip`.
#[derive(Debug, Clone)]
pub struct ClipStore {
    base: PathBuf,
}

impl ClipStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn session_dir(&self, session: &SessionId) -> PathBuf {
        self.base.join(format!("session_{session}"))
    }

    /// Path for one shot's clip.
    ///
    /// `with_feedback` selects the overlay-rendered variant.
    pub fn shot_clip_path(
        &self,
        session: &SessionId,
        shot_number: u32,
        outcome: Outcome,
        with_feedback: bool,
    ) -> PathBuf {
        let suffix = if with_feedback { "_with_feedback" } else { "" };
        self.session_dir(session).join(format!(
            "shot_{:03}_{}{}.clip",
            shot_number,
            outcome.as_str(),
            suffix
        ))
    }

    /// Persist a capture as concatenated raw frames.
    ///
    /// Rejects empty captures and frames whose payload does not match the
    /// declared dimensions before anything touches the filesystem.
    pub async fn save_clip(
        &self,
        path: &Path,
        frames: &[Frame],
        width: u32,
        height: u32,
    ) -> StorageResult<()> {
        if frames.is_empty() {
            return Err(StorageError::EmptyCapture);
        }
        if width == 0 || height == 0 {
            return Err(StorageError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        for (index, frame) in frames.iter().enumerate() {
            if frame.len() != expected {
                return Err(StorageError::FramePayloadMismatch {
                    index,
                    expected,
                    actual: frame.len(),
                });
            }
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(path).await?;
        for frame in frames {
            file.write_all(frame.as_bytes()).await?;
        }
        file.flush().await?;

        info!(
            path = %path.display(),
            frames = frames.len(),
            width,
            height,
            "clip saved"
        );
        Ok(())
    }

    /// Move a clip to a new path, creating parent directories as needed.
    /// Used when the determined outcome differs from the provisional
    /// label a clip was first saved under.
    pub async fn relocate(&self, from: &Path, to: &Path) -> StorageResult<()> {
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(from, to).await?;
        debug!(from = %from.display(), to = %to.display(), "clip relocated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_frame(width: u32, height: u32, fill: u8) -> Frame {
        Frame::from(vec![fill; width as usize * height as usize * BYTES_PER_PIXEL])
    }

    #[test]
    fn test_clip_path_layout() {
        let store = ClipStore::new("/data/videos");
        let session = SessionId::new();

        let raw = store.shot_clip_path(&session, 7, Outcome::Missed, false);
        assert_eq!(
            raw,
            PathBuf::from(format!("/data/videos/session_{session}/shot_007_missed.clip"))
        );

        let overlaid = store.shot_clip_path(&session, 12, Outcome::Made, true);
        assert!(overlaid
            .to_string_lossy()
            .ends_with("shot_012_made_with_feedback.clip"));
    }

    #[tokio::test]
    async fn test_save_clip_writes_all_frames() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClipStore::new(dir.path());
        let session = SessionId::new();
        let path = store.shot_clip_path(&session, 1, Outcome::Missed, false);

        let frames = vec![rgb_frame(2, 2, 1), rgb_frame(2, 2, 2), rgb_frame(2, 2, 3)];
        store.save_clip(&path, &frames, 2, 2).await.unwrap();

        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written.len(), 3 * 2 * 2 * BYTES_PER_PIXEL);
        assert_eq!(&written[..12], &[1u8; 12]);
    }

    #[tokio::test]
    async fn test_empty_capture_rejected_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClipStore::new(dir.path());
        let session = SessionId::new();
        let path = store.shot_clip_path(&session, 1, Outcome::Missed, false);

        let err = store.save_clip(&path, &[], 2, 2).await.unwrap_err();
        assert!(matches!(err, StorageError::EmptyCapture));
        assert!(!path.exists());
        // The session directory must not have been created either.
        assert!(!store.session_dir(&session).exists());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClipStore::new(dir.path());
        let session = SessionId::new();
        let path = store.shot_clip_path(&session, 1, Outcome::Missed, false);

        let frames = vec![rgb_frame(2, 2, 0)];
        let err = store.save_clip(&path, &frames, 4, 4).await.unwrap_err();
        assert!(matches!(err, StorageError::FramePayloadMismatch { index: 0, .. }));

        let err = store.save_clip(&path, &frames, 0, 2).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidDimensions { .. }));
    }

    #[tokio::test]
    async fn test_relocate_moves_clip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClipStore::new(dir.path());
        let session = SessionId::new();

        let provisional = store.shot_clip_path(&session, 3, Outcome::Missed, false);
        let corrected = store.shot_clip_path(&session, 3, Outcome::Made, false);
        store
            .save_clip(&provisional, &[rgb_frame(2, 2, 9)], 2, 2)
            .await
            .unwrap();

        store.relocate(&provisional, &corrected).await.unwrap();
        assert!(!provisional.exists());
        assert!(corrected.exists());
    }
}
