//! JSON session-metadata persistence.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use shotlab_models::{SessionId, SessionMetadata, ShotRecord};

use crate::error::{StorageError, StorageResult};

/// Stores one JSON document per session (`session_{id}.json`).
///
/// Documents are updated read-modify-write; `write_lock` serializes
/// those updates so concurrently completing analysis tasks cannot lose
/// each other's appends.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    base: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl MetadataStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn session_path(&self, session: &SessionId) -> PathBuf {
        self.base.join(format!("session_{session}.json"))
    }

    /// Create and persist a fresh session document.
    pub async fn create(&self, session: &SessionId) -> StorageResult<SessionMetadata> {
        let metadata = SessionMetadata::new(session.clone());
        self.save(&metadata).await?;
        info!(session = %session, "session metadata created");
        Ok(metadata)
    }

    pub async fn load(&self, session: &SessionId) -> StorageResult<SessionMetadata> {
        let path = self.session_path(session);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::MetadataNotFound(session.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn save(&self, metadata: &SessionMetadata) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.base).await?;
        let path = self.session_path(&metadata.session_id);
        let json = serde_json::to_vec_pretty(metadata)?;
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), "session metadata saved");
        Ok(())
    }

    /// Append a shot to the session document, recomputing the counters
    /// from the shot list. Creates the document if it does not exist.
    pub async fn append_shot(
        &self,
        session: &SessionId,
        record: ShotRecord,
    ) -> StorageResult<SessionMetadata> {
        let _guard = self.write_lock.lock().await;
        let mut metadata = match self.load(session).await {
            Ok(metadata) => metadata,
            Err(StorageError::MetadataNotFound(_)) => SessionMetadata::new(session.clone()),
            Err(e) => return Err(e),
        };
        metadata.push_shot(record);
        self.save(&metadata).await?;
        Ok(metadata)
    }

    /// Stamp the end time (and optional summary) on the session document.
    pub async fn finish_session(
        &self,
        session: &SessionId,
        summary: Option<String>,
    ) -> StorageResult<SessionMetadata> {
        let _guard = self.write_lock.lock().await;
        let mut metadata = self.load(session).await?;
        metadata.finish(summary);
        self.save(&metadata).await?;
        info!(
            session = %session,
            total = metadata.total_shots,
            made = metadata.shots_made,
            "session metadata finalized"
        );
        Ok(metadata)
    }
}
