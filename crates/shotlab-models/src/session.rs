//! Session identity, stats and metadata documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ShotRecord;

/// Unique training-session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Running shot counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_shots: u32,
    pub shots_made: u32,
    pub shots_missed: u32,
}

/// The persisted session document.
///
/// Counters are always recomputed from the shot list on append so the
/// document can never disagree with itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_shots: u32,
    pub shots_made: u32,
    pub shots_missed: u32,
    pub shots: Vec<ShotRecord>,
    pub summary: Option<String>,
}

impl SessionMetadata {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            start_time: Utc::now(),
            end_time: None,
            total_shots: 0,
            shots_made: 0,
            shots_missed: 0,
            shots: Vec::new(),
            summary: None,
        }
    }

    /// Append a shot and recompute the counters from the shot list.
    pub fn push_shot(&mut self, record: ShotRecord) {
        self.shots.push(record);
        self.total_shots = self.shots.len() as u32;
        self.shots_made = self.shots.iter().filter(|s| s.outcome.is_made()).count() as u32;
        self.shots_missed = self.total_shots - self.shots_made;
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total_shots: self.total_shots,
            shots_made: self.shots_made,
            shots_missed: self.shots_missed,
        }
    }

    /// Stamp the end time, optionally attaching a summary.
    pub fn finish(&mut self, summary: Option<String>) {
        self.end_time = Some(Utc::now());
        if summary.is_some() {
            self.summary = summary;
        }
    }
}
