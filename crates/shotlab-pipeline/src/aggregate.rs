//! In-memory session aggregate.

use std::sync::Mutex;

use shotlab_models::{SessionStats, ShotRecord};

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Default)]
struct AggregateInner {
    stats: SessionStats,
    records: Vec<ShotRecord>,
    frozen: bool,
}

/// Running counters and finalized shot records for one session.
///
/// Appended to by completing analysis tasks, read concurrently by
/// presentation layers; a single mutex covers both. Records land in
/// completion order; they carry the shot number, so consumers needing
/// event order can sort by it.
#[derive(Debug, Default)]
pub struct SessionAggregate {
    inner: Mutex<AggregateInner>,
}

impl SessionAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized shot. Fails without mutating once the session
    /// has been frozen.
    pub fn record_shot(&self, record: ShotRecord) -> PipelineResult<()> {
        let mut inner = self.lock();
        if inner.frozen {
            return Err(PipelineError::SessionFrozen);
        }
        inner.stats.total_shots += 1;
        if record.outcome.is_made() {
            inner.stats.shots_made += 1;
        } else {
            inner.stats.shots_missed += 1;
        }
        inner.records.push(record);
        Ok(())
    }

    pub fn stats(&self) -> SessionStats {
        self.lock().stats
    }

    pub fn records(&self) -> Vec<ShotRecord> {
        self.lock().records.clone()
    }

    /// Stop accepting appends. Called at session end.
    pub fn freeze(&self) {
        self.lock().frozen = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AggregateInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
