//! Metrics helpers.
//!
//! Counter names and thin `record_*` wrappers; wiring an exporter is the
//! embedding application's concern.

use metrics::counter;

use shotlab_models::Outcome;

pub mod names {
    pub const SHOTS_DETECTED_TOTAL: &str = "shotlab_shots_detected_total";
    pub const ANALYSES_COMPLETED_TOTAL: &str = "shotlab_analyses_completed_total";
    pub const ANALYSES_DEGRADED_TOTAL: &str = "shotlab_analyses_degraded_total";
    pub const ANALYSES_FAILED_TOTAL: &str = "shotlab_analyses_failed_total";
}

/// Record a detected shot motion.
pub fn record_shot_detected() {
    counter!(names::SHOTS_DETECTED_TOTAL).increment(1);
}

/// Record a completed analysis task, labeled by outcome.
pub fn record_analysis_completed(outcome: Outcome) {
    counter!(names::ANALYSES_COMPLETED_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// Record a stage that fell back to its degraded path.
pub fn record_analysis_degraded(stage: &'static str) {
    counter!(names::ANALYSES_DEGRADED_TOTAL, "stage" => stage).increment(1);
}

/// Record a task that terminated before producing a clip.
pub fn record_analysis_failed(stage: &'static str) {
    counter!(names::ANALYSES_FAILED_TOTAL, "stage" => stage).increment(1);
}
