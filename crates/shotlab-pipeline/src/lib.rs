//! Per-shot analysis orchestration.
//!
//! The live capture loop hands each completed capture to
//! [`AnalysisOrchestrator::submit`], which runs an independent, strictly
//! ordered pipeline per shot (persist raw -> determine outcome ->
//! generate feedback -> render overlay -> persist record) without ever
//! blocking the producer. [`SessionRunner`] is the glue that drives the
//! detector and capture buffer from the frame stream, and [`Session`]
//! owns one training session end to end.

pub mod aggregate;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod runner;
pub mod session;

pub use aggregate::SessionAggregate;
pub use collaborators::{FeedbackGenerator, OutcomeClassifier, OverlayRenderer};
pub use config::SessionConfig;
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{AnalysisOrchestrator, ShotCompletion};
pub use runner::SessionRunner;
pub use session::Session;
