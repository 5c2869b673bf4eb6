//! Rolling pre-roll capture with on-demand active recording.
//!
//! [`CaptureBuffer`] keeps the most recent N frames in a fixed ring at
//! all times. When a shot is detected, `begin_recording` snapshots the
//! ring so the final clip includes the lead-up, and every frame appended
//! afterwards extends the clip until `end_recording` hands the whole
//! sequence to the analysis pipeline.

pub mod buffer;

pub use buffer::CaptureBuffer;
