//! The capture buffer.

use std::sync::Mutex;

use tracing::{debug, warn};

use shotlab_models::Frame;

/// Fixed-capacity frame ring indexed by a wrapping cursor.
///
/// Slots are allocated once; steady-state pushes overwrite the oldest
/// entry without reallocating.
#[derive(Debug)]
struct FrameRing {
    slots: Vec<Option<Frame>>,
    /// Index of the next write.
    head: usize,
    len: usize,
}

impl FrameRing {
    fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, frame: Frame) {
        self.slots[self.head] = Some(frame);
        self.head = (self.head + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
    }

    /// Frames in arrival order, oldest first. Clones handles, not pixels.
    fn snapshot(&self) -> Vec<Frame> {
        let cap = self.slots.len();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len)
            .filter_map(|i| self.slots[(start + i) % cap].clone())
            .collect()
    }
}

struct Inner {
    ring: FrameRing,
    /// Open recording: the pre-roll snapshot plus everything appended
    /// since `begin_recording`.
    recording: Option<Vec<Frame>>,
}

/// Rolling pre-roll ring plus an on-demand active recording.
///
/// `observe` is called by the producer for every frame; the single
/// internal mutex is held only for O(1) pushes and, once per shot, for
/// the ring snapshot, so the producer never waits on analysis work.
pub struct CaptureBuffer {
    inner: Mutex<Inner>,
}

impl CaptureBuffer {
    /// `capacity` is the pre-roll length in frames (buffer seconds x fps).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ring: FrameRing::new(capacity.max(1)),
                recording: None,
            }),
        }
    }

    /// Append a frame to the rolling pre-roll, evicting the oldest at
    /// capacity. Never blocks beyond the push itself.
    pub fn observe(&self, frame: Frame) {
        let mut inner = self.lock();
        inner.ring.push(frame);
    }

    /// Open an active recording seeded with a snapshot of the current
    /// ring. Returns false (and changes nothing) if a recording is
    /// already open.
    pub fn begin_recording(&self) -> bool {
        let mut inner = self.lock();
        if inner.recording.is_some() {
            warn!("begin_recording called while a recording is open, ignoring");
            return false;
        }
        let snapshot = inner.ring.snapshot();
        debug!(preroll_frames = snapshot.len(), "recording started");
        inner.recording = Some(snapshot);
        true
    }

    /// Append a frame to the open recording. Ignored when none is open.
    pub fn append_active(&self, frame: Frame) {
        let mut inner = self.lock();
        if let Some(recording) = inner.recording.as_mut() {
            recording.push(frame);
        }
    }

    /// Close the recording and return its frames (pre-roll snapshot plus
    /// appends, in order). Returns an empty Vec when no recording was
    /// open or nothing was ever captured; callers must check the length.
    pub fn end_recording(&self) -> Vec<Frame> {
        let mut inner = self.lock();
        let frames = inner.recording.take().unwrap_or_default();
        debug!(frames = frames.len(), "recording ended");
        frames
    }

    pub fn is_recording(&self) -> bool {
        self.lock().recording.is_some()
    }

    /// Current pre-roll occupancy, in frames.
    pub fn preroll_len(&self) -> usize {
        self.lock().ring.len
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Frame handles cannot poison meaningfully; recover the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
