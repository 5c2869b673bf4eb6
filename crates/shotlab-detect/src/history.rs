//! Fixed-capacity motion history for the tracked arm.

use shotlab_models::{ArmLandmarks, LandmarkPoint};

/// Fewest samples a velocity or trend computation will accept.
pub const MIN_TREND_SAMPLES: usize = 5;

/// One resolvable frame's worth of arm joints.
#[derive(Debug, Clone, Copy)]
pub struct MotionSample {
    pub wrist: LandmarkPoint,
    pub elbow: LandmarkPoint,
    pub shoulder: LandmarkPoint,
    /// Elbow-to-wrist distance, cached at insert time.
    pub extension: f64,
}

impl MotionSample {
    pub fn from_arm(arm: &ArmLandmarks) -> Self {
        Self {
            wrist: arm.wrist,
            elbow: arm.elbow,
            shoulder: arm.shoulder,
            extension: arm.forearm_extension(),
        }
    }
}

/// Time-ordered, fixed-capacity record of arm motion.
///
/// Backed by a circular arena indexed by a wrapping cursor, so steady
/// state pushes never allocate. The oldest sample is overwritten once the
/// window is full. Velocity is taken across the whole window (oldest to
/// newest) rather than frame-to-frame, which keeps single-frame jitter
/// out of the transition predicates.
#[derive(Debug)]
pub struct MotionHistory {
    slots: Box<[Option<MotionSample>]>,
    /// Index of the next write.
    head: usize,
    len: usize,
}

impl MotionHistory {
    /// Default window: ~0.67s at 30fps.
    pub const DEFAULT_CAPACITY: usize = 20;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_TREND_SAMPLES);
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, sample: MotionSample) {
        self.slots[self.head] = Some(sample);
        self.head = (self.head + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.head = 0;
        self.len = 0;
    }

    pub fn oldest(&self) -> Option<&MotionSample> {
        if self.len == 0 {
            return None;
        }
        let cap = self.slots.len();
        let idx = (self.head + cap - self.len) % cap;
        self.slots[idx].as_ref()
    }

    pub fn newest(&self) -> Option<&MotionSample> {
        if self.len == 0 {
            return None;
        }
        let cap = self.slots.len();
        let idx = (self.head + cap - 1) % cap;
        self.slots[idx].as_ref()
    }

    /// Windowed wrist velocity in normalized units per frame.
    ///
    /// Displacement from oldest to newest sample divided by the elapsed
    /// frame count. `None` until the window holds [`MIN_TREND_SAMPLES`].
    pub fn wrist_velocity(&self) -> Option<(f64, f64)> {
        if self.len < MIN_TREND_SAMPLES {
            return None;
        }
        let oldest = self.oldest()?;
        let newest = self.newest()?;
        let dt = (self.len - 1) as f64;
        Some((
            (newest.wrist.x - oldest.wrist.x) / dt,
            (newest.wrist.y - oldest.wrist.y) / dt,
        ))
    }

    /// Change in forearm extension across the window. Positive means the
    /// arm is straightening. `None` until the window holds
    /// [`MIN_TREND_SAMPLES`].
    pub fn extension_delta(&self) -> Option<f64> {
        if self.len < MIN_TREND_SAMPLES {
            return None;
        }
        let oldest = self.oldest()?;
        let newest = self.newest()?;
        Some(newest.extension - oldest.extension)
    }
}

impl Default for MotionHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
