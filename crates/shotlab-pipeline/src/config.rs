//! Session configuration.

use std::path::PathBuf;

use shotlab_detect::DetectorConfig;

/// Configuration for one capture session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base directory for clips and session metadata.
    pub data_dir: PathBuf,
    /// Detection thresholds for the session's detector.
    pub detector: DetectorConfig,
    /// Pre-roll length in seconds.
    pub buffer_seconds: f64,
    /// Frame rate of the source.
    pub fps: u32,
    /// Frames captured after release before the recording closes.
    pub post_roll_frames: u32,
    /// Maximum analysis tasks in flight at once.
    pub max_concurrent_analyses: usize,
    /// Frame dimensions reported by the frame source.
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            detector: DetectorConfig::default(),
            buffer_seconds: 3.0,
            fps: 30,
            post_roll_frames: 90, // 3 seconds at 30fps
            max_concurrent_analyses: 2,
            frame_width: 640,
            frame_height: 480,
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("SHOTLAB_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            detector: defaults.detector,
            buffer_seconds: env_parse("SHOTLAB_BUFFER_SECONDS", defaults.buffer_seconds),
            fps: env_parse("SHOTLAB_FPS", defaults.fps),
            post_roll_frames: env_parse("SHOTLAB_POST_ROLL_FRAMES", defaults.post_roll_frames),
            max_concurrent_analyses: env_parse(
                "SHOTLAB_MAX_ANALYSES",
                defaults.max_concurrent_analyses,
            ),
            frame_width: env_parse("SHOTLAB_FRAME_WIDTH", defaults.frame_width),
            frame_height: env_parse("SHOTLAB_FRAME_HEIGHT", defaults.frame_height),
        }
    }

    /// Pre-roll ring capacity in frames.
    pub fn ring_capacity(&self) -> usize {
        ((self.buffer_seconds * self.fps as f64) as usize).max(1)
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.data_dir.join("videos")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
