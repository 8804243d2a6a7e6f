//! cuefire Player Library
//!
//! This library turns a playback offset into edge-triggered cue begin/end
//! notifications, for a host that ticks it once per frame.

pub mod clock;
pub mod scheduler;
pub mod tracker;

pub use clock::PlaybackClock;
pub use scheduler::{Callbacks, CueHandler, CueScheduler, NoopHandler};
pub use tracker::{ActivationTracker, Transition};

/// Result type for cuefire-player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cuefire-player operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cuefire core error: {0}")]
    Core(#[from] cuefire_core::Error),
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Set the loop point to the last cue end on every load
    pub auto_max_offset: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_max_offset: true,
        }
    }
}
