//! cuefire Core Library
//!
//! This library provides the cue data structures, the SubRip/WebVTT text
//! parser and the start-sorted cue store that playback runs against.

pub mod cue;
pub mod parser;
pub mod store;

pub use cue::{format_timestamp, CueRecord, IndexedCue, Node};
pub use parser::parse;
pub use store::CueStore;

/// Sentinel offset reported while no valid cue list is loaded
pub const INVALID_OFFSET: i64 = -1;

/// Result type for cuefire-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cuefire-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid WebVTT header on line {line}")]
    InvalidHeader { line: usize },

    #[error("Missing cue timing on line {line}")]
    MissingTiming { line: usize },

    #[error("Invalid timestamp {value:?} on line {line}")]
    InvalidTimestamp { line: usize, value: String },

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the input text is not a subtitle document
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidHeader { .. } | Error::MissingTiming { .. } | Error::InvalidTimestamp { .. }
        )
    }
}
