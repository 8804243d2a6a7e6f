//! Cue data structures

use std::fmt;
use std::ops::Deref;

/// A single timed text interval produced by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CueRecord {
    /// Start time in milliseconds (inclusive)
    pub start_ms: u64,
    /// End time in milliseconds (exclusive)
    pub end_ms: u64,
    /// Text payload, lines joined with `\n`
    pub text: String,
}

impl CueRecord {
    /// Creates a new cue record
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Checks if this cue is active at the given offset.
    ///
    /// The interval is half-open: active at `start_ms`, inactive at `end_ms`.
    pub fn is_active(&self, offset_ms: f64) -> bool {
        offset_ms >= self.start_ms as f64 && offset_ms < self.end_ms as f64
    }

    /// Returns the duration of this cue in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// A cue with `end_ms <= start_ms` can never be active
    pub fn is_degenerate(&self) -> bool {
        self.end_ms <= self.start_ms
    }
}

impl fmt::Display for CueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {} {:?}",
            format_timestamp(self.start_ms),
            format_timestamp(self.end_ms),
            self.text
        )
    }
}

/// A cue together with its position in the start-sorted cue list.
///
/// The index is the identity used by the fired set and stays valid until the
/// next load replaces the list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexedCue {
    pub index: usize,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub cue: CueRecord,
}

impl IndexedCue {
    pub fn new(index: usize, cue: CueRecord) -> Self {
        Self { index, cue }
    }
}

impl Deref for IndexedCue {
    type Target = CueRecord;

    fn deref(&self) -> &CueRecord {
        &self.cue
    }
}

/// One record emitted by the parser.
///
/// Only `Cue` nodes carry timing; the rest is format metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "data", rename_all = "lowercase"))]
pub enum Node {
    /// WebVTT header text following the `WEBVTT` signature
    Header(String),
    /// WebVTT `NOTE` block
    Note(String),
    /// WebVTT `STYLE` block
    Style(String),
    /// WebVTT `REGION` block
    Region(String),
    Cue(CueRecord),
}

impl Node {
    /// Returns the cue record if this node is a cue
    pub fn into_cue(self) -> Option<CueRecord> {
        match self {
            Node::Cue(cue) => Some(cue),
            _ => None,
        }
    }
}

/// Formats milliseconds as `HH:MM:SS.mmm`
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_interval() {
        let cue = CueRecord::new(1000, 2000, "Hi");
        assert!(!cue.is_active(999.9));
        assert!(cue.is_active(1000.0));
        assert!(cue.is_active(1999.5));
        assert!(!cue.is_active(2000.0));
    }

    #[test]
    fn test_degenerate_cue_never_active() {
        let cue = CueRecord::new(500, 500, "empty");
        assert!(cue.is_degenerate());
        assert!(!cue.is_active(500.0));
        assert_eq!(cue.duration_ms(), 0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "00:00:00.000");
        assert_eq!(format_timestamp(3_723_004), "01:02:03.004");
    }

    #[test]
    fn test_indexed_cue_derefs_to_record() {
        let cue = IndexedCue::new(3, CueRecord::new(0, 10, "x"));
        assert_eq!(cue.index, 3);
        assert_eq!(cue.text, "x");
        assert_eq!(cue.duration_ms(), 10);
    }

    #[test]
    fn test_node_into_cue() {
        assert!(Node::Note("n".into()).into_cue().is_none());
        let cue = CueRecord::new(0, 1, "a");
        assert_eq!(Node::Cue(cue.clone()).into_cue(), Some(cue));
    }
}
