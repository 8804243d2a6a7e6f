//! Playback offset bookkeeping with looping

use cuefire_core::INVALID_OFFSET;

/// Advances the playback offset and decides when it needs re-evaluation
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Current offset in milliseconds; `None` until a cue list loads successfully
    offset: Option<f64>,
    paused: bool,
    /// Set after a reset so the first seek evaluates even at the same offset
    pending: bool,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            offset: Some(0.0),
            paused: false,
            pending: true,
        }
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewinds to offset 0 and resumes
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Makes the clock inert until the next reset
    pub fn invalidate(&mut self) {
        self.offset = None;
        self.paused = false;
        self.pending = false;
    }

    /// Computes the offset `dt_seconds` from now, wrapped at `max_offset_ms`.
    ///
    /// Returns `None` while paused or invalid. Nothing is committed; pass the
    /// result to [`PlaybackClock::seek`].
    pub fn advance(&self, dt_seconds: f64, max_offset_ms: i64) -> Option<f64> {
        let offset = self.offset?;
        if self.paused {
            return None;
        }
        Some(wrap_offset(offset + dt_seconds * 1000.0, max_offset_ms))
    }

    /// Moves to `new_offset`, returning whether the cues must be re-evaluated.
    ///
    /// Refused while invalid, for negative or non-finite offsets (which
    /// includes the invalid sentinel) and for the offset already evaluated.
    pub fn seek(&mut self, new_offset: f64) -> bool {
        let Some(current) = self.offset else {
            return false;
        };
        if !new_offset.is_finite() || new_offset < 0.0 {
            return false;
        }
        if new_offset == current && !self.pending {
            return false;
        }

        self.offset = Some(new_offset);
        self.pending = false;
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    /// Current offset, or `INVALID_OFFSET` while invalid
    pub fn offset_ms(&self) -> f64 {
        self.offset.unwrap_or(INVALID_OFFSET as f64)
    }
}

/// Wraps `candidate` into `(0, max_offset_ms]`.
///
/// Same result as subtracting `max_offset_ms` while the candidate exceeds it,
/// so an exact multiple lands on `max_offset_ms` rather than 0. A max of zero
/// or below disables wrapping.
pub fn wrap_offset(candidate: f64, max_offset_ms: i64) -> f64 {
    if max_offset_ms <= 0 || candidate <= max_offset_ms as f64 {
        return candidate;
    }
    let max = max_offset_ms as f64;
    let wrapped = candidate % max;
    if wrapped == 0.0 {
        max
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_offset() {
        assert_eq!(wrap_offset(1999.0, 2000), 1999.0);
        assert_eq!(wrap_offset(2000.0, 2000), 2000.0);
        assert_eq!(wrap_offset(2001.0, 2000), 1.0);
        assert_eq!(wrap_offset(4000.0, 2000), 2000.0);
        assert_eq!(wrap_offset(6500.0, 2000), 500.0);
    }

    #[test]
    fn test_wrap_disabled_for_non_positive_max() {
        assert_eq!(wrap_offset(5000.0, 0), 5000.0);
        assert_eq!(wrap_offset(5000.0, INVALID_OFFSET), 5000.0);
    }

    #[test]
    fn test_advance() {
        let clock = PlaybackClock::new();
        assert_eq!(clock.advance(0.5, 2000), Some(500.0));
        assert_eq!(clock.advance(2.5, 2000), Some(500.0));
    }

    #[test]
    fn test_advance_paused_or_invalid() {
        let mut clock = PlaybackClock::new();
        clock.pause();
        assert_eq!(clock.advance(1.0, 2000), None);

        clock.invalidate();
        assert!(!clock.is_paused());
        assert_eq!(clock.advance(1.0, 2000), None);
        assert_eq!(clock.offset_ms(), -1.0);
    }

    #[test]
    fn test_seek_guards() {
        let mut clock = PlaybackClock::new();
        // First evaluation after a reset happens even at offset 0
        assert!(clock.seek(0.0));
        assert!(!clock.seek(0.0));
        assert!(clock.seek(250.0));
        assert!(!clock.seek(INVALID_OFFSET as f64));
        assert!(!clock.seek(f64::NAN));
        assert_eq!(clock.offset(), Some(250.0));
    }

    #[test]
    fn test_seek_while_invalid() {
        let mut clock = PlaybackClock::new();
        clock.invalidate();
        assert!(!clock.seek(100.0));
        assert_eq!(clock.offset(), None);

        clock.reset();
        assert!(clock.seek(100.0));
    }

    #[test]
    fn test_seek_works_while_paused() {
        let mut clock = PlaybackClock::new();
        clock.pause();
        assert!(clock.seek(1000.0));
        assert_eq!(clock.offset_ms(), 1000.0);
    }
}
