//! Start-sorted cue storage

use crate::{parser, CueRecord, IndexedCue, Node, Result, INVALID_OFFSET};

/// Owns the indexed cue list and the maximum playback offset
#[derive(Debug, Clone, Default)]
pub struct CueStore {
    /// Cues sorted by start time; `cues[i].index == i`
    cues: Vec<IndexedCue>,
    /// Offset at which playback wraps, or `INVALID_OFFSET` after a failed load
    max_offset_ms: i64,
}

impl CueStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already parsed records
    pub fn from_records(records: Vec<CueRecord>) -> Self {
        let mut store = Self::new();
        store.replace(records.into_iter().map(Node::Cue).collect(), true);
        store
    }

    /// Parses `text` and replaces the cue list with its cues.
    ///
    /// On failure the store is emptied and the max offset invalidated. When
    /// `auto_max_offset` is false the current max offset is left alone.
    pub fn load(&mut self, text: &str, auto_max_offset: bool) -> Result<usize> {
        match parser::parse(text) {
            Ok(nodes) => Ok(self.replace(nodes, auto_max_offset)),
            Err(e) => {
                self.invalidate();
                Err(e)
            }
        }
    }

    fn replace(&mut self, nodes: Vec<Node>, auto_max_offset: bool) -> usize {
        let mut records: Vec<CueRecord> = nodes
            .into_iter()
            .filter_map(Node::into_cue)
            .filter(|cue| {
                if cue.is_degenerate() {
                    tracing::debug!(start_ms = cue.start_ms, end_ms = cue.end_ms, "dropping zero-length cue");
                    return false;
                }
                true
            })
            .collect();

        // Stable, so cues sharing a start keep their document order
        records.sort_by_key(|cue| cue.start_ms);

        self.cues = records
            .into_iter()
            .enumerate()
            .map(|(index, cue)| IndexedCue::new(index, cue))
            .collect();

        if auto_max_offset {
            self.max_offset_ms = self.cues.iter().map(|c| c.end_ms as i64).max().unwrap_or(0);
        }

        self.cues.len()
    }

    /// Empties the store and marks the max offset invalid
    pub fn invalidate(&mut self) {
        self.cues.clear();
        self.max_offset_ms = INVALID_OFFSET;
    }

    /// Overrides the wrap offset, e.g. with the real media duration
    pub fn set_max_length(&mut self, value: i64) {
        self.max_offset_ms = value;
    }

    pub fn max_offset_ms(&self) -> i64 {
        self.max_offset_ms
    }

    pub fn is_valid(&self) -> bool {
        self.max_offset_ms != INVALID_OFFSET
    }

    pub fn cues(&self) -> &[IndexedCue] {
        &self.cues
    }

    /// Gets a cue by index
    pub fn get(&self, index: usize) -> Option<&IndexedCue> {
        self.cues.get(index)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Gets all cues active at the given offset, in index order
    pub fn active_at(&self, offset_ms: f64) -> impl Iterator<Item = &IndexedCue> + '_ {
        // Cues starting after the offset cannot be active
        let candidates = self.cues.partition_point(|c| c.start_ms as f64 <= offset_ms);
        self.cues[..candidates]
            .iter()
            .filter(move |c| c.is_active(offset_ms))
    }

    /// Serializes the cue list as JSON
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.cues)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSORTED: &str = "3\n00:00:02,000 --> 00:00:03,000\nthird\n\n1\n00:00:00,000 --> 00:00:01,000\nfirst\n\n2\n00:00:00,000 --> 00:00:05,000\nsecond\n";

    #[test]
    fn test_load_sorts_and_indexes() {
        let mut store = CueStore::new();
        assert_eq!(store.load(UNSORTED, true).unwrap(), 3);

        let texts: Vec<&str> = store.cues().iter().map(|c| c.text.as_str()).collect();
        // "first" and "second" share a start and keep document order
        assert_eq!(texts, vec!["first", "second", "third"]);
        for (i, cue) in store.cues().iter().enumerate() {
            assert_eq!(cue.index, i);
        }
        assert!(store.cues().windows(2).all(|w| w[0].start_ms <= w[1].start_ms));
        assert_eq!(store.max_offset_ms(), 5000);
    }

    #[test]
    fn test_load_without_auto_max_offset_keeps_override() {
        let mut store = CueStore::new();
        store.set_max_length(60_000);
        store.load(UNSORTED, false).unwrap();
        assert_eq!(store.max_offset_ms(), 60_000);
    }

    #[test]
    fn test_load_empty_document() {
        let mut store = CueStore::new();
        assert_eq!(store.load("", true).unwrap(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_offset_ms(), 0);
        assert!(store.is_valid());
    }

    #[test]
    fn test_load_failure_invalidates() {
        let mut store = CueStore::new();
        store.load(UNSORTED, true).unwrap();
        assert!(store.load("garbage", true).is_err());
        assert!(store.is_empty());
        assert_eq!(store.max_offset_ms(), INVALID_OFFSET);
        assert!(!store.is_valid());
    }

    #[test]
    fn test_metadata_and_degenerate_cues_dropped() {
        let text = "WEBVTT\n\nNOTE skip me\n\n00:01.000 --> 00:01.000\nzero\n\n00:02.000 --> 00:01.000\nbackwards\n\n00:03.000 --> 00:04.000\nkept\n";
        let mut store = CueStore::new();
        assert_eq!(store.load(text, true).unwrap(), 1);
        assert_eq!(store.cues()[0].text, "kept");
        assert_eq!(store.cues()[0].index, 0);
        assert_eq!(store.max_offset_ms(), 4000);
    }

    #[test]
    fn test_active_at() {
        let store = CueStore::from_records(vec![
            CueRecord::new(0, 1000, "a"),
            CueRecord::new(500, 1500, "b"),
            CueRecord::new(1000, 2000, "c"),
        ]);
        let active = |o: f64| store.active_at(o).map(|c| c.index).collect::<Vec<_>>();
        assert_eq!(active(0.0), vec![0]);
        assert_eq!(active(750.0), vec![0, 1]);
        assert_eq!(active(1000.0), vec![1, 2]);
        assert_eq!(active(2000.0), Vec::<usize>::new());
        assert_eq!(active(-1.0), Vec::<usize>::new());
    }
}
