//! Edge detection between successive offset evaluations

use cuefire_core::CueStore;
use std::collections::BTreeSet;

/// Cue indices that changed state during one evaluation, in index order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Previously active cues that are no longer active
    pub ended: Vec<usize>,
    /// Active cues that were not active before
    pub began: Vec<usize>,
}

impl Transition {
    pub fn is_empty(&self) -> bool {
        self.ended.is_empty() && self.began.is_empty()
    }
}

/// Tracks which cues have fired and diffs them against the active set
#[derive(Debug, Clone, Default)]
pub struct ActivationTracker {
    fired: BTreeSet<usize>,
}

impl ActivationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `offset_ms` against the store and returns the transitions.
    ///
    /// The fired set is only touched when something changed, and then it is
    /// replaced with the active set as a whole.
    pub fn apply(&mut self, offset_ms: f64, store: &CueStore) -> Transition {
        let active: BTreeSet<usize> = store.active_at(offset_ms).map(|c| c.index).collect();

        let transition = Transition {
            ended: self.fired.difference(&active).copied().collect(),
            began: active.difference(&self.fired).copied().collect(),
        };

        if !transition.is_empty() {
            self.fired = active;
        }
        transition
    }

    /// Forgets all fired cues without producing end transitions
    pub fn clear(&mut self) {
        self.fired.clear();
    }

    pub fn fired(&self) -> &BTreeSet<usize> {
        &self.fired
    }

    pub fn is_fired(&self, index: usize) -> bool {
        self.fired.contains(&index)
    }
}
