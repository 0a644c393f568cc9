use crate::session::SessionState;
use std::collections::BTreeSet;

/// Read-only view of a session for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<'a> {
    /// Candidate indices, best match first.
    pub ranked: &'a [usize],
    /// Position within `ranked`. Meaningless when `ranked` is empty.
    pub current: usize,
    /// Candidate indices, independent of ranking.
    pub marked: &'a BTreeSet<usize>,
    pub busy: bool,
    pub tokens: &'a [String],
    pub caret: usize,
    pub state: SessionState,
    pub generation: u64,
}

impl Snapshot<'_> {
    /// Candidate index under the cursor.
    pub fn current_index(&self) -> Option<usize> {
        self.ranked.get(self.current).copied()
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }
}
