//! Ranked-result memoization.

use std::collections::HashMap;

/// Ranked results keyed by the exact concatenated prompt.
///
/// Only valid while the candidate list is unchanged: callers must
/// [`clear`](Self::clear) it whenever candidates are (re)ingested or the
/// engine changes. When disabled, reads miss and writes are dropped.
#[derive(Debug, Clone, Default)]
pub struct MatchCache {
    enabled: bool,
    entries: HashMap<String, Vec<usize>>,
}

impl MatchCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, prompt: &str) -> Option<&[usize]> {
        if !self.enabled {
            return None;
        }
        self.entries.get(prompt).map(Vec::as_slice)
    }

    pub fn put(&mut self, prompt: impl Into<String>, ranked: &[usize]) {
        if !self.enabled {
            return;
        }
        self.entries.insert(prompt.into(), ranked.to_vec());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
