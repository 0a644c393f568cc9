use std::borrow::Cow;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

/// A value that can be offered to the picker.
///
/// The stritem is the canonical string projection used for matching and
/// display. It is computed once, when the candidate is ingested.
pub trait Candidate {
    fn stritem(&self) -> Cow<'_, str>;
}

impl Candidate for String {
    fn stritem(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Candidate for &str {
    fn stritem(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Candidate for Box<str> {
    fn stritem(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Candidate for Arc<str> {
    fn stritem(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Candidate for PathBuf {
    fn stritem(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }
}

/// Precomputed stritems plus their lowercase variants.
///
/// Indexed by candidate index. Read-only while a match pass is in flight.
#[derive(Debug, Clone, Default)]
pub struct Stritems {
    original: Vec<String>,
    lowered: Vec<String>,
}

impl Stritems {
    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.original.get(index).map(String::as_str)
    }

    pub fn get_lowered(&self, index: usize) -> Option<&str> {
        self.lowered.get(index).map(String::as_str)
    }

    /// Returns the case-sensitive or lowercase projections.
    pub fn variant(&self, lowercase: bool) -> &[String] {
        if lowercase {
            &self.lowered
        } else {
            &self.original
        }
    }

    fn push(&mut self, stritem: String) {
        self.lowered.push(stritem.to_lowercase());
        self.original.push(stritem);
    }

    fn clear(&mut self) {
        self.original.clear();
        self.lowered.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for Stritems {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut stritems = Stritems::default();
        for s in iter {
            stritems.push(s.into());
        }
        stritems
    }
}

/// Candidate list of one picker session.
///
/// Candidates are never mutated after ingestion. The store only grows
/// (streamed batches) or is replaced wholesale (refine).
#[derive(Debug, Clone)]
pub struct ItemStore<T> {
    items: Vec<T>,
    stritems: Stritems,
}

impl<T> Default for ItemStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            stritems: Stritems::default(),
        }
    }
}

impl<T: Candidate> ItemStore<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut store = Self::default();
        store.extend(items);
        store
    }

    /// Appends a batch and returns the index range it occupies.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = T>) -> Range<usize> {
        let start = self.items.len();
        for item in batch {
            self.stritems.push(item.stritem().into_owned());
            self.items.push(item);
        }
        start..self.items.len()
    }

    /// Replaces every candidate. Indices handed out before are meaningless afterwards.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items.clear();
        self.stritems.clear();
        self.extend(items);
    }
}

impl<T> ItemStore<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn stritem(&self, index: usize) -> Option<&str> {
        self.stritems.get(index)
    }

    pub fn stritems(&self) -> &Stritems {
        &self.stritems
    }

    /// Every candidate index in ingestion order.
    pub fn indices(&self) -> Vec<usize> {
        (0..self.items.len()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }
}
