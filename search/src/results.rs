//! Match locations within a single stritem.

use crate::query::SearchQuery;

/// Byte range of a match within a stritem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// Locates `query` in `haystack`, returning the span used for ranking.
///
/// Returns `None` when the haystack does not match. [`SearchQuery::All`]
/// matches with an empty span at offset 0.
pub fn locate(query: &SearchQuery, haystack: &str) -> Option<Span> {
    match query {
        SearchQuery::All => Some(Span { start: 0, end: 0 }),
        SearchQuery::Exact {
            literal,
            anchor_start,
            anchor_end,
        } => find_exact(haystack, literal, *anchor_start, *anchor_end),
        SearchQuery::Fuzzy(tokens) => narrowest(haystack, tokens),
    }
}

fn find_exact(haystack: &str, literal: &str, anchor_start: bool, anchor_end: bool) -> Option<Span> {
    let len = literal.len();
    let start = match (anchor_start, anchor_end) {
        (true, true) => (haystack == literal).then_some(0)?,
        (true, false) => haystack.starts_with(literal).then_some(0)?,
        (false, true) => haystack
            .ends_with(literal)
            .then(|| haystack.len() - len)?,
        (false, false) => haystack.find(literal)?,
    };
    Some(Span {
        start,
        end: start + len,
    })
}

/// Finds the tokens in order starting at byte `from`, each as early as
/// possible. This yields the occurrence whose last token ends earliest.
fn find_forward(haystack: &str, tokens: &[String], from: usize) -> Option<Span> {
    let mut pos = from;
    let mut start = None;
    for token in tokens {
        let found = pos + haystack.get(pos..)?.find(token.as_str())?;
        start.get_or_insert(found);
        pos = found + token.len();
    }
    Some(Span {
        start: start.unwrap_or(from),
        end: pos,
    })
}

/// Narrowest occurrence reachable by restarting the forward search one
/// character past the previous start, until no occurrence remains.
///
/// This is a heuristic scan, not a global minimum-width search. Among equally
/// narrow occurrences the earliest wins.
fn narrowest(haystack: &str, tokens: &[String]) -> Option<Span> {
    let mut best = find_forward(haystack, tokens, 0)?;
    let mut from = next_boundary(haystack, best.start);
    while from <= haystack.len() {
        let Some(span) = find_forward(haystack, tokens, from) else {
            break;
        };
        if span.width() < best.width() {
            best = span;
        }
        from = next_boundary(haystack, span.start);
    }
    Some(best)
}

fn next_boundary(haystack: &str, at: usize) -> usize {
    match haystack.get(at..).and_then(|rest| rest.chars().next()) {
        Some(c) => at + c.len_utf8(),
        None => at + 1,
    }
}
