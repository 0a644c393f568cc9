//! Search query grammar.

use sift_core::is_blank;

/// A query after its mode markers have been interpreted.
///
/// Modes, highest precedence first:
///
/// 1. leading `*`: fuzzy over the remaining characters, nothing else applies
/// 2. leading `'`: literal substring of the remainder
/// 3. leading `^` and/or trailing `$`: literal anchored at the start/end
/// 4. whitespace-only tokens: the tokens between them join into contiguous
///    parts, matched fuzzily in order
/// 5. otherwise fuzzy over the tokens, or literal when there is a single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Empty effective query. Everything matches in input order.
    All,
    /// Literal substring, optionally anchored to either end.
    Exact {
        literal: String,
        anchor_start: bool,
        anchor_end: bool,
    },
    /// Literal parts in order, gaps allowed between them.
    Fuzzy(Vec<String>),
}

impl SearchQuery {
    pub fn parse(tokens: &[String]) -> Self {
        let prompt = tokens.concat();

        if let Some(rest) = prompt.strip_prefix('*') {
            let chars: Vec<String> = rest.chars().map(String::from).collect();
            return if chars.is_empty() {
                SearchQuery::All
            } else {
                SearchQuery::Fuzzy(chars)
            };
        }

        if let Some(rest) = prompt.strip_prefix('\'') {
            return Self::exact(rest, false, false);
        }

        let anchor_start = prompt.starts_with('^');
        let rest = if anchor_start { &prompt[1..] } else { &prompt[..] };
        let anchor_end = rest.ends_with('$');
        if anchor_start || anchor_end {
            let rest = if anchor_end {
                &rest[..rest.len() - 1]
            } else {
                rest
            };
            return Self::exact(rest, anchor_start, anchor_end);
        }

        let tokens: Vec<&String> = tokens.iter().filter(|t| !t.is_empty()).collect();

        if tokens.iter().any(|t| is_blank(t)) {
            let parts: Vec<String> = tokens
                .split(|t| is_blank(t))
                .filter(|group| !group.is_empty())
                .map(|group| group.iter().map(|t| t.as_str()).collect())
                .collect();
            if !parts.is_empty() {
                return SearchQuery::Fuzzy(parts);
            }
        }

        match tokens.len() {
            0 => SearchQuery::All,
            1 => Self::exact(tokens[0], false, false),
            _ => SearchQuery::Fuzzy(tokens.into_iter().cloned().collect()),
        }
    }

    fn exact(literal: &str, anchor_start: bool, anchor_end: bool) -> Self {
        // An empty literal matches everything, anchored or not.
        if literal.is_empty() {
            return SearchQuery::All;
        }
        SearchQuery::Exact {
            literal: literal.to_string(),
            anchor_start,
            anchor_end,
        }
    }

    /// Returns the same query with every literal lowercased.
    pub fn to_lowercase(&self) -> Self {
        match self {
            SearchQuery::All => SearchQuery::All,
            SearchQuery::Exact {
                literal,
                anchor_start,
                anchor_end,
            } => SearchQuery::Exact {
                literal: literal.to_lowercase(),
                anchor_start: *anchor_start,
                anchor_end: *anchor_end,
            },
            SearchQuery::Fuzzy(parts) => {
                SearchQuery::Fuzzy(parts.iter().map(|p| p.to_lowercase()).collect())
            }
        }
    }

    /// Returns true if appending tokens to `tokens` can only shrink the
    /// match set.
    ///
    /// A trailing `$` stops being an anchor once something follows it, and a
    /// query of blank tokens only is matched literally until a non-blank token
    /// turns those blanks into part separators.
    pub fn narrows_on_append(tokens: &[String]) -> bool {
        let forced = tokens
            .iter()
            .find(|t| !t.is_empty())
            .is_some_and(|t| t.starts_with('*') || t.starts_with('\''));
        match Self::parse(tokens) {
            SearchQuery::Exact {
                anchor_end: true, ..
            } => false,
            SearchQuery::Exact {
                anchor_start: false,
                ..
            }
            | SearchQuery::Fuzzy(_) => {
                forced || tokens.iter().any(|t| !t.is_empty() && !is_blank(t))
            }
            _ => true,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            SearchQuery::All => "all",
            SearchQuery::Exact {
                anchor_start: false,
                anchor_end: false,
                ..
            } => "exact",
            SearchQuery::Exact { .. } => "anchored",
            SearchQuery::Fuzzy(_) => "fuzzy",
        }
    }
}
