use crate::error::ValidationError;

/// Ordered query tokens plus an insertion caret.
///
/// Tokens are normally one typed character each, but nothing requires it.
/// The caret is an insertion point in `0..=len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<String>,
    caret: usize,
}

/// Create operations.
impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query from explicit tokens with the caret at the end.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let caret = tokens.len();
        Self { tokens, caret }
    }

    /// Creates a query with one token per character of `prompt`.
    pub fn from_prompt(prompt: &str) -> Self {
        Self::from_tokens(prompt.chars().map(String::from).collect())
    }
}

/// Read operations.
impl Query {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Concatenation of every token. This is the cache key.
    pub fn prompt(&self) -> String {
        self.tokens.concat()
    }

    pub fn caret_at_end(&self) -> bool {
        self.caret == self.tokens.len()
    }

    /// Returns true if this query is `earlier` with zero or more tokens appended.
    pub fn extends(&self, earlier: &[String]) -> bool {
        self.tokens.starts_with(earlier)
    }
}

/// Edit operations. Each returns whether the tokens changed.
impl Query {
    /// Inserts a token at the caret and advances the caret past it.
    pub fn insert(&mut self, token: impl Into<String>) {
        self.tokens.insert(self.caret, token.into());
        self.caret += 1;
    }

    /// Removes the token left of the caret.
    pub fn remove_before_caret(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.caret -= 1;
        self.tokens.remove(self.caret);
        true
    }

    /// Removes the token right of the caret.
    pub fn remove_at_caret(&mut self) -> bool {
        if self.caret >= self.tokens.len() {
            return false;
        }
        self.tokens.remove(self.caret);
        true
    }

    /// Removes every token left of the caret.
    pub fn remove_to_start(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.tokens.drain(..self.caret);
        self.caret = 0;
        true
    }

    /// Removes the word left of the caret, along with any whitespace between
    /// the word and the caret.
    pub fn remove_word(&mut self) -> bool {
        let mut start = self.caret;
        while start > 0 && is_blank(&self.tokens[start - 1]) {
            start -= 1;
        }
        while start > 0 && !is_blank(&self.tokens[start - 1]) {
            start -= 1;
        }
        if start == self.caret {
            return false;
        }
        self.tokens.drain(start..self.caret);
        self.caret = start;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.tokens.is_empty() {
            return false;
        }
        self.tokens.clear();
        self.caret = 0;
        true
    }
}

/// Caret operations. Each returns whether the caret moved.
impl Query {
    pub fn move_left(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.caret -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.caret >= self.tokens.len() {
            return false;
        }
        self.caret += 1;
        true
    }

    pub fn move_home(&mut self) -> bool {
        std::mem::replace(&mut self.caret, 0) != 0
    }

    pub fn move_end(&mut self) -> bool {
        let end = self.tokens.len();
        std::mem::replace(&mut self.caret, end) != end
    }

    pub fn set_caret(&mut self, caret: usize) -> Result<(), ValidationError> {
        if caret > self.tokens.len() {
            return Err(ValidationError::CaretOutOfRange {
                caret,
                len: self.tokens.len(),
            });
        }
        self.caret = caret;
        Ok(())
    }
}

/// A token consisting only of whitespace. Separates query parts and words.
pub fn is_blank(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_whitespace)
}
