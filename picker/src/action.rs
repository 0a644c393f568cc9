use crate::error::ActionError;
use crate::session::Session;
use sift_core::KeyName;
use std::fmt;
use std::sync::Arc;

type ActionFn<T> = dyn Fn(&mut Session<'_, T>) -> Result<(), ActionError> + Send + Sync;

/// One unit of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Printable query token, normally one character.
    Text(String),
    /// Non-printable key, resolved through the keymap.
    Key(KeyName),
}

impl Input {
    pub fn text(token: impl Into<String>) -> Self {
        Input::Text(token.into())
    }
}

/// User-supplied action bound to a key.
pub struct CustomAction<T> {
    name: String,
    func: Arc<ActionFn<T>>,
}

impl<T> CustomAction<T> {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Session<'_, T>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, session: &mut Session<'_, T>) -> Result<(), ActionError> {
        (self.func)(session)
    }
}

impl<T> Clone for CustomAction<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<T> fmt::Debug for CustomAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a key does.
pub enum Action<T> {
    Confirm,
    Cancel,
    Backspace,
    Delete,
    DeleteToStart,
    DeleteWord,
    CaretLeft,
    CaretRight,
    CaretHome,
    CaretEnd,
    Next,
    Prev,
    First,
    Last,
    ToggleMark,
    ToggleMarkAll,
    Refine,
    ClearQuery,
    Custom(CustomAction<T>),
}

impl<T> Action<T> {
    /// Parses a built-in action from its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            "confirm" => Action::Confirm,
            "cancel" => Action::Cancel,
            "backspace" => Action::Backspace,
            "delete" => Action::Delete,
            "delete_to_start" => Action::DeleteToStart,
            "delete_word" => Action::DeleteWord,
            "caret_left" => Action::CaretLeft,
            "caret_right" => Action::CaretRight,
            "caret_home" => Action::CaretHome,
            "caret_end" => Action::CaretEnd,
            "next" => Action::Next,
            "prev" => Action::Prev,
            "first" => Action::First,
            "last" => Action::Last,
            "toggle_mark" => Action::ToggleMark,
            "toggle_mark_all" => Action::ToggleMarkAll,
            "refine" => Action::Refine,
            "clear_query" => Action::ClearQuery,
            _ => return None,
        };
        Some(action)
    }

    pub fn name(&self) -> &str {
        match self {
            Action::Confirm => "confirm",
            Action::Cancel => "cancel",
            Action::Backspace => "backspace",
            Action::Delete => "delete",
            Action::DeleteToStart => "delete_to_start",
            Action::DeleteWord => "delete_word",
            Action::CaretLeft => "caret_left",
            Action::CaretRight => "caret_right",
            Action::CaretHome => "caret_home",
            Action::CaretEnd => "caret_end",
            Action::Next => "next",
            Action::Prev => "prev",
            Action::First => "first",
            Action::Last => "last",
            Action::ToggleMark => "toggle_mark",
            Action::ToggleMarkAll => "toggle_mark_all",
            Action::Refine => "refine",
            Action::ClearQuery => "clear_query",
            Action::Custom(custom) => custom.name(),
        }
    }
}

// Derive would require `T: Clone`.
impl<T> Clone for Action<T> {
    fn clone(&self) -> Self {
        match self {
            Action::Confirm => Action::Confirm,
            Action::Cancel => Action::Cancel,
            Action::Backspace => Action::Backspace,
            Action::Delete => Action::Delete,
            Action::DeleteToStart => Action::DeleteToStart,
            Action::DeleteWord => Action::DeleteWord,
            Action::CaretLeft => Action::CaretLeft,
            Action::CaretRight => Action::CaretRight,
            Action::CaretHome => Action::CaretHome,
            Action::CaretEnd => Action::CaretEnd,
            Action::Next => Action::Next,
            Action::Prev => Action::Prev,
            Action::First => Action::First,
            Action::Last => Action::Last,
            Action::ToggleMark => Action::ToggleMark,
            Action::ToggleMarkAll => Action::ToggleMarkAll,
            Action::Refine => Action::Refine,
            Action::ClearQuery => Action::ClearQuery,
            Action::Custom(custom) => Action::Custom(custom.clone()),
        }
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Custom(custom) => f.debug_tuple("Custom").field(&custom.name()).finish(),
            builtin => f.write_str(builtin.name()),
        }
    }
}
