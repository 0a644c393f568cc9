use crate::action::{Action, CustomAction};
use sift_core::{ConfigError, KeyName};
use std::collections::BTreeMap;
use std::fmt;

const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("<CR>", "confirm"),
    ("<Esc>", "cancel"),
    ("<C-c>", "cancel"),
    ("<BS>", "backspace"),
    ("<Del>", "delete"),
    ("<C-u>", "delete_to_start"),
    ("<C-w>", "delete_word"),
    ("<Left>", "caret_left"),
    ("<Right>", "caret_right"),
    ("<Home>", "caret_home"),
    ("<End>", "caret_end"),
    ("<Down>", "next"),
    ("<C-n>", "next"),
    ("<Up>", "prev"),
    ("<C-p>", "prev"),
    ("<Tab>", "toggle_mark"),
    ("<C-a>", "toggle_mark_all"),
    ("<C-r>", "refine"),
    ("<C-l>", "clear_query"),
];

/// Key name to action table.
pub struct Keymap<T> {
    bindings: BTreeMap<KeyName, Action<T>>,
}

impl<T> Default for Keymap<T> {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .filter_map(|(key, name)| {
                let key = KeyName::try_new(key.to_string()).ok()?;
                Some((key, Action::from_name(name)?))
            })
            .collect();
        Self { bindings }
    }
}

impl<T> Keymap<T> {
    /// An empty keymap.
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Default bindings overridden by the `[keys]` table.
    ///
    /// An empty action name removes the binding. Unknown action names are
    /// rejected here rather than when the key is first pressed.
    pub fn from_config(keys: &BTreeMap<KeyName, String>) -> Result<Self, ConfigError> {
        let mut keymap = Self::default();
        for (key, name) in keys {
            let name = name.trim();
            if name.is_empty() {
                keymap.unbind(key);
                continue;
            }
            let action = Action::from_name(name).ok_or_else(|| ConfigError::UnknownAction {
                key: key.to_string(),
                action: name.to_string(),
            })?;
            keymap.bind(key.clone(), action);
        }
        Ok(keymap)
    }

    pub fn bind(&mut self, key: KeyName, action: Action<T>) -> Option<Action<T>> {
        self.bindings.insert(key, action)
    }

    /// Binds a custom action to a key given by name.
    pub fn bind_custom(&mut self, key: &str, action: CustomAction<T>) -> Result<(), ConfigError> {
        let key =
            KeyName::try_new(key.to_string()).map_err(|_| ConfigError::InvalidKey(key.to_string()))?;
        self.bind(key, Action::Custom(action));
        Ok(())
    }

    pub fn unbind(&mut self, key: &KeyName) -> Option<Action<T>> {
        self.bindings.remove(key)
    }

    pub fn get(&self, key: &KeyName) -> Option<&Action<T>> {
        self.bindings.get(key)
    }

    /// Looks a key up by name. Invalid names are simply unbound.
    pub fn lookup(&self, key: &str) -> Option<&Action<T>> {
        let key = KeyName::try_new(key.to_string()).ok()?;
        self.bindings.get(&key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<T> Clone for Keymap<T> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
        }
    }
}

impl<T> fmt::Debug for Keymap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.bindings.iter()).finish()
    }
}
