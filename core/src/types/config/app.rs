use crate::error::ConfigError;
use crate::types::KeyName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// User-facing picker configuration, persisted as picker.toml.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    /// Key bindings layered over the built-in keymap. An empty action unbinds.
    #[serde(default)]
    pub keys: BTreeMap<KeyName, String>,
}

impl PickerConfig {
    /// Returns the config file path within the given directory.
    pub fn path(config_dir: &Path) -> std::path::PathBuf {
        config_dir.join("picker.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no picker config, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "picker config loaded");
        Ok(config)
    }

    /// Saves config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.scheduler.poke_interval_ms == 0 {
            errors.push("poke_interval_ms must be at least 1".to_string());
        }

        if self.scheduler.slice_ms == 0 {
            errors.push("slice_ms must be at least 1".to_string());
        }

        errors
    }

    /// Like [`Self::validate`], but as a `Result`.
    pub fn check(&self) -> Result<(), ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        for error in self.validate() {
            tracing::warn!(%error, "invalid picker config value replaced by default");
        }
        let defaults = SchedulerSection::default();
        Self {
            search: self.search.clone(),
            scheduler: SchedulerSection {
                poke_interval_ms: if self.scheduler.poke_interval_ms == 0 {
                    defaults.poke_interval_ms
                } else {
                    self.scheduler.poke_interval_ms
                },
                slice_ms: if self.scheduler.slice_ms == 0 {
                    defaults.slice_ms
                } else {
                    self.scheduler.slice_ms
                },
                ..self.scheduler.clone()
            },
            keys: self.keys.clone(),
        }
    }
}

/// Matching settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSection {
    #[serde(default)]
    pub case_matching: CaseMode,
    #[serde(default = "default_true")]
    pub cache: bool,
    #[serde(default)]
    pub engine: EngineKind,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            case_matching: CaseMode::default(),
            cache: true,
            engine: EngineKind::default(),
        }
    }
}

/// Case policy applied once per match invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Sensitive,
    Insensitive,
    /// Insensitive unless the query contains an uppercase character.
    #[default]
    Smart,
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseMode::Sensitive => write!(f, "sensitive"),
            CaseMode::Insensitive => write!(f, "insensitive"),
            CaseMode::Smart => write!(f, "smart"),
        }
    }
}

/// Which built-in match engine a session starts with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Default,
    Nucleo,
}

/// Cooperative scheduling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_poke_interval_ms")]
    pub poke_interval_ms: u64,
    #[serde(default = "default_slice_ms")]
    pub slice_ms: u64,
    #[serde(default = "default_busy_delay_ms")]
    pub busy_delay_ms: u64,
    /// Search spaces up to this size are matched synchronously.
    #[serde(default = "default_sync_threshold")]
    pub sync_threshold: usize,
}

impl SchedulerSection {
    pub fn poke_interval(&self) -> Duration {
        Duration::from_millis(self.poke_interval_ms)
    }

    pub fn slice(&self) -> Duration {
        Duration::from_millis(self.slice_ms)
    }

    pub fn busy_delay(&self) -> Duration {
        Duration::from_millis(self.busy_delay_ms)
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            poke_interval_ms: default_poke_interval_ms(),
            slice_ms: default_slice_ms(),
            busy_delay_ms: default_busy_delay_ms(),
            sync_threshold: default_sync_threshold(),
        }
    }
}

fn default_poke_interval_ms() -> u64 {
    10
}

fn default_slice_ms() -> u64 {
    8
}

fn default_busy_delay_ms() -> u64 {
    100
}

fn default_sync_threshold() -> usize {
    2000
}

fn default_true() -> bool {
    true
}
