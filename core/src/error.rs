use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors raised while loading, saving, or interpreting a [`crate::PickerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid key name: {0:?}")]
    InvalidKey(String),

    #[error("unknown action {action:?} bound to {key}")]
    UnknownAction { key: String, action: String },

    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("caret {caret} out of range for query of {len} tokens")]
    CaretOutOfRange { caret: usize, len: usize },

    #[error("index {index} out of range for {len} candidates")]
    IndexOutOfRange { index: usize, len: usize },
}
