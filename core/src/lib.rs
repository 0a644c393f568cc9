//! Shared types for the sift picker.
//!
//! - [`ItemStore`]: the immutable candidate list of one session plus the
//!   precomputed string projection ("stritem") of every candidate.
//! - [`Query`]: the ordered query tokens and the insertion caret.
//! - [`PickerConfig`]: user-facing configuration, persisted as TOML.

pub mod error;
pub mod types;

pub use error::{ConfigError, Error, Result, ValidationError};
pub use types::{
    Candidate, CaseMode, EngineKind, ItemStore, KeyName, KeyNameError, PickerConfig, Query,
    SchedulerSection, SearchSection, Stritems, is_blank,
};
