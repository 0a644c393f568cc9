pub(crate) mod config;
pub use config::{CaseMode, EngineKind, PickerConfig, SchedulerSection, SearchSection};

pub(crate) mod items;
pub use items::{Candidate, ItemStore, Stritems};

pub(crate) mod key;
pub use key::{KeyName, KeyNameError, MAX_KEY_NAME_LENGTH};

pub(crate) mod query;
pub use query::{Query, is_blank};
