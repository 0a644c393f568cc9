mod app;

pub use app::{CaseMode, EngineKind, PickerConfig, SchedulerSection, SearchSection};
