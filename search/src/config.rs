use sift_core::{CaseMode, EngineKind, SchedulerSection, SearchSection};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseMatching {
    Sensitive,
    Insensitive,
    /// Case-insensitive unless query contains uppercase.
    #[default]
    Smart,
}

impl CaseMatching {
    /// Decides once per match invocation whether both sides are lowercased.
    pub fn ignores_case(self, prompt: &str) -> bool {
        match self {
            CaseMatching::Sensitive => false,
            CaseMatching::Insensitive => true,
            CaseMatching::Smart => !prompt.chars().any(char::is_uppercase),
        }
    }
}

impl From<CaseMode> for CaseMatching {
    fn from(mode: CaseMode) -> Self {
        match mode {
            CaseMode::Sensitive => CaseMatching::Sensitive,
            CaseMode::Insensitive => CaseMatching::Insensitive,
            CaseMode::Smart => CaseMatching::Smart,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub case_matching: CaseMatching,
    pub cache: bool,
    pub engine: EngineKind,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from(&SearchSection::default())
    }
}

impl From<&SearchSection> for SearchConfig {
    fn from(section: &SearchSection) -> Self {
        Self {
            case_matching: section.case_matching.into(),
            cache: section.cache,
            engine: section.engine,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Minimum wall-clock time between two real liveness checks in `poke()`.
    pub poke_interval: Duration,
    /// Work budget of one `MatchTask::poll()` before it yields.
    pub slice: Duration,
    /// How long a pass runs before the session reports busy.
    pub busy_delay: Duration,
    /// Search spaces up to this size are matched without yielding.
    pub sync_threshold: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&SchedulerSection::default())
    }
}

impl From<&SchedulerSection> for SchedulerConfig {
    fn from(section: &SchedulerSection) -> Self {
        Self {
            poke_interval: section.poke_interval(),
            slice: section.slice(),
            busy_delay: section.busy_delay(),
            sync_threshold: section.sync_threshold,
        }
    }
}
