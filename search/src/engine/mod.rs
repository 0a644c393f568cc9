mod default;
mod func;
mod scorer;

use crate::config::CaseMatching;
use crate::scheduler::Budget;
use sift_core::{EngineKind, Stritems};
use std::sync::Arc;
use thiserror::Error;

pub use default::DefaultEngine;
pub use func::FnEngine;
pub use scorer::NucleoEngine;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("match engine failed: {0}")]
    Failed(String),

    #[error("match engine panicked: {0}")]
    Panicked(String),

    #[error("candidate index {index} out of range for {len} stritems")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Input of one match invocation.
#[derive(Debug, Clone)]
pub struct MatchRequest {
    /// Candidate indices to consider, in the order ties are broken.
    pub space: Vec<usize>,
    pub tokens: Vec<String>,
    pub case_matching: CaseMatching,
}

impl MatchRequest {
    pub fn new(space: Vec<usize>, tokens: Vec<String>, case_matching: CaseMatching) -> Self {
        Self {
            space,
            tokens,
            case_matching,
        }
    }

    pub fn prompt(&self) -> String {
        self.tokens.concat()
    }

    /// Whether stritems and query are both lowercased for this invocation.
    pub fn ignores_case(&self) -> bool {
        self.case_matching.ignores_case(&self.prompt())
    }
}

/// Result of resuming a [`MatchPass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The time slice is spent; resume later.
    Yield,
    /// A poke returned `false`; partial results were discarded.
    Cancelled,
    /// Ranked candidate indices, best first.
    Done(Vec<usize>),
}

/// Matches stritems against a query.
///
/// Implementations must only return indices taken from the request's search
/// space. The default engine upholds this; custom engines are trusted to.
pub trait MatchEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Prepares a resumable pass. No candidate is examined yet.
    fn begin(&self, request: MatchRequest) -> Result<Box<dyn MatchPass>, EngineError>;

    /// Whether the previous ranked set may be used as the search space when
    /// tokens are appended to the query.
    fn narrows_on_append(&self) -> bool {
        false
    }

    /// Runs a whole pass on the current thread, without yielding.
    fn run(&self, stritems: &Stritems, request: MatchRequest) -> Result<Vec<usize>, EngineError> {
        let mut pass = self.begin(request)?;
        let mut budget = Budget::unbounded();
        loop {
            match pass.resume(stritems, &mut budget)? {
                Step::Yield => continue,
                Step::Done(ranked) => return Ok(ranked),
                Step::Cancelled => {
                    return Err(EngineError::Failed(format!(
                        "{} cancelled an unbounded pass",
                        self.name()
                    )));
                }
            }
        }
    }
}

/// One in-flight invocation of a [`MatchEngine`].
pub trait MatchPass {
    /// Continues matching. Long loops must call [`Budget::poke`] once per
    /// unit of work, return [`Step::Cancelled`] as soon as it returns
    /// `false`, and return [`Step::Yield`] once [`Budget::should_yield`].
    fn resume(&mut self, stritems: &Stritems, budget: &mut Budget) -> Result<Step, EngineError>;
}

/// Returns the built-in engine for `kind`.
pub fn engine_for(kind: EngineKind) -> Arc<dyn MatchEngine> {
    match kind {
        EngineKind::Default => Arc::new(DefaultEngine),
        EngineKind::Nucleo => Arc::new(NucleoEngine::default()),
    }
}
