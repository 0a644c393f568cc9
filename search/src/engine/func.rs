use super::{EngineError, MatchEngine, MatchPass, MatchRequest, Step};
use crate::scheduler::Budget;
use sift_core::Stritems;
use std::sync::Arc;

type MatchFn = dyn Fn(&Stritems, &MatchRequest) -> Result<Vec<usize>, EngineError> + Send + Sync;

/// Adapts a plain match function into a [`MatchEngine`].
///
/// The function runs to completion in a single resume; it cannot yield. It
/// is still skipped when its generation goes stale before it starts.
#[derive(Clone)]
pub struct FnEngine {
    name: String,
    func: Arc<MatchFn>,
}

impl FnEngine {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Stritems, &MatchRequest) -> Result<Vec<usize>, EngineError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for FnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEngine").field("name", &self.name).finish()
    }
}

impl MatchEngine for FnEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&self, request: MatchRequest) -> Result<Box<dyn MatchPass>, EngineError> {
        Ok(Box::new(FnPass {
            func: self.func.clone(),
            request,
        }))
    }
}

struct FnPass {
    func: Arc<MatchFn>,
    request: MatchRequest,
}

impl MatchPass for FnPass {
    fn resume(&mut self, stritems: &Stritems, budget: &mut Budget) -> Result<Step, EngineError> {
        if !budget.poke() {
            return Ok(Step::Cancelled);
        }
        (self.func)(stritems, &self.request).map(Step::Done)
    }
}
