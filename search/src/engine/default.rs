use super::{EngineError, MatchEngine, MatchPass, MatchRequest, Step};
use crate::query::SearchQuery;
use crate::results::locate;
use crate::scheduler::Budget;
use sift_core::Stritems;

/// Subsequence/substring engine ranking by `(width, start, input order)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEngine;

impl MatchEngine for DefaultEngine {
    fn name(&self) -> &str {
        "default"
    }

    fn begin(&self, request: MatchRequest) -> Result<Box<dyn MatchPass>, EngineError> {
        let lowercase = request.ignores_case();
        let query = SearchQuery::parse(&request.tokens);
        let query = if lowercase {
            query.to_lowercase()
        } else {
            query
        };

        tracing::debug!(
            mode = query.mode_name(),
            lowercase,
            space = request.space.len(),
            "default engine pass"
        );

        Ok(Box::new(DefaultPass {
            query,
            lowercase,
            space: request.space,
            cursor: 0,
            hits: Vec::new(),
        }))
    }

    fn narrows_on_append(&self) -> bool {
        true
    }
}

struct Hit {
    width: usize,
    start: usize,
    order: usize,
    index: usize,
}

struct DefaultPass {
    query: SearchQuery,
    lowercase: bool,
    space: Vec<usize>,
    cursor: usize,
    hits: Vec<Hit>,
}

impl MatchPass for DefaultPass {
    fn resume(&mut self, stritems: &Stritems, budget: &mut Budget) -> Result<Step, EngineError> {
        let haystacks = stritems.variant(self.lowercase);

        if self.query == SearchQuery::All {
            if let Some(&index) = self.space.iter().find(|&&i| i >= haystacks.len()) {
                return Err(EngineError::IndexOutOfRange {
                    index,
                    len: haystacks.len(),
                });
            }
            return Ok(Step::Done(std::mem::take(&mut self.space)));
        }

        let mut progressed = false;
        while self.cursor < self.space.len() {
            if !budget.poke() {
                return Ok(Step::Cancelled);
            }
            if progressed && budget.should_yield() {
                return Ok(Step::Yield);
            }
            progressed = true;

            let order = self.cursor;
            let index = self.space[order];
            self.cursor += 1;

            let haystack = haystacks
                .get(index)
                .ok_or(EngineError::IndexOutOfRange {
                    index,
                    len: haystacks.len(),
                })?;
            if let Some(span) = locate(&self.query, haystack) {
                self.hits.push(Hit {
                    width: span.width(),
                    start: span.start,
                    order,
                    index,
                });
            }
        }

        self.hits
            .sort_unstable_by_key(|hit| (hit.width, hit.start, hit.order));
        Ok(Step::Done(self.hits.drain(..).map(|hit| hit.index).collect()))
    }
}
