use super::{EngineError, MatchEngine, MatchPass, MatchRequest, Step};
use crate::config::CaseMatching;
use crate::scheduler::Budget;
use nucleo::pattern::{CaseMatching as NucleoCaseMatching, Normalization, Pattern};
use nucleo::{Config as NucleoConfig, Matcher, Utf32Str};
use sift_core::Stritems;

/// Engine backed by nucleo's scorer.
///
/// Queries use nucleo's pattern syntax instead of the sift grammar. Results
/// are ranked by descending score, ties in input order.
#[derive(Debug, Clone)]
pub struct NucleoEngine {
    config: NucleoConfig,
    normalization: Normalization,
}

impl Default for NucleoEngine {
    fn default() -> Self {
        Self {
            config: NucleoConfig::DEFAULT,
            normalization: Normalization::Smart,
        }
    }
}

impl NucleoEngine {
    /// Scores path separators and file names higher.
    pub fn for_paths() -> Self {
        let mut config = NucleoConfig::DEFAULT;
        config.set_match_paths();
        Self {
            config,
            ..Self::default()
        }
    }
}

impl MatchEngine for NucleoEngine {
    fn name(&self) -> &str {
        "nucleo"
    }

    fn begin(&self, request: MatchRequest) -> Result<Box<dyn MatchPass>, EngineError> {
        let case_matching = match request.case_matching {
            CaseMatching::Sensitive => NucleoCaseMatching::Respect,
            CaseMatching::Insensitive => NucleoCaseMatching::Ignore,
            CaseMatching::Smart => NucleoCaseMatching::Smart,
        };
        let pattern = Pattern::parse(&request.prompt(), case_matching, self.normalization);

        Ok(Box::new(NucleoPass {
            pattern,
            matcher: Matcher::new(self.config.clone()),
            buf: Vec::new(),
            space: request.space,
            cursor: 0,
            scored: Vec::new(),
        }))
    }
}

struct NucleoPass {
    pattern: Pattern,
    matcher: Matcher,
    buf: Vec<char>,
    space: Vec<usize>,
    cursor: usize,
    scored: Vec<(u32, usize, usize)>,
}

impl MatchPass for NucleoPass {
    fn resume(&mut self, stritems: &Stritems, budget: &mut Budget) -> Result<Step, EngineError> {
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

            let haystack = stritems.get(index).ok_or(EngineError::IndexOutOfRange {
                index,
                len: stritems.len(),
            })?;
            let haystack = Utf32Str::new(haystack, &mut self.buf);
            if let Some(score) = self.pattern.score(haystack, &mut self.matcher) {
                self.scored.push((score, order, index));
            }
        }

        self.scored
            .sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(Step::Done(
            self.scored.drain(..).map(|(_, _, index)| index).collect(),
        ))
    }
}
