//! Sift match engine and cooperative scheduling.
//!
//! Matching is incremental and cancellable so a picker can filter hundreds of
//! thousands of candidates without freezing its input loop.
//!
//! # Design
//!
//! - [`SearchQuery`] parses the query tokens into one of the search modes
//!   (forced fuzzy `*`, forced exact `'`, anchored exact `^`/`$`, fuzzy over
//!   whitespace-separated parts, plain fuzzy).
//! - A [`MatchEngine`] turns a request into a resumable [`MatchPass`]. The
//!   default engine ranks by `(width, start, input order)`.
//! - [`MatchTask`] drives a pass one time slice at a time and abandons it as
//!   soon as the [`Generation`] it captured goes stale.
//! - [`MatchCache`] memoizes ranked results by prompt.
//!
//! # Non-blocking API
//!
//! - `MatchTask::poll()`: runs the pass for at most one slice
//! - `Poke::poke()`: throttled liveness check used inside long loops
//! - `MatchEngine::run()`: blocking convenience for small inputs

mod cache;
mod config;
mod engine;
mod query;
mod results;
mod scheduler;

pub use cache::MatchCache;
pub use config::{CaseMatching, SchedulerConfig, SearchConfig};
pub use engine::{
    DefaultEngine, EngineError, FnEngine, MatchEngine, MatchPass, MatchRequest, NucleoEngine,
    Step, engine_for,
};
pub use query::SearchQuery;
pub use results::{Span, locate};
pub use scheduler::{Budget, CancelToken, Generation, MatchTask, Poke, Progress};
