//! Cooperative scheduling for match passes.
//!
//! A pass never runs on its own. The host loop calls [`MatchTask::poll`],
//! which resumes the pass for at most one time slice. Inside the pass,
//! [`Budget::poke`] is called once per candidate: it reports whether the
//! generation the task captured is still live and whether the slice is spent.

use crate::config::SchedulerConfig;
use crate::engine::{EngineError, MatchPass, Step};
use sift_core::Stritems;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic generation counter of one session.
///
/// Bumped on every query mutation, item-set replacement, and session
/// start/stop. Work that captured an older value is stale.
#[derive(Debug, Default, Clone)]
pub struct Generation {
    live: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.live.load(Ordering::Acquire)
    }

    /// Advances the counter and returns the new generation.
    pub fn bump(&self) -> u64 {
        self.live.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Marks the session live. Counts as a generation change.
    pub fn activate(&self) -> u64 {
        self.active.store(true, Ordering::Release);
        self.bump()
    }

    /// Marks the session stopped. Every outstanding token goes stale.
    pub fn deactivate(&self) -> u64 {
        self.active.store(false, Ordering::Release);
        self.bump()
    }

    /// Captures the current generation.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            captured: self.current(),
            generation: self.clone(),
        }
    }
}

/// Generation captured when a pass started.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: Generation,
    captured: u64,
}

impl CancelToken {
    pub fn generation(&self) -> u64 {
        self.captured
    }

    /// True while the session is active and nothing has bumped the counter.
    pub fn is_live(&self) -> bool {
        self.generation.is_active() && self.generation.current() == self.captured
    }
}

/// Throttled liveness check.
///
/// The first call and any call at least `interval` after the previous real
/// check consult the [`CancelToken`]. Calls in between return the last answer.
/// Once a poke has returned `false` it keeps returning `false`.
#[derive(Debug, Clone)]
pub struct Poke {
    token: Option<CancelToken>,
    interval: Duration,
    last_check: Option<Instant>,
    alive: bool,
}

impl Poke {
    pub fn new(token: CancelToken, interval: Duration) -> Self {
        Self {
            token: Some(token),
            interval,
            last_check: None,
            alive: true,
        }
    }

    /// A poke that never cancels.
    pub fn detached() -> Self {
        Self {
            token: None,
            interval: Duration::MAX,
            last_check: None,
            alive: true,
        }
    }

    /// Returns `true` to keep working, `false` to stop and discard partial results.
    pub fn poke(&mut self) -> bool {
        self.poke_at(Instant::now())
    }

    pub(crate) fn poke_at(&mut self, now: Instant) -> bool {
        if !self.alive {
            return false;
        }
        let due = self
            .last_check
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last_check = Some(now);
            self.alive = self.token.as_ref().is_none_or(CancelToken::is_live);
        }
        self.alive
    }
}

/// What a pass may spend during one resume: a [`Poke`] plus a time slice.
#[derive(Debug, Clone)]
pub struct Budget {
    poke: Poke,
    deadline: Option<Instant>,
    exhausted: bool,
}

impl Budget {
    pub fn new(poke: Poke) -> Self {
        Self {
            poke,
            deadline: None,
            exhausted: false,
        }
    }

    /// Never cancels, never yields.
    pub fn unbounded() -> Self {
        Self::new(Poke::detached())
    }

    /// Starts a fresh slice. The poke throttle carries over.
    pub fn renew(&mut self, slice: Option<Duration>) {
        self.deadline = slice.map(|slice| Instant::now() + slice);
        self.exhausted = false;
    }

    /// Call once per unit of work. Returns `false` when the pass must stop
    /// and discard its partial results.
    pub fn poke(&mut self) -> bool {
        let now = Instant::now();
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.exhausted = true;
        }
        self.poke.poke_at(now)
    }

    /// True once the slice is spent. The pass should return [`Step::Yield`].
    pub fn should_yield(&self) -> bool {
        self.exhausted
    }
}

/// Outcome of polling a [`MatchTask`].
#[derive(Debug)]
pub enum Progress {
    /// The pass yielded and wants to be polled again.
    Pending,
    /// The generation went stale. Nothing may be applied.
    Cancelled,
    Finished(Vec<usize>),
    Failed(EngineError),
}

/// A match pass in flight, resumable from the host's event loop.
pub struct MatchTask {
    pass: Box<dyn MatchPass>,
    token: CancelToken,
    budget: Budget,
    slice: Duration,
    started: Instant,
}

impl MatchTask {
    pub fn new(pass: Box<dyn MatchPass>, token: CancelToken, config: &SchedulerConfig) -> Self {
        let poke = Poke::new(token.clone(), config.poke_interval);
        Self {
            pass,
            token,
            budget: Budget::new(poke),
            slice: config.slice,
            started: Instant::now(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.token.generation()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Resumes the pass for at most one slice.
    pub fn poll(&mut self, stritems: &Stritems) -> Progress {
        self.drive(stritems, Some(self.slice))
    }

    /// Resumes the pass until it finishes, fails, or is cancelled.
    pub fn run(&mut self, stritems: &Stritems) -> Progress {
        loop {
            match self.drive(stritems, None) {
                Progress::Pending => continue,
                progress => return progress,
            }
        }
    }

    fn drive(&mut self, stritems: &Stritems, slice: Option<Duration>) -> Progress {
        if !self.token.is_live() {
            return Progress::Cancelled;
        }
        self.budget.renew(slice);
        match self.pass.resume(stritems, &mut self.budget) {
            Ok(Step::Yield) => {
                tracing::trace!(generation = self.generation(), "match pass yielded");
                Progress::Pending
            }
            Ok(Step::Cancelled) => Progress::Cancelled,
            // A pass that never pokes can finish after going stale.
            Ok(Step::Done(ranked)) if self.token.is_live() => Progress::Finished(ranked),
            Ok(Step::Done(_)) => Progress::Cancelled,
            Err(err) => Progress::Failed(err),
        }
    }
}

impl std::fmt::Debug for MatchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchTask")
            .field("generation", &self.generation())
            .field("elapsed", &self.elapsed())
            .finish_non_exhaustive()
    }
}
