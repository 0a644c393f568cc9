use crate::action::{Action, Input};
use crate::error::{ActionError, SessionError};
use crate::keymap::Keymap;
use crate::snapshot::Snapshot;
use sift_core::{Candidate, ConfigError, ItemStore, PickerConfig, Query, ValidationError};
use sift_search::{
    EngineError, Generation, MatchCache, MatchEngine, MatchRequest, MatchTask, Progress,
    SchedulerConfig, SearchConfig, SearchQuery, engine_for,
};
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting input. A match pass may be in flight.
    Active,
    /// Confirmed.
    Stopped,
    /// Cancelled by the user.
    Aborted,
}

/// Output of a confirmed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T> {
    /// Candidate under the cursor, absent when nothing matched.
    pub current: Option<T>,
    /// Marked candidates in candidate order.
    pub marked: Vec<T>,
}

/// Owns configuration and keymap, and opens sessions.
pub struct Picker<T> {
    config: PickerConfig,
    keymap: Keymap<T>,
}

impl<T> Default for Picker<T> {
    fn default() -> Self {
        Self {
            config: PickerConfig::default(),
            keymap: Keymap::default(),
        }
    }
}

impl<T> Picker<T> {
    /// Validates the configuration and builds the keymap.
    pub fn new(config: PickerConfig) -> Result<Self, ConfigError> {
        config.check()?;
        let keymap = Keymap::from_config(&config.keys)?;
        Ok(Self { config, keymap })
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap<T> {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap<T> {
        &mut self.keymap
    }
}

impl<T: Candidate + Clone> Picker<T> {
    pub fn start(&mut self, items: Vec<T>) -> Session<'_, T> {
        self.start_with(items, Query::new())
    }

    /// Opens a session with an initial query and runs the first match.
    pub fn start_with(&mut self, items: Vec<T>, query: Query) -> Session<'_, T> {
        let generation = Generation::new();
        generation.activate();
        let search = SearchConfig::from(&self.config.search);

        tracing::debug!(
            candidates = items.len(),
            engine = ?search.engine,
            "picker session started"
        );

        let mut session = Session {
            keymap: &self.keymap,
            engine: engine_for(search.engine),
            cache: MatchCache::new(search.cache),
            scheduler: SchedulerConfig::from(&self.config.scheduler),
            search,
            store: ItemStore::new(items),
            epoch: 0,
            query,
            generation,
            pending: None,
            ranked: Vec::new(),
            ranked_tokens: Vec::new(),
            ranked_epoch: None,
            current: 0,
            marked: BTreeSet::new(),
            state: SessionState::Active,
            errors: Vec::new(),
        };
        session.rematch(Scope::Full, None);
        session
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// The previous ranked set may serve as the search space.
    Narrow,
    Full,
}

struct PendingMatch {
    task: MatchTask,
    tokens: Vec<String>,
    epoch: u64,
    /// Candidate to keep under the cursor once the pass lands.
    anchor: Option<usize>,
}

/// One interactive picking session.
///
/// Session state is only mutated here, from the host's loop. A match pass
/// produces a ranked result; the session decides whether to apply it.
pub struct Session<'a, T> {
    keymap: &'a Keymap<T>,
    search: SearchConfig,
    scheduler: SchedulerConfig,
    store: ItemStore<T>,
    /// Bumped whenever the candidate list or the engine changes.
    epoch: u64,
    query: Query,
    engine: Arc<dyn MatchEngine>,
    cache: MatchCache,
    generation: Generation,
    pending: Option<PendingMatch>,
    ranked: Vec<usize>,
    /// Query tokens that produced `ranked`.
    ranked_tokens: Vec<String>,
    ranked_epoch: Option<u64>,
    current: usize,
    marked: BTreeSet<usize>,
    state: SessionState,
    errors: Vec<SessionError>,
}

/// Read operations.
impl<T: Candidate + Clone> Session<'_, T> {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state != SessionState::Active
    }

    /// Returns true while a match pass is in flight.
    pub fn is_matching(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns true once the in-flight pass has run longer than the busy delay.
    pub fn is_busy(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.task.elapsed() >= self.scheduler.busy_delay)
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn items(&self) -> &ItemStore<T> {
        &self.store
    }

    pub fn ranked(&self) -> &[usize] {
        &self.ranked
    }

    /// Position of the cursor within the ranked result.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Candidate index under the cursor.
    pub fn current_index(&self) -> Option<usize> {
        self.ranked.get(self.current).copied()
    }

    pub fn current_item(&self) -> Option<&T> {
        self.current_index().and_then(|index| self.store.get(index))
    }

    pub fn marked(&self) -> &BTreeSet<usize> {
        &self.marked
    }

    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            ranked: &self.ranked,
            current: self.current,
            marked: &self.marked,
            busy: self.is_busy(),
            tokens: self.query.tokens(),
            caret: self.query.caret(),
            state: self.state,
            generation: self.generation.current(),
        }
    }

    /// Drains the errors recorded since the last call.
    pub fn take_errors(&mut self) -> Vec<SessionError> {
        std::mem::take(&mut self.errors)
    }

    /// Current and marked candidates.
    pub fn selection(&self) -> Selection<T> {
        Selection {
            current: self.current_item().cloned(),
            marked: self
                .marked
                .iter()
                .filter_map(|&index| self.store.get(index).cloned())
                .collect(),
        }
    }

    /// Ends the session. Returns the selection only if it was confirmed.
    pub fn finish(self) -> Option<Selection<T>> {
        (self.state == SessionState::Stopped).then(|| self.selection())
    }
}

/// Input operations.
impl<T: Candidate + Clone> Session<'_, T> {
    /// Applies one input token. Ignored once the session has ended.
    pub fn feed(&mut self, input: Input) {
        if self.is_finished() {
            return;
        }
        match input {
            Input::Text(token) => self.insert(token),
            Input::Key(key) => match self.keymap.get(&key).cloned() {
                Some(action) => self.dispatch(action),
                None => tracing::trace!(%key, "unbound key"),
            },
        }
    }

    pub fn dispatch(&mut self, action: Action<T>) {
        if self.is_finished() {
            return;
        }
        match action {
            Action::Confirm => self.confirm(),
            Action::Cancel => self.cancel(),
            Action::Backspace => self.backspace(),
            Action::Delete => self.delete(),
            Action::DeleteToStart => self.delete_to_start(),
            Action::DeleteWord => self.delete_word(),
            Action::CaretLeft => self.caret_left(),
            Action::CaretRight => self.caret_right(),
            Action::CaretHome => self.caret_home(),
            Action::CaretEnd => self.caret_end(),
            Action::Next => self.next(),
            Action::Prev => self.prev(),
            Action::First => self.first(),
            Action::Last => self.last(),
            Action::ToggleMark => self.toggle_mark(),
            Action::ToggleMarkAll => self.toggle_mark_all(),
            Action::Refine => self.refine(),
            Action::ClearQuery => self.clear_query(),
            Action::Custom(custom) => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| custom.call(self)))
                    .unwrap_or_else(|payload| Err(ActionError(panic_message(payload))));
                if let Err(err) = result {
                    tracing::warn!(action = custom.name(), %err, "custom action failed");
                    self.errors.push(err.into());
                }
            }
        }
    }

    pub fn confirm(&mut self) {
        self.stop(SessionState::Stopped);
    }

    pub fn cancel(&mut self) {
        self.stop(SessionState::Aborted);
    }

    fn stop(&mut self, state: SessionState) {
        self.state = state;
        self.pending = None;
        self.generation.deactivate();
        tracing::info!(?state, ranked = self.ranked.len(), "picker session ended");
    }
}

/// Query operations.
impl<T: Candidate + Clone> Session<'_, T> {
    /// Inserts a token at the caret.
    pub fn insert(&mut self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            return;
        }
        self.query.insert(token);
        self.rematch(Scope::Narrow, None);
    }

    pub fn backspace(&mut self) {
        let changed = self.query.remove_before_caret();
        self.widened(changed);
    }

    pub fn delete(&mut self) {
        let changed = self.query.remove_at_caret();
        self.widened(changed);
    }

    pub fn delete_to_start(&mut self) {
        let changed = self.query.remove_to_start();
        self.widened(changed);
    }

    pub fn delete_word(&mut self) {
        let changed = self.query.remove_word();
        self.widened(changed);
    }

    pub fn clear_query(&mut self) {
        let changed = self.query.clear();
        self.widened(changed);
    }

    /// Replaces the query. The caret moves to the end.
    pub fn set_query(&mut self, tokens: Vec<String>) {
        self.query = Query::from_tokens(tokens);
        self.rematch(Scope::Full, None);
    }

    /// Replaces the query with one token per character.
    pub fn set_prompt(&mut self, prompt: &str) {
        self.query = Query::from_prompt(prompt);
        self.rematch(Scope::Full, None);
    }

    pub fn caret_left(&mut self) {
        self.query.move_left();
    }

    pub fn caret_right(&mut self) {
        self.query.move_right();
    }

    pub fn caret_home(&mut self) {
        self.query.move_home();
    }

    pub fn caret_end(&mut self) {
        self.query.move_end();
    }

    pub fn set_caret(&mut self, caret: usize) -> Result<(), ValidationError> {
        self.query.set_caret(caret)
    }

    fn widened(&mut self, changed: bool) {
        if changed {
            self.rematch(Scope::Full, None);
        }
    }
}

/// Navigation operations. None of them rematch.
impl<T: Candidate + Clone> Session<'_, T> {
    pub fn next(&mut self) {
        let len = self.ranked.len();
        if len > 0 {
            self.current = (self.current + 1) % len;
        }
    }

    pub fn prev(&mut self) {
        let len = self.ranked.len();
        if len > 0 {
            self.current = (self.current + len - 1) % len;
        }
    }

    pub fn first(&mut self) {
        self.current = 0;
    }

    pub fn last(&mut self) {
        self.current = self.ranked.len().saturating_sub(1);
    }

    /// Moves the cursor to a position within the ranked result.
    pub fn select(&mut self, position: usize) -> Result<(), ValidationError> {
        if position >= self.ranked.len() {
            return Err(ValidationError::IndexOutOfRange {
                index: position,
                len: self.ranked.len(),
            });
        }
        self.current = position;
        Ok(())
    }
}

/// Mark operations. Marks are candidate indices and survive query edits.
impl<T: Candidate + Clone> Session<'_, T> {
    pub fn toggle_mark(&mut self) {
        if let Some(index) = self.current_index() {
            toggle(&mut self.marked, index);
        }
    }

    /// Toggles every ranked candidate individually.
    pub fn toggle_mark_all(&mut self) {
        for &index in &self.ranked {
            toggle(&mut self.marked, index);
        }
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }
}

fn toggle(marked: &mut BTreeSet<usize>, index: usize) {
    if !marked.remove(&index) {
        marked.insert(index);
    }
}

/// Candidate and engine operations.
impl<T: Candidate + Clone> Session<'_, T> {
    /// Replaces the candidates with the ranked ones and starts over with an
    /// empty query and the configured engine.
    pub fn refine(&mut self) {
        let items: Vec<T> = self
            .ranked
            .iter()
            .filter_map(|&index| self.store.get(index).cloned())
            .collect();
        tracing::info!(from = self.store.len(), to = items.len(), "refining candidates");

        self.store.replace(items);
        self.invalidate();
        self.marked.clear();
        self.query = Query::new();
        self.engine = engine_for(self.search.engine);
        // Old indices point into the replaced list.
        self.ranked = self.store.indices();
        self.ranked_tokens.clear();
        self.current = 0;
        self.rematch(Scope::Full, None);
    }

    /// Appends a batch of streamed candidates and rematches the current query.
    ///
    /// The candidate under the cursor stays there if it still matches.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = T>) {
        let anchor = match &self.pending {
            Some(pending) => pending.anchor.or_else(|| self.current_index()),
            None => self.current_index(),
        };
        let added = self.store.extend(batch);
        if added.is_empty() {
            return;
        }
        tracing::debug!(added = added.len(), total = self.store.len(), "candidates ingested");

        self.invalidate();
        self.rematch(Scope::Full, anchor);
    }

    /// Records a failure of the candidate source. The ranked result stays.
    pub fn source_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "candidate source failed");
        self.errors.push(SessionError::Source(message));
    }

    pub fn set_engine(&mut self, engine: Arc<dyn MatchEngine>) {
        tracing::debug!(engine = engine.name(), "match engine replaced");
        self.engine = engine;
        self.invalidate();
        self.rematch(Scope::Full, None);
    }

    fn invalidate(&mut self) {
        self.epoch += 1;
        self.cache.clear();
    }
}

/// Matching operations.
impl<T: Candidate + Clone> Session<'_, T> {
    /// Resumes the in-flight pass for one time slice.
    pub fn tick(&mut self) {
        self.drive(false);
    }

    /// Runs the in-flight pass to completion.
    pub fn settle(&mut self) {
        self.drive(true);
    }

    fn rematch(&mut self, scope: Scope, anchor: Option<usize>) {
        let generation = self.generation.bump();
        self.pending = None;

        let tokens = self.query.tokens().to_vec();
        let prompt = self.query.prompt();
        if let Some(ranked) = cache_key(&tokens).and_then(|key| self.cache.get(&key)) {
            tracing::debug!(generation, %prompt, "match cache hit");
            let ranked = ranked.to_vec();
            self.apply(ranked, tokens, self.epoch, anchor);
            return;
        }

        let space = if scope == Scope::Narrow && self.can_narrow() {
            let mut space = self.ranked.clone();
            space.sort_unstable();
            space
        } else {
            self.store.indices()
        };
        let size = space.len();
        tracing::debug!(
            generation,
            %prompt,
            space = size,
            engine = self.engine.name(),
            "match pass started"
        );

        let request = MatchRequest::new(space, tokens.clone(), self.search.case_matching);
        let engine = Arc::clone(&self.engine);
        let pass = panic::catch_unwind(AssertUnwindSafe(|| engine.begin(request)))
            .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload))));
        let pass = match pass {
            Ok(pass) => pass,
            Err(err) => {
                self.engine_failed(err);
                return;
            }
        };

        self.pending = Some(PendingMatch {
            task: MatchTask::new(pass, self.generation.token(), &self.scheduler),
            tokens,
            epoch: self.epoch,
            anchor,
        });
        if size <= self.scheduler.sync_threshold {
            self.drive(true);
        }
    }

    /// Whether appending to `ranked_tokens` can only shrink `ranked`.
    fn can_narrow(&self) -> bool {
        self.ranked_epoch == Some(self.epoch)
            && self.engine.narrows_on_append()
            && self.query.extends(&self.ranked_tokens)
            && SearchQuery::narrows_on_append(&self.ranked_tokens)
    }

    fn drive(&mut self, to_completion: bool) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        let stritems = self.store.stritems();
        let progress = panic::catch_unwind(AssertUnwindSafe(|| {
            if to_completion {
                pending.task.run(stritems)
            } else {
                pending.task.poll(stritems)
            }
        }))
        .unwrap_or_else(|payload| Progress::Failed(EngineError::Panicked(panic_message(payload))));

        match progress {
            Progress::Pending => self.pending = Some(pending),
            Progress::Cancelled => {
                tracing::debug!(generation = pending.task.generation(), "stale match pass discarded");
            }
            Progress::Finished(ranked) => self.land(pending, ranked),
            Progress::Failed(err) => self.engine_failed(err),
        }
    }

    fn land(&mut self, pending: PendingMatch, ranked: Vec<usize>) {
        if pending.task.generation() != self.generation.current() || pending.epoch != self.epoch {
            tracing::debug!(generation = pending.task.generation(), "stale match result discarded");
            return;
        }
        let len = self.store.len();
        if let Some(&index) = ranked.iter().find(|&&index| index >= len) {
            self.engine_failed(EngineError::IndexOutOfRange { index, len });
            return;
        }

        tracing::debug!(
            generation = pending.task.generation(),
            matched = ranked.len(),
            elapsed = ?pending.task.elapsed(),
            "match pass finished"
        );
        if let Some(key) = cache_key(&pending.tokens) {
            self.cache.put(key, &ranked);
        }
        self.apply(ranked, pending.tokens, pending.epoch, pending.anchor);
    }

    fn apply(&mut self, ranked: Vec<usize>, tokens: Vec<String>, epoch: u64, anchor: Option<usize>) {
        self.current = anchor
            .and_then(|anchor| ranked.iter().position(|&index| index == anchor))
            .unwrap_or(0);
        self.ranked = ranked;
        self.ranked_tokens = tokens;
        self.ranked_epoch = Some(epoch);
    }

    fn engine_failed(&mut self, err: EngineError) {
        tracing::warn!(engine = self.engine.name(), %err, "match pass failed");
        self.errors.push(SessionError::Engine(err));
    }
}

impl<T> Drop for Session<'_, T> {
    fn drop(&mut self) {
        self.generation.deactivate();
    }
}

/// The prompt, when it determines the tokens. Multi-char tokens share
/// prompts with differently split queries that match differently.
fn cache_key(tokens: &[String]) -> Option<String> {
    tokens
        .iter()
        .all(|token| token.chars().count() == 1)
        .then(|| tokens.concat())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
