use sift_core::{EngineKind, KeyName, PickerConfig, Query, Stritems, ValidationError};
use sift_picker::{
    Action, ActionError, CustomAction, Input, Picker, Session, SessionError, SessionState,
};
use sift_search::{
    Budget, EngineError, FnEngine, MatchEngine, MatchPass, MatchRequest, Step,
};
use std::sync::Arc;

fn sample() -> Vec<String> {
    ["_abc", "a_bc", "ab_c", "abc_"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn key(name: &str) -> Input {
    Input::Key(KeyName::try_new(name.to_string()).unwrap())
}

fn type_text(session: &mut Session<'_, String>, text: &str) {
    for c in text.chars() {
        session.feed(Input::text(c));
    }
}

fn ranked_items(session: &Session<'_, String>) -> Vec<String> {
    session
        .ranked()
        .iter()
        .map(|&index| session.items().get(index).unwrap().clone())
        .collect()
}

fn async_config() -> PickerConfig {
    let mut config = PickerConfig::default();
    config.scheduler.sync_threshold = 0;
    config.scheduler.busy_delay_ms = 0;
    config
}

/// Yields a fixed number of times, then ranks the candidate whose index is
/// the number of query tokens.
struct Yielding {
    rounds: usize,
}

struct YieldingPass {
    remaining: usize,
    tokens: usize,
}

impl MatchEngine for Yielding {
    fn name(&self) -> &str {
        "yielding"
    }

    fn begin(&self, request: MatchRequest) -> Result<Box<dyn MatchPass>, EngineError> {
        Ok(Box::new(YieldingPass {
            remaining: self.rounds,
            tokens: request.tokens.len(),
        }))
    }
}

impl MatchPass for YieldingPass {
    fn resume(&mut self, _: &Stritems, budget: &mut Budget) -> Result<Step, EngineError> {
        if !budget.poke() {
            return Ok(Step::Cancelled);
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(Step::Yield);
        }
        Ok(Step::Done(vec![self.tokens]))
    }
}

mod matching {
    use super::*;

    #[test]
    fn test_empty_query_keeps_input_order() {
        let mut picker = Picker::default();
        let session = picker.start(sample());

        assert_eq!(session.ranked(), &[0, 1, 2, 3]);
        assert!(!session.is_matching());
    }

    #[test]
    fn test_search_modes() {
        let cases: &[(&str, &[&str])] = &[
            ("abc", &["abc_", "_abc", "a_bc", "ab_c"]),
            ("'abc", &["abc_", "_abc"]),
            ("^abc", &["abc_"]),
            ("abc$", &["_abc"]),
            ("*abc", &["abc_", "_abc", "a_bc", "ab_c"]),
        ];
        let mut picker = Picker::default();

        for (prompt, expected) in cases {
            let mut session = picker.start(sample());
            type_text(&mut session, prompt);

            assert_eq!(ranked_items(&session), *expected, "prompt {prompt:?}");
        }
    }

    #[test]
    fn test_grouped_tokens() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.set_query(vec!["ab".into(), " ".into(), "c".into()]);

        assert_eq!(ranked_items(&session), ["abc_", "_abc", "ab_c"]);
    }

    #[test]
    fn test_typed_parts_match_in_order() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "ab c");
        assert_eq!(ranked_items(&session), ["abc_", "_abc", "ab_c"]);

        session.feed(key("<C-u>"));
        type_text(&mut session, "c ab");
        assert!(ranked_items(&session).is_empty());
    }

    #[test]
    fn test_empty_anchors_match_everything() {
        let mut picker = Picker::default();
        let mut session = picker.start(vec!["".into(), "x".into(), "yz".into()]);

        type_text(&mut session, "^$");

        assert_eq!(ranked_items(&session), ["", "x", "yz"]);
    }

    #[test]
    fn test_start_with_initial_query() {
        let mut picker = Picker::default();
        let session = picker.start_with(sample(), Query::from_prompt("^abc"));

        assert_eq!(ranked_items(&session), ["abc_"]);
        assert_eq!(session.query().caret(), 4);
    }

    #[test]
    fn test_insert_in_the_middle_matches_like_typing() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "ac");
        session.feed(key("<Left>"));
        type_text(&mut session, "b");

        assert_eq!(session.query().prompt(), "abc");
        assert_eq!(ranked_items(&session), ["abc_", "_abc", "a_bc", "ab_c"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "xyz");

        assert!(session.ranked().is_empty());
        assert_eq!(session.current_index(), None);
        assert!(session.take_errors().is_empty());
    }

    #[test]
    fn test_smart_case() {
        let mut picker = Picker::default();
        let mut session = picker.start(vec!["Makefile".to_string(), "makefile".to_string()]);

        type_text(&mut session, "make");
        assert_eq!(session.ranked(), &[0, 1]);

        session.set_prompt("Make");
        assert_eq!(session.ranked(), &[0]);
    }

    #[test]
    fn test_nucleo_engine_from_config() {
        let mut config = PickerConfig::default();
        config.search.engine = EngineKind::Nucleo;
        let mut picker = Picker::new(config).unwrap();
        let mut session = picker.start(vec![
            "src/main.rs".to_string(),
            "README.md".to_string(),
            "src/lib.rs".to_string(),
        ]);

        type_text(&mut session, "lib");

        assert_eq!(session.engine_name(), "nucleo");
        assert_eq!(ranked_items(&session), ["src/lib.rs"]);
    }
}

mod deletion {
    use super::*;

    #[test]
    fn test_backspace_rematches_full_set() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "abcx");
        assert!(session.ranked().is_empty());

        session.feed(key("<BS>"));

        assert_eq!(ranked_items(&session), ["abc_", "_abc", "a_bc", "ab_c"]);
    }

    #[test]
    fn test_deleting_last_token_gives_superset() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "'abc");
        let before = session.ranked().to_vec();
        session.backspace();
        let after = session.ranked().to_vec();

        assert_eq!(session.query().prompt(), "'ab");
        assert!(before.iter().all(|index| after.contains(index)));
        assert_eq!(ranked_items(&session), ["ab_c", "abc_", "_abc"]);
    }

    #[test]
    fn test_delete_word_and_to_start() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "ab c");
        session.feed(key("<C-w>"));
        assert_eq!(session.query().prompt(), "ab ");

        session.feed(key("<C-u>"));
        assert!(session.query().is_empty());
        assert_eq!(session.ranked(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_delete_at_caret() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "^abc");
        session.feed(key("<Home>"));
        session.feed(key("<Del>"));

        assert_eq!(session.query().prompt(), "abc");
        assert_eq!(session.ranked().len(), 4);
    }

    #[test]
    fn test_clear_query() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "^abc");
        session.feed(key("<C-l>"));

        assert!(session.query().is_empty());
        assert_eq!(session.ranked(), &[0, 1, 2, 3]);
    }
}

mod cache {
    use super::*;

    fn corpus() -> Vec<String> {
        (0..300)
            .map(|i| format!("dir{}/file_{i:03}.{}", i % 7, ["rs", "md", "toml"][i % 3]))
            .collect()
    }

    fn replay(cache: bool) -> Vec<Vec<usize>> {
        let mut config = PickerConfig::default();
        config.search.cache = cache;
        let mut picker = Picker::new(config).unwrap();
        let mut session = picker.start(corpus());
        let mut steps = Vec::new();

        for input in ["d", "1", "f", "r"] {
            session.feed(Input::text(input));
            steps.push(session.ranked().to_vec());
        }
        for _ in 0..3 {
            session.feed(key("<BS>"));
            steps.push(session.ranked().to_vec());
        }
        for input in ["f", " ", "m", "d"] {
            session.feed(Input::text(input));
            steps.push(session.ranked().to_vec());
        }
        session.feed(key("<C-w>"));
        steps.push(session.ranked().to_vec());
        for input in ["t", "o"] {
            session.feed(Input::text(input));
            steps.push(session.ranked().to_vec());
        }
        steps
    }

    #[test]
    fn test_cache_does_not_change_results() {
        assert_eq!(replay(true), replay(false));
    }

    #[test]
    fn test_token_split_is_not_confused_by_cache() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.set_query(vec!["ab".to_string()]);
        assert_eq!(ranked_items(&session), ["ab_c", "abc_", "_abc"]);

        session.set_prompt("ab");
        assert_eq!(ranked_items(&session), ["ab_c", "abc_", "_abc", "a_bc"]);
    }

    #[test]
    fn test_retyping_hits_the_same_result() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        type_text(&mut session, "ab");
        let first = session.ranked().to_vec();
        session.backspace();
        type_text(&mut session, "b");

        assert_eq!(session.ranked(), first);
    }
}

mod scheduling {
    use super::*;

    #[test]
    fn test_large_space_runs_across_ticks() {
        let mut picker = Picker::new(async_config()).unwrap();
        let mut session = picker.start(sample());
        session.set_engine(Arc::new(Yielding { rounds: 2 }));
        session.settle();
        type_text(&mut session, "a");

        assert!(session.is_matching());
        assert!(session.is_busy());
        session.tick();
        session.tick();
        assert!(session.is_matching());
        session.tick();

        assert!(!session.is_matching());
        assert!(!session.is_busy());
        assert_eq!(session.ranked(), &[1]);
    }

    #[test]
    fn test_busy_flag_waits_for_delay() {
        let mut config = PickerConfig::default();
        config.scheduler.sync_threshold = 0;
        config.scheduler.busy_delay_ms = 60_000;
        let mut picker = Picker::new(config).unwrap();
        let mut session = picker.start(sample());
        session.settle();

        type_text(&mut session, "a");

        assert!(session.is_matching());
        assert!(!session.is_busy());
        assert!(!session.snapshot().busy);

        session.settle();

        assert!(!session.is_matching());
        assert!(!session.is_busy());
        assert_eq!(ranked_items(&session), ["a_bc", "ab_c", "abc_", "_abc"]);
    }

    #[test]
    fn test_superseded_pass_is_never_applied() {
        let mut picker = Picker::new(async_config()).unwrap();
        let mut session = picker.start(sample());
        session.set_engine(Arc::new(Yielding { rounds: 3 }));
        session.settle();
        let before = session.ranked().to_vec();
        let generation = session.generation();

        type_text(&mut session, "a");
        session.tick();
        type_text(&mut session, "b");
        assert!(session.generation() > generation);
        assert_eq!(session.ranked(), before);

        while session.is_matching() {
            session.tick();
        }

        assert_eq!(session.ranked(), &[2]);
    }

    #[test]
    fn test_navigation_does_not_rematch() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        let generation = session.generation();

        session.feed(key("<Down>"));
        session.feed(key("<Right>"));

        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        type_text(&mut session, "'abc");
        session.feed(key("<Tab>"));
        session.feed(key("<Left>"));

        let snapshot = session.snapshot();

        assert_eq!(snapshot.ranked, &[3, 0]);
        assert_eq!(snapshot.current_index(), Some(3));
        assert!(snapshot.is_marked(3));
        assert!(!snapshot.busy);
        assert_eq!(snapshot.tokens.concat(), "'abc");
        assert_eq!(snapshot.caret, 3);
        assert_eq!(snapshot.state, SessionState::Active);
    }
}

mod navigation {
    use super::*;

    #[test]
    fn test_next_and_prev_wrap() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.feed(key("<Up>"));
        assert_eq!(session.current(), 3);
        session.feed(key("<C-n>"));
        assert_eq!(session.current(), 0);
        session.dispatch(Action::Last);
        assert_eq!(session.current(), 3);
        session.dispatch(Action::First);
        assert_eq!(session.current(), 0);
    }

    #[test]
    fn test_navigation_on_empty_result() {
        let mut picker = Picker::<String>::default();
        let mut session = picker.start(Vec::new());

        session.next();
        session.prev();
        session.last();

        assert_eq!(session.current(), 0);
        assert_eq!(session.current_item(), None);
    }

    #[test]
    fn test_query_change_resets_cursor() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.next();
        session.next();
        type_text(&mut session, "a");

        assert_eq!(session.current(), 0);
    }

    #[test]
    fn test_out_of_range_positions_are_rejected() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        assert_eq!(
            session.select(4),
            Err(ValidationError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(
            session.set_caret(1),
            Err(ValidationError::CaretOutOfRange { caret: 1, len: 0 })
        );
        session.select(2).unwrap();
        assert_eq!(session.current_index(), Some(2));
    }
}

mod marks {
    use super::*;

    #[test]
    fn test_marks_survive_query_edits() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.next();
        session.toggle_mark();
        type_text(&mut session, "^abc");
        session.feed(key("<C-u>"));

        assert!(session.marked().contains(&1));
        assert_eq!(session.marked().len(), 1);
    }

    #[test]
    fn test_toggle_mark_all_flips_each_ranked() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        session.toggle_mark();

        type_text(&mut session, "'abc");
        session.feed(key("<C-a>"));

        assert_eq!(session.marked().iter().copied().collect::<Vec<_>>(), [3]);
    }

    #[test]
    fn test_toggle_mark_twice_unmarks() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.toggle_mark();
        session.toggle_mark();

        assert!(session.marked().is_empty());
    }

    #[test]
    fn test_clear_marks() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        session.feed(key("<C-a>"));
        assert_eq!(session.marked().len(), 4);

        session.clear_marks();

        assert!(session.marked().is_empty());
        assert_eq!(session.ranked().len(), 4);
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_confirm_returns_selection() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        session.toggle_mark();
        type_text(&mut session, "abc$");
        session.feed(key("<CR>"));

        assert_eq!(session.state(), SessionState::Stopped);
        let selection = session.finish().unwrap();
        assert_eq!(selection.current.as_deref(), Some("_abc"));
        assert_eq!(selection.marked, ["_abc"]);
    }

    #[test]
    fn test_cancel_returns_nothing() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.feed(key("<Esc>"));

        assert_eq!(session.state(), SessionState::Aborted);
        assert!(session.finish().is_none());
    }

    #[test]
    fn test_input_after_end_is_ignored() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.confirm();
        let generation = session.generation();
        type_text(&mut session, "abc");

        assert!(session.query().is_empty());
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn test_confirm_cancels_pending_pass() {
        let mut picker = Picker::new(async_config()).unwrap();
        let mut session = picker.start(sample());
        session.set_engine(Arc::new(Yielding { rounds: 5 }));

        session.confirm();
        session.tick();

        assert!(!session.is_matching());
    }

    #[test]
    fn test_session_can_restart_after_finish() {
        let mut picker = Picker::default();
        {
            let mut session = picker.start(sample());
            session.cancel();
        }
        let session = picker.start(vec!["again".to_string()]);

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.ranked(), &[0]);
    }
}

mod refine {
    use super::*;

    #[test]
    fn test_refine_materializes_ranked_candidates() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        type_text(&mut session, "'abc");
        session.toggle_mark();

        session.feed(key("<C-r>"));

        assert_eq!(session.items().iter().cloned().collect::<Vec<_>>(), ["abc_", "_abc"]);
        assert!(session.query().is_empty());
        assert!(session.marked().is_empty());
        assert_eq!(session.ranked(), &[0, 1]);

        type_text(&mut session, "^_");
        assert_eq!(ranked_items(&session), ["_abc"]);
    }

    #[test]
    fn test_refine_restores_configured_engine() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        session.set_engine(Arc::new(FnEngine::new("all", |_, request| {
            Ok(request.space.clone())
        })));
        assert_eq!(session.engine_name(), "all");

        session.refine();

        assert_eq!(session.engine_name(), "default");
    }
}

mod streaming {
    use super::*;

    #[test]
    fn test_extend_rematches_current_query() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        type_text(&mut session, "^abc");

        session.extend(vec!["abcdef".to_string(), "xyz".to_string()]);

        assert_eq!(ranked_items(&session), ["abc_", "abcdef"]);
    }

    #[test]
    fn test_extend_keeps_current_candidate() {
        let mut picker = Picker::default();
        let mut session =
            picker.start(vec!["f_o1".to_string(), "bar".to_string(), "f_o2".to_string()]);
        type_text(&mut session, "fo");
        session.next();
        assert_eq!(session.current_item().map(String::as_str), Some("f_o2"));

        session.extend(vec!["fo".to_string()]);

        assert_eq!(ranked_items(&session), ["fo", "f_o1", "f_o2"]);
        assert_eq!(session.current(), 2);
        assert_eq!(session.current_item().map(String::as_str), Some("f_o2"));
    }

    #[test]
    fn test_empty_batch_changes_nothing() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        let generation = session.generation();

        session.extend(Vec::new());

        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn test_source_failure_keeps_result() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        type_text(&mut session, "'abc");

        session.source_failed("fd exited with status 2");

        assert_eq!(session.ranked().len(), 2);
        assert_eq!(
            session.take_errors(),
            [SessionError::Source("fd exited with status 2".to_string())]
        );
        assert!(session.take_errors().is_empty());
    }
}

mod failures {
    use super::*;

    fn picky_engine() -> Arc<dyn MatchEngine> {
        Arc::new(FnEngine::new("picky", |_, request| {
            if request.prompt().contains('!') {
                Err(EngineError::Failed("bang".to_string()))
            } else {
                Ok(request.space.clone())
            }
        }))
    }

    #[test]
    fn test_engine_error_keeps_previous_result() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        session.set_engine(picky_engine());
        type_text(&mut session, "a");
        let before = session.ranked().to_vec();

        type_text(&mut session, "!");

        assert_eq!(session.ranked(), before);
        assert!(!session.is_busy());
        assert_eq!(
            session.take_errors(),
            [SessionError::Engine(EngineError::Failed("bang".to_string()))]
        );
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_engine_panic_is_contained() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        session.set_engine(Arc::new(FnEngine::new("panicky", |_, request| {
            if request.tokens.is_empty() {
                Ok(request.space.clone())
            } else {
                panic!("engine bug")
            }
        })));

        type_text(&mut session, "a");

        assert_eq!(session.ranked(), &[0, 1, 2, 3]);
        let errors = session.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SessionError::Engine(EngineError::Panicked(message)) if message == "engine bug"
        ));
    }

    #[test]
    fn test_out_of_range_result_is_rejected() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());

        session.set_engine(Arc::new(FnEngine::new("dangling", |_, _| Ok(vec![0, 9]))));

        assert_eq!(session.ranked(), &[0, 1, 2, 3]);
        assert_eq!(
            session.take_errors(),
            [SessionError::Engine(EngineError::IndexOutOfRange { index: 9, len: 4 })]
        );
    }
}

mod custom_actions {
    use super::*;

    #[test]
    fn test_custom_action_drives_session() {
        let mut picker = Picker::default();
        picker
            .keymap_mut()
            .bind_custom(
                "<C-y>",
                CustomAction::new("anchor", |session: &mut Session<'_, String>| {
                    session.set_prompt("^abc");
                    Ok(())
                }),
            )
            .unwrap();
        let mut session = picker.start(sample());

        session.feed(key("<C-y>"));

        assert_eq!(ranked_items(&session), ["abc_"]);
    }

    #[test]
    fn test_failing_custom_action_is_reported() {
        let mut picker = Picker::default();
        picker
            .keymap_mut()
            .bind_custom(
                "<C-o>",
                CustomAction::new("open", |_: &mut Session<'_, String>| {
                    Err(ActionError::new("no editor"))
                }),
            )
            .unwrap();
        let mut session = picker.start(sample());

        session.feed(key("<C-o>"));

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(
            session.take_errors(),
            [SessionError::Action(ActionError::new("no editor"))]
        );
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut picker = Picker::default();
        let mut session = picker.start(sample());
        let generation = session.generation();

        session.feed(key("<F5>"));

        assert_eq!(session.generation(), generation);
        assert_eq!(session.state(), SessionState::Active);
    }
}

mod config {
    use super::*;
    use sift_core::ConfigError;

    #[test]
    fn test_unknown_action_fails_at_construction() {
        let mut config = PickerConfig::default();
        config.keys.insert(
            KeyName::try_new("<C-x>".to_string()).unwrap(),
            "explode".to_string(),
        );

        let result = Picker::<String>::new(config);

        assert!(matches!(result, Err(ConfigError::UnknownAction { .. })));
    }

    #[test]
    fn test_invalid_scheduler_fails_at_construction() {
        let mut config = PickerConfig::default();
        config.scheduler.slice_ms = 0;

        let result = Picker::<String>::new(config);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unbinding_confirm() {
        let mut config = PickerConfig::default();
        config
            .keys
            .insert(KeyName::try_new("<CR>".to_string()).unwrap(), String::new());
        let mut picker = Picker::new(config).unwrap();
        let mut session = picker.start(sample());

        session.feed(key("<CR>"));

        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_loaded_config_drives_picker() {
        let dir = tempfile::tempdir().unwrap();
        let path = PickerConfig::path(dir.path());
        std::fs::write(
            &path,
            "[search]\ncache = false\n\n[keys]\n\"<C-j>\" = \"next\"\n",
        )
        .unwrap();

        let mut picker = Picker::new(PickerConfig::load(&path).unwrap()).unwrap();
        assert!(!picker.config().search.cache);
        let mut session = picker.start(sample());
        session.feed(key("<C-j>"));

        assert_eq!(session.current(), 1);
    }
}
