use super::*;
use crate::test_support::candidates;
use crate::trigger::detect;

fn resolved(request: &QueryRequest, pool: &[(&str, &str)]) -> ResolvedQuery {
    ResolvedQuery {
        seq: request.seq,
        query: request.query.clone(),
        candidates: candidates(pool),
    }
}

fn open_with(pool: &[(&str, &str)]) -> SuggestionController {
    let mut controller = SuggestionController::new();
    let request = controller
        .on_detection(&detect("@a", None), true)
        .expect("edit with trigger issues a query");
    assert!(controller.apply(resolved(&request, pool)));
    controller
}

#[test]
fn starts_closed() {
    let controller = SuggestionController::new();
    assert!(!controller.is_open());
    assert!(controller.candidates().is_empty());
    assert_eq!(controller.active_index(), None);
    assert_eq!(controller.listeners().active(), 0);
}

#[test]
fn inactive_detection_issues_nothing() {
    let mut controller = SuggestionController::new();
    assert_eq!(controller.on_detection(&detect("hello", None), true), None);
    assert!(!controller.is_open());
}

#[test]
fn results_open_session_at_first_index() {
    let controller = open_with(&[("x1", "AD4081 Data Sheet (Rev. 0)")]);
    assert!(controller.is_open());
    assert_eq!(controller.active_index(), Some(0));
    assert_eq!(controller.session().map(SuggestionSession::query), Some("a"));
    assert_eq!(controller.listeners().active(), 1);
}

#[test]
fn empty_results_keep_session_closed() {
    let mut controller = SuggestionController::new();
    let request = controller
        .on_detection(&detect("@zz", None), true)
        .expect("query");
    assert!(controller.apply(resolved(&request, &[])));
    assert!(!controller.is_open());
    assert_eq!(controller.listeners().active(), 0);
}

#[test]
fn caret_move_never_starts_a_composition() {
    let mut controller = SuggestionController::new();
    assert_eq!(controller.on_detection(&detect("@a", None), false), None);
}

#[test]
fn unchanged_query_is_not_reissued() {
    let mut controller = open_with(&[("1", "a")]);
    assert_eq!(controller.on_detection(&detect("x @a", None), true), None);
    assert!(controller.is_open());
}

#[test]
fn down_wraps_from_last_to_first() {
    let mut controller = open_with(&[("1", "a"), ("2", "b"), ("3", "c")]);
    assert_eq!(controller.handle_key(SuggestionKey::Down), KeyResult::Consumed);
    assert_eq!(controller.handle_key(SuggestionKey::Down), KeyResult::Consumed);
    assert_eq!(controller.active_index(), Some(2));
    controller.handle_key(SuggestionKey::Down);
    assert_eq!(controller.active_index(), Some(0));
}

#[test]
fn up_wraps_from_first_to_last() {
    let mut controller = open_with(&[("1", "a"), ("2", "b"), ("3", "c")]);
    assert_eq!(controller.handle_key(SuggestionKey::Up), KeyResult::Consumed);
    assert_eq!(controller.active_index(), Some(2));
}

#[test]
fn single_candidate_navigation_stays_put() {
    let mut controller = open_with(&[("1", "a")]);
    controller.handle_key(SuggestionKey::Up);
    assert_eq!(controller.active_index(), Some(0));
    controller.handle_key(SuggestionKey::Down);
    assert_eq!(controller.active_index(), Some(0));
}

#[test]
fn enter_commits_active_candidate_and_closes() {
    let mut controller = open_with(&[("1", "a"), ("2", "b")]);
    controller.handle_key(SuggestionKey::Down);
    assert_eq!(
        controller.handle_key(SuggestionKey::Enter),
        KeyResult::Commit(Candidate::new("2", "b"))
    );
    assert!(!controller.is_open());
    assert_eq!(controller.listeners().active(), 0);
}

#[test]
fn escape_closes_without_commit() {
    let mut controller = open_with(&[("1", "a")]);
    assert_eq!(controller.handle_key(SuggestionKey::Escape), KeyResult::Consumed);
    assert!(!controller.is_open());
    assert_eq!(controller.listeners().active(), 0);
}

#[test]
fn keys_are_ignored_while_closed() {
    let mut controller = SuggestionController::new();
    for key in [
        SuggestionKey::Up,
        SuggestionKey::Down,
        SuggestionKey::Enter,
        SuggestionKey::Escape,
    ] {
        assert_eq!(controller.handle_key(key), KeyResult::Ignored);
    }
}

#[test]
fn hover_moves_highlight_without_closing() {
    let mut controller = open_with(&[("1", "a"), ("2", "b"), ("3", "c")]);
    controller.hover(2);
    assert_eq!(controller.active_index(), Some(2));
    controller.hover(9);
    assert_eq!(controller.active_index(), Some(2));
    assert!(controller.is_open());
}

#[test]
fn click_commits_that_row() {
    let mut controller = open_with(&[("1", "a"), ("2", "b")]);
    assert_eq!(controller.click(1), Some(Candidate::new("2", "b")));
    assert!(!controller.is_open());
    assert_eq!(controller.click(0), None);
}

#[test]
fn inactive_detection_closes_open_session() {
    let mut controller = open_with(&[("1", "a")]);
    controller.on_detection(&detect("no trigger", None), false);
    assert!(!controller.is_open());
    assert_eq!(controller.listeners().active(), 0);
}

#[test]
fn stale_answer_never_overwrites_fresher_query() {
    let mut controller = SuggestionController::new();
    let first = controller
        .on_detection(&detect("@A", None), true)
        .expect("first query");
    let second = controller
        .on_detection(&detect("@AD", None), true)
        .expect("second query");
    assert!(second.seq > first.seq);

    // the fresher answer lands first, the stale one afterwards
    assert!(controller.apply(resolved(&second, &[("x1", "AD4081")])));
    assert!(!controller.apply(resolved(&first, &[("z", "Anything")])));
    assert_eq!(controller.candidates(), candidates(&[("x1", "AD4081")]).as_slice());
    assert_eq!(controller.session().map(SuggestionSession::query), Some("AD"));
}

#[test]
fn stale_answer_arriving_first_is_discarded() {
    let mut controller = SuggestionController::new();
    let first = controller
        .on_detection(&detect("@A", None), true)
        .expect("first query");
    let second = controller
        .on_detection(&detect("@AD", None), true)
        .expect("second query");
    assert!(!controller.apply(resolved(&first, &[("z", "Anything")])));
    assert!(!controller.is_open());
    assert_eq!(controller.pending_query(), Some("AD"));
    assert!(controller.apply(resolved(&second, &[("x1", "AD4081")])));
    assert!(controller.is_open());
}

#[test]
fn late_answer_after_close_is_discarded() {
    let mut controller = SuggestionController::new();
    let request = controller
        .on_detection(&detect("@A", None), true)
        .expect("query");
    controller.close(CloseReason::Blur);
    assert!(!controller.apply(resolved(&request, &[("1", "a")])));
    assert!(!controller.is_open());
}

#[test]
fn requery_keeps_previous_list_until_answer() {
    let mut controller = open_with(&[("1", "a"), ("2", "ab")]);
    controller.handle_key(SuggestionKey::Down);
    let request = controller
        .on_detection(&detect("@ab", None), true)
        .expect("requery");
    assert!(controller.is_open());
    assert_eq!(controller.candidates().len(), 2);
    assert!(controller.apply(resolved(&request, &[("2", "ab")])));
    assert_eq!(controller.active_index(), Some(0));
    assert_eq!(controller.listeners().active(), 1);
}

#[test]
fn outside_clicks_are_heard_only_while_open() {
    let mut controller = SuggestionController::new();
    assert!(!controller.listens_for_outside_clicks());

    let request = controller
        .on_detection(&detect("@a", None), true)
        .expect("query");
    controller.apply(resolved(&request, &[("1", "a")]));
    assert!(controller.listens_for_outside_clicks());

    controller.close(CloseReason::OutsideClick);
    assert!(!controller.listens_for_outside_clicks());
}

#[test]
fn dropping_controller_detaches_listener() {
    let registry = ListenerRegistry::new();
    {
        let mut controller = SuggestionController::with_listeners(registry.clone());
        let request = controller
            .on_detection(&detect("@a", None), true)
            .expect("query");
        controller.apply(resolved(&request, &[("1", "a")]));
        assert_eq!(registry.active(), 1);
    }
    assert_eq!(registry.active(), 0);
}

#[test]
fn every_close_reason_detaches_listener() {
    for reason in [
        CloseReason::Inactive,
        CloseReason::Escape,
        CloseReason::Committed,
        CloseReason::OutsideClick,
        CloseReason::Blur,
        CloseReason::Submitted,
    ] {
        let mut controller = open_with(&[("1", "a")]);
        controller.close(reason);
        assert_eq!(controller.listeners().active(), 0, "{reason:?}");
    }
}
