use std::sync::Arc;

use super::*;
use crate::lookup::Candidate;
use crate::placeholder::DEFAULT_INTERVAL;
use crate::test_support::StubLookup;

const SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 80,
    height: 24,
};

fn app_with_pool() -> App {
    let pool = vec![
        Candidate::new("d1", "AD4080 Data Sheet"),
        Candidate::new("d2", "AD4081 Data Sheet"),
    ];
    let source = CandidateSource::new(Arc::new(StubLookup::new().fallback(pool))).inline();
    App::new(
        Composer::new(source),
        PlaceholderCycler::new(vec!["Ask anything…".to_string()], DEFAULT_INTERVAL),
    )
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        handle_event(app, AppEvent::InputChar(ch), SCREEN);
    }
    app.poll_background();
}

#[test]
fn parses_interactive_launch_without_arguments() {
    let cli = Cli::try_parse_from(["docmention"]).expect("parse");
    assert_eq!(cli.command, None);
    assert_eq!(cli.theme, PathBuf::from("theme.toml"));
    assert_eq!(cli.catalog, None);
    assert_eq!(cli.sink, None);
}

#[test]
fn parses_search_with_global_catalog_flag() {
    let cli = Cli::try_parse_from(["docmention", "search", "AD40", "--catalog", "docs.json"])
        .expect("parse");
    assert_eq!(
        cli.command,
        Some(Command::Search {
            query: "AD40".to_string()
        })
    );
    assert_eq!(cli.catalog, Some(PathBuf::from("docs.json")));
}

#[test]
fn search_query_defaults_to_empty() {
    let cli = Cli::try_parse_from(["docmention", "search"]).expect("parse");
    assert_eq!(
        cli.command,
        Some(Command::Search {
            query: String::new()
        })
    );
}

#[test]
fn catalog_and_endpoint_conflict() {
    let result = Cli::try_parse_from([
        "docmention",
        "--catalog",
        "docs.json",
        "--endpoint",
        "http://localhost:9000/lookup",
    ]);
    assert!(result.is_err());
}

#[test]
fn decode_command_prints_segments_as_json() {
    let cli = Cli::try_parse_from(["docmention", "decode", "Check @[AD4081](x1) now"])
        .expect("parse");
    let command = cli.command.clone().expect("subcommand");
    let output = command_output(&cli, &command).expect("decode output");
    let value: serde_json::Value = serde_json::from_str(&output).expect("json");
    assert_eq!(
        value,
        serde_json::json!([
            {"kind": "plain", "text": "Check "},
            {"kind": "mention", "display_label": "AD4081", "identifier": "x1"},
            {"kind": "plain", "text": " now"}
        ])
    );
}

#[test]
fn search_command_reports_missing_catalog() {
    let missing = std::env::temp_dir().join("docmention-missing-catalog.json");
    let cli = Cli::try_parse_from([
        "docmention",
        "search",
        "x",
        "--catalog",
        missing.to_str().expect("utf8 path"),
    ])
    .expect("parse");
    let command = cli.command.clone().expect("subcommand");
    assert!(command_output(&cli, &command).is_err());
}

#[test]
fn typing_trigger_opens_list_and_arrows_move_selection() {
    let mut app = app_with_pool();
    type_text(&mut app, "@");
    assert!(app.composer().controller().is_open());
    assert_eq!(app.composer().controller().active_index(), Some(0));

    handle_event(&mut app, AppEvent::MoveDown, SCREEN);
    assert_eq!(app.composer().controller().active_index(), Some(1));
    handle_event(&mut app, AppEvent::MoveDown, SCREEN);
    assert_eq!(app.composer().controller().active_index(), Some(0));
    handle_event(&mut app, AppEvent::MoveUp, SCREEN);
    assert_eq!(app.composer().controller().active_index(), Some(1));
}

#[test]
fn enter_commits_while_open_and_submits_while_closed() {
    let mut app = app_with_pool();
    type_text(&mut app, "see @AD");
    handle_event(&mut app, AppEvent::Submit, SCREEN);
    assert!(!app.composer().controller().is_open());
    assert_eq!(app.composer().buffer(), "see @[AD4080 Data Sheet](d1) ");
    assert!(app.composer().messages().is_empty());

    handle_event(&mut app, AppEvent::Submit, SCREEN);
    assert_eq!(app.composer().messages().len(), 1);
    assert_eq!(
        app.composer().messages()[0].content,
        "see @[AD4080 Data Sheet](d1) "
    );
    assert_eq!(app.composer().buffer(), "");
}

#[test]
fn escape_closes_list_and_keeps_text() {
    let mut app = app_with_pool();
    type_text(&mut app, "@AD");
    handle_event(&mut app, AppEvent::Escape, SCREEN);
    assert!(!app.composer().controller().is_open());
    assert_eq!(app.composer().buffer(), "@AD");
}

#[test]
fn clicking_a_row_commits_that_candidate() {
    let mut app = app_with_pool();
    type_text(&mut app, "@");
    // Rows 15 and 16 hold the two candidates above the one-line input.
    handle_event(&mut app, AppEvent::MouseLeftClick(5, 16), SCREEN);
    assert!(!app.composer().controller().is_open());
    assert_eq!(app.composer().buffer(), "@[AD4081 Data Sheet](d2) ");
}

#[test]
fn hovering_moves_highlight_and_outside_click_closes() {
    let mut app = app_with_pool();
    type_text(&mut app, "@");
    handle_event(&mut app, AppEvent::MouseMoved(5, 16), SCREEN);
    assert_eq!(app.composer().controller().active_index(), Some(1));

    handle_event(&mut app, AppEvent::MouseLeftClick(5, 14), SCREEN);
    assert!(app.composer().controller().is_open());

    handle_event(&mut app, AppEvent::MouseLeftClick(5, 5), SCREEN);
    assert!(!app.composer().controller().is_open());
    assert!(!app.composer().controller().listens_for_outside_clicks());
    assert_eq!(app.composer().buffer(), "@");
}

#[test]
fn focus_loss_closes_list() {
    let mut app = app_with_pool();
    type_text(&mut app, "@");
    handle_event(&mut app, AppEvent::FocusLost, SCREEN);
    assert!(!app.composer().controller().is_open());
}

#[test]
fn arrows_move_caret_when_list_closed() {
    let mut app = app_with_pool();
    type_text(&mut app, "abc");
    handle_event(&mut app, AppEvent::CursorLeft, SCREEN);
    assert_eq!(app.composer().caret(), 2);
    handle_event(&mut app, AppEvent::CursorHome, SCREEN);
    assert_eq!(app.composer().caret(), 0);
    handle_event(&mut app, AppEvent::CursorEnd, SCREEN);
    assert_eq!(app.composer().caret(), 3);
    handle_event(&mut app, AppEvent::MoveUp, SCREEN);
    assert_eq!(app.composer().caret(), 3);
    handle_event(&mut app, AppEvent::Backspace, SCREEN);
    assert_eq!(app.composer().buffer(), "ab");
}

#[test]
fn clear_input_empties_buffer_and_closes_list() {
    let mut app = app_with_pool();
    type_text(&mut app, "hello @AD");
    assert!(app.composer().controller().is_open());
    handle_event(&mut app, AppEvent::ClearInput, SCREEN);
    assert_eq!(app.composer().buffer(), "");
    assert!(!app.composer().controller().is_open());
}

#[test]
fn quit_stops_the_loop() {
    let mut app = app_with_pool();
    handle_event(&mut app, AppEvent::Tick, SCREEN);
    assert_eq!(app.ticks, 1);
    handle_event(&mut app, AppEvent::Quit, SCREEN);
    assert!(!app.running);
}
