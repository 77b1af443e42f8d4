use std::sync::Arc;

use super::*;
use crate::candidate_source::CandidateSource;
use crate::composer::Composer;
use crate::lookup::{Candidate, Document};
use crate::placeholder::{DEFAULT_INTERVAL, PlaceholderCycler};
use crate::test_support::{StubLookup, candidates};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

fn app_with(stub: StubLookup) -> App {
    let composer = Composer::new(CandidateSource::new(Arc::new(stub)).inline());
    App::new(
        composer,
        PlaceholderCycler::new(
            vec!["Ask anything…".to_string(), "@ to add documents".to_string()],
            DEFAULT_INTERVAL,
        ),
    )
}

fn render_buffer(app: &App, width: u16, height: u16) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("test terminal should initialize");
    let theme = Theme::default();
    terminal
        .draw(|frame| render(frame, app, &theme, Instant::now()))
        .expect("render should succeed");
    terminal.backend().buffer().clone()
}

fn render_text(app: &App, width: u16, height: u16) -> String {
    buffer_to_string(&render_buffer(app, width, height))
}

fn buffer_to_string(buffer: &Buffer) -> String {
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn open_two_candidates() -> App {
    let pool = vec![
        Candidate::new("d1", "AD4080 Data Sheet").with_description("20-Bit SAR ADC"),
        Candidate::new("d2", "AD4081 Data Sheet"),
    ];
    let mut app = app_with(StubLookup::new().fallback(pool));
    app.composer_mut().on_edit("@");
    app.poll_background();
    app
}

#[test]
fn render_shows_title_placeholder_and_help_text() {
    let app = app_with(StubLookup::new());
    let text = render_text(&app, 120, 20);
    assert!(text.contains("Compose"));
    assert!(text.contains("(0 messages)"));
    assert!(text.contains("Ask anything…"));
    assert!(text.contains("No messages yet"));
    assert!(text.contains("Ctrl+C quit"));
}

#[test]
fn typed_text_replaces_placeholder() {
    let mut app = app_with(StubLookup::new());
    app.composer_mut().on_edit("hello there");
    let text = render_text(&app, 80, 20);
    assert!(text.contains("hello there"));
    assert!(!text.contains("Ask anything"));
}

#[test]
fn input_shows_raw_token_as_chip() {
    let mut app = app_with(StubLookup::new());
    app.composer_mut().on_edit("hi @[Bob](u1)");
    let buffer = render_buffer(&app, 80, 20);
    let text = buffer_to_string(&buffer);
    assert!(text.contains("hi @[Bob](u1)"));

    // 80x20: status takes rows 17..20, the one-line input sits on rows 14..17.
    let theme = Theme::default();
    assert_eq!(buffer[(4, 15)].symbol(), "@");
    assert_eq!(buffer[(4, 15)].style().bg, Some(theme.chip_bg));
    assert_eq!(buffer[(1, 15)].style().bg, Some(theme.input_bg));
}

#[test]
fn message_log_shows_compact_chips_and_author() {
    let mut app = app_with(StubLookup::new());
    app.composer_mut()
        .on_edit("See @[AD4081 Data Sheet (Rev. 0)](x1) first");
    assert!(app.submit());
    app.composer_mut().on_edit("second");
    assert!(app.submit());

    let text = render_text(&app, 80, 24);
    assert!(text.contains("(2 messages)"));
    assert!(text.contains("You"));
    assert!(text.contains("See @AD4081 Data Sheet (Rev. 0) first"));
    assert!(!text.contains("](x1)"));
    assert!(text.contains("second"));
    assert!(text.contains("───"));
    assert!(!text.contains("No messages yet"));
}

#[test]
fn open_list_renders_rows_with_active_marker() {
    let app = open_two_candidates();
    let text = render_text(&app, 80, 24);
    assert!(text.contains("> AD4080 Data Sheet  20-Bit SAR ADC"));
    assert!(text.contains("  AD4081 Data Sheet"));
}

#[test]
fn active_row_uses_active_background() {
    let app = open_two_candidates();
    let buffer = render_buffer(&app, 80, 24);
    let theme = Theme::default();
    assert_eq!(buffer[(3, 15)].style().bg, Some(theme.active_bg));
    assert_eq!(buffer[(3, 16)].style().bg, Some(theme.popup_bg));
}

#[test]
fn hit_test_maps_rows_to_candidate_indices() {
    let app = open_two_candidates();
    let screen = Rect::new(0, 0, 80, 24);
    // Popup occupies rows 14..18 directly above the input; rows 15 and 16 hold candidates.
    assert_eq!(suggestion_hit_test(screen, &app, 5, 15), Some(0));
    assert_eq!(suggestion_hit_test(screen, &app, 5, 16), Some(1));
    assert_eq!(suggestion_hit_test(screen, &app, 5, 14), None);
    assert_eq!(suggestion_hit_test(screen, &app, 5, 5), None);
    assert!(popup_contains(screen, &app, 5, 14));
    assert!(!popup_contains(screen, &app, 5, 19));
}

#[test]
fn hit_test_is_empty_when_list_closed() {
    let app = app_with(StubLookup::new());
    let screen = Rect::new(0, 0, 80, 24);
    assert_eq!(suggestion_hit_test(screen, &app, 5, 15), None);
    assert!(!popup_contains(screen, &app, 5, 15));
}

#[test]
fn long_lists_scroll_to_keep_active_row_visible() {
    let pool = candidates(&[
        ("d1", "Doc one"),
        ("d2", "Doc two"),
        ("d3", "Doc three"),
        ("d4", "Doc four"),
    ]);
    let mut app = app_with(StubLookup::new().fallback(pool));
    app.composer_mut().on_edit("@");
    app.poll_background();
    app.composer_mut().hover_candidate(3);

    // 12 rows leave a three-row log, so the popup has room for one candidate.
    let text = render_text(&app, 60, 12);
    assert!(text.contains("> Doc four"));
    assert!(!text.contains("Doc one"));
}

#[test]
fn status_shows_preview_of_highlighted_document() {
    let stub = StubLookup::new()
        .fallback(candidates(&[("d1", "AD4080")]))
        .document(Document {
            id: "d1".to_string(),
            title: "AD4080".to_string(),
            content: "20-Bit,   40 MSPS SAR ADC".to_string(),
        });
    let mut app = app_with(stub);
    app.composer_mut().on_edit("@");
    app.poll_background();
    let text = render_text(&app, 100, 24);
    assert!(text.contains("AD4080: 20-Bit, 40 MSPS SAR ADC"));
    assert!(!text.contains("Ctrl+C quit"));
}

#[test]
fn log_max_scroll_grows_with_messages() {
    let mut app = app_with(StubLookup::new());
    let screen = Rect::new(0, 0, 60, 14);
    assert_eq!(log_max_scroll(screen, &app), 0);
    for idx in 0..6 {
        app.composer_mut().on_edit(format!("message {idx}"));
        app.submit();
    }
    assert!(log_max_scroll(screen, &app) > 0);
}

#[test]
fn tiny_terminal_renders_without_panicking() {
    let app = open_two_candidates();
    let _ = render_text(&app, 8, 4);
    let _ = render_text(&app, 1, 1);
}

#[test]
fn input_text_width_excludes_padding() {
    assert_eq!(input_text_width(Rect::new(0, 0, 80, 24)), 78);
    assert_eq!(input_text_width(Rect::new(0, 0, 1, 24)), 1);
}
