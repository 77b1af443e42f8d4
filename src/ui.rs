use std::time::Instant;

use chrono::Local;
use ratatui::prelude::*;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Clear, Padding, Paragraph};

use crate::app::App;
use crate::composer::RenderedMessage;
use crate::lookup::describe;
use crate::placeholder::{PlaceholderFrame, PlaceholderPhase};
use crate::render::{ChipMode, SpanKind, render_segments, to_span};
use crate::text_layout::{WrappedRuns, wrap_runs};
use crate::theme::Theme;

const MAX_INPUT_TEXT_LINES: u16 = 5;
const TEXT_PADDING: u16 = 1;
const STATUS_HEIGHT: u16 = 3;
const TITLE_BAR_HEIGHT: u16 = 3;
const AUTHOR_FG: Color = Color::Rgb(80, 190, 100);
const SEARCHING_FG: Color = Color::Rgb(255, 165, 0);
const STATUS_HELP_TEXT: &str =
    "Enter send | @ mention a document | Up/Down choose | Esc close list | PgUp/PgDn scroll | Ctrl+U clear | Ctrl+C quit";
const EMPTY_LOG_TEXT: &str = "No messages yet. Type @ to mention a document.";

struct ScreenAreas {
    title: Rect,
    messages: Rect,
    input: Rect,
    status: Rect,
}

struct PopupLayout {
    area: Rect,
    first: usize,
    rows: usize,
}

fn screen_areas(screen: Rect, app: &App) -> ScreenAreas {
    let [title, content, status] = Layout::vertical([
        Constraint::Length(TITLE_BAR_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(screen);
    let text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let input_text_lines = input_runs(app, text_width).line_count;
    let max_input_height = content.height.saturating_sub(1).max(1);
    let (input_height, _) = input_box_metrics(input_text_lines, 0, max_input_height);
    let [messages, input] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(input_height)]).areas(content);
    ScreenAreas {
        title,
        messages,
        input,
        status,
    }
}

pub fn input_text_width(screen: Rect) -> u16 {
    screen.width.saturating_sub(TEXT_PADDING * 2).max(1)
}

pub fn log_max_scroll(screen: Rect, app: &App) -> u16 {
    let areas = screen_areas(screen, app);
    let width = areas.messages.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let visible = areas.messages.height.saturating_sub(TEXT_PADDING * 2);
    let total = log_lines(app.composer().messages(), width, &Theme::default()).len() as u16;
    total.saturating_sub(visible)
}

/// Index of the suggestion row under `(x, y)`, if the list is open there.
pub fn suggestion_hit_test(screen: Rect, app: &App, x: u16, y: u16) -> Option<usize> {
    let popup = popup_layout(&screen_areas(screen, app), app)?;
    if !point_in_rect(popup.area, x, y) {
        return None;
    }
    let row_top = popup.area.y.saturating_add(TEXT_PADDING);
    let row = usize::from(y.checked_sub(row_top)?);
    (row < popup.rows).then_some(popup.first + row)
}

pub fn popup_contains(screen: Rect, app: &App, x: u16, y: u16) -> bool {
    popup_layout(&screen_areas(screen, app), app)
        .is_some_and(|popup| point_in_rect(popup.area, x, y))
}

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, now: Instant) {
    let areas = screen_areas(frame.area(), app);

    render_title_bar(frame, areas.title, app, theme);
    render_message_log(frame, areas.messages, app, theme);
    render_input(frame, areas.input, app, theme, now);
    if let Some(popup) = popup_layout(&areas, app) {
        render_suggestions(frame, &popup, app, theme);
    }

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.status_bg)),
        areas.status,
    );
    let status = Paragraph::new(status_line(app, theme))
        .style(Style::default().bg(theme.status_bg).fg(theme.muted_fg))
        .block(
            Block::default()
                .style(Style::default().bg(theme.status_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(status, areas.status);
}

fn render_title_bar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let count = app.composer().messages().len();
    let noun = if count == 1 { "message" } else { "messages" };
    let title = Line::from(vec![
        Span::styled(
            "Compose",
            Style::default()
                .fg(theme.active_fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(format!("({count} {noun})"), Style::default().fg(theme.muted_fg)),
    ]);
    frame.render_widget(
        Paragraph::new(title)
            .style(Style::default().bg(theme.status_bg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.status_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        area,
    );
}

fn render_message_log(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let width = area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let lines = log_lines(app.composer().messages(), width, theme);
    let visible = area.height.saturating_sub(TEXT_PADDING * 2);
    let max_scroll = (lines.len() as u16).saturating_sub(visible);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .scroll((app.log_scroll(max_scroll), 0))
            .style(Style::default().bg(theme.log_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.log_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        area,
    );
}

fn log_lines(messages: &[RenderedMessage], width: u16, theme: &Theme) -> Vec<Line<'static>> {
    if messages.is_empty() {
        return vec![Line::from(Span::styled(
            EMPTY_LOG_TEXT,
            Style::default().fg(theme.muted_fg),
        ))];
    }
    let mut out = Vec::new();
    for (idx, message) in messages.iter().enumerate() {
        let sent_at = message.timestamp.with_timezone(&Local).format("%H:%M:%S");
        out.push(Line::from(vec![
            Span::styled(
                "You",
                Style::default().fg(AUTHOR_FG).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(sent_at.to_string(), Style::default().fg(theme.muted_fg)),
        ]));

        let spans = render_segments(&message.content, ChipMode::Compact);
        let runs: Vec<(&str, SpanKind)> = spans.iter().map(|span| (span.text(), span.kind())).collect();
        out.extend(styled_lines(&wrap_runs(&runs, width), theme));

        if idx + 1 < messages.len() {
            out.push(Line::from(Span::styled(
                "─".repeat(width as usize),
                Style::default().fg(separator_color(theme)),
            )));
        }
    }
    out
}

fn input_runs(app: &App, width: u16) -> WrappedRuns<SpanKind> {
    let spans = render_segments(app.composer().buffer(), ChipMode::Overlay);
    let runs: Vec<(&str, SpanKind)> = spans.iter().map(|span| (span.text(), span.kind())).collect();
    wrap_runs(&runs, width)
}

fn render_input(frame: &mut Frame, area: Rect, app: &App, theme: &Theme, now: Instant) {
    let width = area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let wrapped = input_runs(app, width);
    let (caret_line, caret_col) = app.composer().caret_line_col(width);
    let max_input_height = area.height.max(1);
    let (_, input_scroll) = input_box_metrics(wrapped.line_count, caret_line, max_input_height);

    let text = match app.placeholder_frame(now) {
        Some(placeholder) => Text::from(placeholder_line(placeholder, theme)),
        None => Text::from(styled_lines(&wrapped, theme)),
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            )
            .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
            .scroll((input_scroll, 0)),
        area,
    );

    let inner = area.inner(Margin {
        horizontal: TEXT_PADDING,
        vertical: TEXT_PADDING,
    });
    if inner.width > 0 && inner.height > 0 {
        let visible_caret_line = caret_line.saturating_sub(input_scroll);
        if visible_caret_line < inner.height {
            frame.set_cursor_position((
                inner
                    .x
                    .saturating_add(caret_col.min(inner.width.saturating_sub(1))),
                inner.y.saturating_add(visible_caret_line),
            ));
        }
    }
}

fn placeholder_line(placeholder: PlaceholderFrame<'_>, theme: &Theme) -> Line<'static> {
    let style = match placeholder.phase {
        PlaceholderPhase::Steady => Style::default().fg(theme.muted_fg),
        PlaceholderPhase::FadingOut | PlaceholderPhase::Arriving => Style::default()
            .fg(theme.muted_fg)
            .add_modifier(Modifier::DIM),
    };
    Line::from(Span::styled(placeholder.text.to_string(), style))
}

fn styled_lines(wrapped: &WrappedRuns<SpanKind>, theme: &Theme) -> Vec<Line<'static>> {
    wrapped
        .lines
        .iter()
        .map(|line| {
            Line::from(
                line.iter()
                    .map(|(text, kind)| to_span(text.clone(), *kind, theme))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn popup_layout(areas: &ScreenAreas, app: &App) -> Option<PopupLayout> {
    let session = app.composer().controller().session()?;
    let messages = areas.messages;
    let input = areas.input;
    if messages.height <= TEXT_PADDING * 2 || input.width == 0 {
        return None;
    }
    let max_rows = usize::from(messages.height.saturating_sub(TEXT_PADDING * 2));
    let rows = session.candidates().len().min(max_rows);
    let height = (rows as u16).saturating_add(TEXT_PADDING * 2);
    let y = input.y.saturating_sub(height).max(messages.y);
    let first = session
        .active_index()
        .saturating_sub(rows.saturating_sub(1));
    Some(PopupLayout {
        area: Rect::new(input.x, y, input.width, height),
        first,
        rows,
    })
}

fn render_suggestions(frame: &mut Frame, popup: &PopupLayout, app: &App, theme: &Theme) {
    let Some(session) = app.composer().controller().session() else {
        return;
    };
    let mut lines = Vec::with_capacity(popup.rows);
    for (offset, candidate) in session
        .candidates()
        .iter()
        .skip(popup.first)
        .take(popup.rows)
        .enumerate()
    {
        let active = popup.first + offset == session.active_index();
        let (marker, label_style, row_style) = if active {
            (
                ">",
                Style::default()
                    .fg(theme.active_fg)
                    .add_modifier(Modifier::BOLD),
                Style::default().bg(theme.active_bg),
            )
        } else {
            (" ", Style::default().fg(theme.text_fg), Style::default())
        };
        let mut spans = vec![
            Span::styled(marker, Style::default().fg(theme.muted_fg)),
            Span::raw(" "),
            Span::styled(candidate.display_label.clone(), label_style),
        ];
        if let Some(description) = candidate.description.as_deref() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                description.to_string(),
                Style::default().fg(theme.muted_fg),
            ));
        }
        lines.push(Line::from(spans).style(row_style));
    }

    frame.render_widget(Clear, popup.area);
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.popup_bg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.popup_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        popup.area,
    );
}

fn status_line(app: &App, theme: &Theme) -> Line<'static> {
    let controller = app.composer().controller();
    if let Some(query) = controller.pending_query() {
        return Line::from(Span::styled(
            format!("Searching \"{query}\" {}", searching_dots(app.ticks)),
            Style::default().fg(SEARCHING_FG),
        ));
    }
    if controller.is_open()
        && let Some(document) = app.preview()
    {
        let mut spans = vec![Span::styled(
            document.title.clone(),
            Style::default()
                .fg(theme.active_fg)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(summary) = describe(&document.content) {
            spans.push(Span::raw(": "));
            spans.push(Span::raw(summary));
        }
        return Line::from(spans);
    }
    if let Some(session) = controller.session() {
        let count = session.candidates().len();
        let noun = if count == 1 { "match" } else { "matches" };
        return Line::from(format!("{count} {noun} for @{}", session.query()));
    }
    Line::from(STATUS_HELP_TEXT)
}

fn searching_dots(ticks: u64) -> &'static str {
    const FRAMES: [&str; 6] = ["[   ]", "[.  ]", "[.. ]", "[...]", "[ ..]", "[  .]"];
    FRAMES[((ticks / 2) as usize) % FRAMES.len()]
}

fn separator_color(theme: &Theme) -> Color {
    match theme.log_bg {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(12),
            g.saturating_add(12),
            b.saturating_add(12),
        ),
        _ => theme.muted_fg,
    }
}

fn input_box_metrics(input_text_lines: u16, cursor_line: u16, max_input_height: u16) -> (u16, u16) {
    let capped_text_lines = input_text_lines.clamp(1, MAX_INPUT_TEXT_LINES);
    let desired_height = capped_text_lines.saturating_add(TEXT_PADDING * 2);
    let input_height = desired_height.clamp(1, max_input_height.max(1));
    let visible_text_lines = input_height.saturating_sub(TEXT_PADDING * 2).max(1);
    let max_scroll = input_text_lines.saturating_sub(visible_text_lines);
    let middle_line = visible_text_lines / 2;
    let input_scroll = cursor_line.saturating_sub(middle_line).min(max_scroll);
    (input_height, input_scroll)
}

fn point_in_rect(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

#[cfg(test)]
#[path = "../tests/unit/ui_tests.rs"]
mod tests;
