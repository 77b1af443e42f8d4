//! Buffer → display spans. Mentions become chips; everything else stays plain.

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::theme::Theme;
use crate::token_codec::{self, TRIGGER};

/// How a chip presents its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipMode {
    /// Raw token text, one column per buffer character. Used for the live
    /// input so caret positions in the raw buffer still line up.
    Overlay,
    /// `@label`, for finished messages.
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Plain,
    Chip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedSpan {
    Plain(String),
    Chip(String),
}

impl RenderedSpan {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Chip(text) => text,
        }
    }

    pub fn kind(&self) -> SpanKind {
        match self {
            Self::Plain(_) => SpanKind::Plain,
            Self::Chip(_) => SpanKind::Chip,
        }
    }
}

pub fn render_segments(buffer: &str, mode: ChipMode) -> Vec<RenderedSpan> {
    let mut spans = Vec::new();
    let mut last = 0usize;
    for found in token_codec::scan(buffer) {
        if found.range.start > last {
            spans.push(RenderedSpan::Plain(buffer[last..found.range.start].to_string()));
        }
        let text = match mode {
            ChipMode::Overlay => buffer[found.range.clone()].to_string(),
            ChipMode::Compact => format!("{TRIGGER}{}", found.display_label),
        };
        spans.push(RenderedSpan::Chip(text));
        last = found.range.end;
    }
    if last < buffer.len() {
        spans.push(RenderedSpan::Plain(buffer[last..].to_string()));
    }
    spans
}

/// The one place span kinds turn into terminal styles.
fn kind_style(kind: SpanKind, theme: &Theme) -> Style {
    match kind {
        SpanKind::Plain => Style::default().fg(theme.text_fg),
        SpanKind::Chip => Style::default()
            .fg(theme.chip_fg)
            .bg(theme.chip_bg)
            .add_modifier(Modifier::BOLD),
    }
}

pub fn to_span(text: impl Into<String>, kind: SpanKind, theme: &Theme) -> Span<'static> {
    Span::styled(text.into(), kind_style(kind, theme))
}
