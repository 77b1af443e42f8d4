//! Inline mention tokens: `@[display label](identifier)`.
//!
//! The composed buffer is plain text; mentions live inside it as tokens.
//! Decoding is total: anything that is not a well-formed token is plain text.

use std::ops::Range;

use serde::Serialize;

use crate::error::TokenError;
use crate::lookup::Candidate;

pub const TRIGGER: char = '@';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Plain {
        text: String,
    },
    Mention {
        display_label: String,
        identifier: String,
    },
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mention(display_label: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::Mention {
            display_label: display_label.into(),
            identifier: identifier.into(),
        }
    }
}

/// A well-formed token found in a buffer; `range` is in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'a> {
    pub range: Range<usize>,
    pub display_label: &'a str,
    pub identifier: &'a str,
}

pub fn encode(candidate: &Candidate) -> Result<String, TokenError> {
    encode_parts(&candidate.display_label, &candidate.identifier)
}

pub fn encode_parts(display_label: &str, identifier: &str) -> Result<String, TokenError> {
    validate(display_label, identifier)?;
    Ok(format!("{TRIGGER}[{display_label}]({identifier})"))
}

/// Checks that a label/identifier pair survives an encode/decode trip.
pub fn validate(display_label: &str, identifier: &str) -> Result<(), TokenError> {
    if display_label.is_empty() {
        return Err(TokenError::EmptyLabel);
    }
    if display_label.contains(']') {
        return Err(TokenError::LabelContainsBracket {
            label: display_label.to_string(),
        });
    }
    if identifier.is_empty() {
        return Err(TokenError::EmptyIdentifier);
    }
    if identifier.contains(')') {
        return Err(TokenError::IdentifierContainsParen {
            identifier: identifier.to_string(),
        });
    }
    Ok(())
}

/// Leftmost, non-overlapping token matches in `text`.
pub fn scan(text: &str) -> Vec<TokenMatch<'_>> {
    let bytes = text.as_bytes();
    let mut matches = Vec::new();
    let mut index = 0usize;
    while index < bytes.len() {
        if bytes[index] == b'@'
            && let Some(found) = parse_token_at(text, index)
        {
            index = found.range.end;
            matches.push(found);
            continue;
        }
        index += 1;
    }
    matches
}

/// Parses a token starting exactly at byte `start`.
fn parse_token_at(text: &str, start: usize) -> Option<TokenMatch<'_>> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'@') || bytes.get(start + 1) != Some(&b'[') {
        return None;
    }
    let label_start = start + 2;
    let label_end = label_start + text.get(label_start..)?.find(']')?;
    if label_end == label_start || bytes.get(label_end + 1) != Some(&b'(') {
        return None;
    }
    let id_start = label_end + 2;
    let id_end = id_start + text.get(id_start..)?.find(')')?;
    if id_end == id_start {
        return None;
    }
    Some(TokenMatch {
        range: start..id_end + 1,
        display_label: &text[label_start..label_end],
        identifier: &text[id_start..id_end],
    })
}

pub fn decode(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0usize;
    for found in scan(text) {
        if found.range.start > last {
            segments.push(Segment::plain(&text[last..found.range.start]));
        }
        segments.push(Segment::mention(found.display_label, found.identifier));
        last = found.range.end;
    }
    if last < text.len() {
        segments.push(Segment::plain(&text[last..]));
    }
    segments
}

/// The mention segments of `text`, in order.
pub fn mentions(text: &str) -> Vec<Segment> {
    scan(text)
        .into_iter()
        .map(|found| Segment::mention(found.display_label, found.identifier))
        .collect()
}

/// Replaces `buffer[trigger_start..caret_end]` with `token` plus a trailing
/// space. Returns the new buffer and the byte offset just after the space.
pub fn splice(buffer: &str, trigger_start: usize, caret_end: usize, token: &str) -> (String, usize) {
    let start = floor_char_boundary(buffer, trigger_start.min(buffer.len()));
    let end = floor_char_boundary(buffer, caret_end.clamp(start, buffer.len()));
    let mut out = String::with_capacity(buffer.len() + token.len() + 1);
    out.push_str(&buffer[..start]);
    out.push_str(token);
    out.push(' ');
    let caret = out.len();
    out.push_str(&buffer[end..]);
    (out, caret)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
