use serde::Deserialize;

use crate::token_codec::{self, TRIGGER};

/// Which `@` counts as the live trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerScope {
    /// Last `@` before the caret.
    #[default]
    Caret,
    /// Last `@` in the whole buffer; the query runs to the end of the buffer.
    BufferEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Inactive,
    /// Offsets are bytes into the buffer. `trigger_start` points at the `@`.
    Active {
        query: String,
        trigger_start: usize,
        query_end: usize,
    },
}

/// Caret-relative detection. `caret` is a byte offset; `None` means the end.
pub fn detect(buffer: &str, caret: Option<usize>) -> Trigger {
    let mut end = caret.unwrap_or(buffer.len()).min(buffer.len());
    while end > 0 && !buffer.is_char_boundary(end) {
        end -= 1;
    }

    // `@`s belonging to tokens that are already complete never re-trigger.
    let settled: Vec<_> = token_codec::scan(buffer)
        .into_iter()
        .map(|found| found.range)
        .filter(|range| range.end <= end)
        .collect();

    let mut search_end = end;
    while let Some(at) = buffer[..search_end].rfind(TRIGGER) {
        if let Some(range) = settled.iter().find(|range| range.contains(&at)) {
            search_end = range.start;
            continue;
        }
        return Trigger::Active {
            query: buffer[at + TRIGGER.len_utf8()..end].to_string(),
            trigger_start: at,
            query_end: end,
        };
    }
    Trigger::Inactive
}

pub fn detect_with_scope(buffer: &str, caret: Option<usize>, scope: TriggerScope) -> Trigger {
    match scope {
        TriggerScope::Caret => detect(buffer, caret),
        TriggerScope::BufferEnd => detect(buffer, None),
    }
}
