#[derive(Debug, Clone)]
pub struct WrappedText {
    pub rendered: String,
    pub positions: Vec<(u16, u16)>,
    pub line_count: u16,
}

pub fn wrap_word_with_positions(text: &str, width: u16) -> WrappedText {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut rendered = String::new();
    let mut positions = Vec::with_capacity(chars.len() + 1);
    let mut line = 0u16;
    let mut col = 0u16;

    positions.push((line, col));

    for (idx, ch) in chars.iter().copied().enumerate() {
        if ch == '\n' {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
            positions.push((line, col));
            continue;
        }

        if should_wrap_before_word(&chars, idx, col, width) {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        } else if col >= width {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        }

        rendered.push(ch);
        col = col.saturating_add(1);
        if col >= width {
            rendered.push('\n');
            line = line.saturating_add(1);
            col = 0;
        }

        positions.push((line, col));
    }

    let line_count = positions
        .iter()
        .map(|(l, _)| *l)
        .max()
        .unwrap_or(0)
        .saturating_add(1);

    WrappedText {
        rendered,
        positions,
        line_count,
    }
}

/// Word-wrapped runs of tagged text; each line is a list of `(text, tag)`
/// runs with adjacent equal tags merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedRuns<K> {
    pub lines: Vec<Vec<(String, K)>>,
    pub line_count: u16,
}

/// Wraps the concatenation of `runs` exactly like [`wrap_word_with_positions`]
/// and carries each character's tag into the output lines.
pub fn wrap_runs<K: Copy + PartialEq>(runs: &[(&str, K)], width: u16) -> WrappedRuns<K> {
    let text: String = runs.iter().map(|(text, _)| *text).collect();
    let tags: Vec<K> = runs
        .iter()
        .flat_map(|(text, tag)| text.chars().map(move |_| *tag))
        .collect();
    let source: Vec<char> = text.chars().collect();
    let wrapped = wrap_word_with_positions(&text, width);

    let mut lines: Vec<Vec<(String, K)>> = vec![Vec::new()];
    let mut src_idx = 0usize;
    for ch in wrapped.rendered.chars() {
        let from_source = source.get(src_idx) == Some(&ch);
        if from_source {
            src_idx += 1;
        }
        if ch == '\n' {
            lines.push(Vec::new());
            continue;
        }
        let (Some(&tag), Some(line)) = (tags.get(src_idx.saturating_sub(1)), lines.last_mut())
        else {
            continue;
        };
        match line.last_mut() {
            Some((run, run_tag)) if *run_tag == tag => run.push(ch),
            _ => line.push((ch.to_string(), tag)),
        }
    }

    WrappedRuns {
        lines,
        line_count: wrapped.line_count,
    }
}

pub fn char_to_byte_idx(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}

/// Index of the caret slot on `target_line` closest to `goal_col` without
/// passing it; falls back to the first slot on that line.
pub fn nearest_index_for_line_col(positions: &[(u16, u16)], target_line: u16, goal_col: u16) -> usize {
    let mut best: Option<(usize, u16)> = None;
    let mut fallback: Option<usize> = None;

    for (idx, (line, col)) in positions.iter().copied().enumerate() {
        if line != target_line {
            continue;
        }
        if fallback.is_none() {
            fallback = Some(idx);
        }
        if col <= goal_col {
            best = match best {
                Some((_, best_col)) if best_col >= col => best,
                _ => Some((idx, col)),
            };
        }
    }

    if let Some((idx, _)) = best {
        idx
    } else {
        fallback.unwrap_or(positions.len().saturating_sub(1))
    }
}

fn should_wrap_before_word(chars: &[char], idx: usize, col: u16, width: u16) -> bool {
    if col == 0 {
        return false;
    }
    let ch = chars[idx];
    if ch.is_whitespace() {
        return false;
    }
    if idx > 0 {
        let prev = chars[idx - 1];
        if !prev.is_whitespace() && prev != '\n' {
            return false;
        }
    }

    let word_len = chars[idx..]
        .iter()
        .take_while(|c| !c.is_whitespace() && **c != '\n')
        .count() as u16;

    word_len <= width && col.saturating_add(word_len) > width
}
