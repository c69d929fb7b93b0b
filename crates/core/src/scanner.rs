//! Low-level line scanning helpers.
//!
//! All functions are pure, total, and byte-index based. Tabs are expanded
//! by the driver before any of these run, so "whitespace" here means the
//! space character.

use std::borrow::Cow;

const TAB_STOP: usize = 4;

/// Scan forward from `start` and return the index of the first character
/// that is not a space together with the whitespace that was consumed.
/// Returns `(line.len(), …)` when the line is exhausted.
pub fn extract_whitespace(line: &str, start: usize) -> (usize, &str) {
    let bytes = line.as_bytes();
    let from = start.min(line.len());
    let mut index = from;
    while bytes.get(index) == Some(&b' ') {
        index += 1;
    }
    (index, &line[from..index])
}

/// Return the index just past the last non-whitespace character and the
/// trailing whitespace itself.
pub fn extract_whitespace_from_end(line: &str) -> (usize, &str) {
    let bytes = line.as_bytes();
    let mut index = line.len();
    while index > 0 && bytes[index - 1] == b' ' {
        index -= 1;
    }
    (index, &line[index..])
}

/// Count a maximal run of `ch` starting at `start`; returns the run
/// length and the index just past it.
pub fn collect_while_character(line: &str, start: usize, ch: char) -> (usize, usize) {
    let bytes = line.as_bytes();
    let mut index = start.min(line.len());
    let target = ch as u8;
    while bytes.get(index) == Some(&target) {
        index += 1;
    }
    (index - start.min(line.len()), index)
}

/// Collect characters until one from `charset` is found. Returns `None`
/// when `start` lies beyond the end of the line; returns `(start, "")`
/// when `start` already sits on a matching character.
pub fn collect_until_one_of_characters<'a>(
    line: &'a str,
    start: usize,
    charset: &str,
) -> Option<(usize, &'a str)> {
    if start > line.len() {
        return None;
    }
    let bytes = line.as_bytes();
    let mut index = start;
    while index < line.len() && !charset.as_bytes().contains(&bytes[index]) {
        index += 1;
    }
    Some((index, &line[start..index]))
}

/// True when the character at `index` is exactly `ch`; false past the end
/// of the line.
pub fn is_character_at_index(line: &str, index: usize, ch: char) -> bool {
    line.as_bytes().get(index) == Some(&(ch as u8))
}

/// True when the character at `index` is one of `charset`; false past the
/// end of the line.
pub fn is_character_at_index_one_of(line: &str, index: usize, charset: &str) -> bool {
    match line.as_bytes().get(index) {
        Some(b) => charset.as_bytes().contains(b),
        None => false,
    }
}

/// True when the character at `index` is a space or tab; false past the
/// end of the line.
pub fn is_character_at_index_whitespace(line: &str, index: usize) -> bool {
    matches!(line.as_bytes().get(index), Some(b' ') | Some(b'\t'))
}

/// True when the character at `index` is anything other than `ch`,
/// including past the end of the line.
pub fn is_character_at_index_not(line: &str, index: usize, ch: char) -> bool {
    line.as_bytes().get(index) != Some(&(ch as u8))
}

/// Expand tabs against a fixed 4-column tab stop.
pub fn expand_tabs(line: &str) -> Cow<'_, str> {
    if !line.contains('\t') {
        return Cow::Borrowed(line);
    }
    let mut out = String::with_capacity(line.len() + TAB_STOP);
    let mut column = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_STOP - (column % TAB_STOP);
            for _ in 0..pad {
                out.push(' ');
            }
            column += pad;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    Cow::Owned(out)
}

/// True when the line contains nothing but whitespace.
pub fn is_blank_line(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}
