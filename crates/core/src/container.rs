//! Container block recognizers: block quote marker runs and
//! ordered/unordered list starts, continuation, and closing decisions.
//!
//! All indentation bookkeeping uses column indexes into the current
//! tab-expanded line; list geometry recorded at the marker is compared
//! against later lines at the same container level.

use log::debug;

use crate::error::TokenizerFault;
use crate::leaf;
use crate::scanner;
use crate::stack::{CloseOptions, ParserState, StackEntry};
use crate::token::{Position, Token};

pub(crate) const BULLET_MARKERS: &str = "-+*";
pub(crate) const ORDERED_DELIMITERS: &str = ".)";

/// Longest run of digits an ordered list start index may carry.
const MAX_ORDERED_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListFamily {
    Unordered,
    Ordered,
}

/// A list marker recognized on the current line, with its geometry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListStart {
    pub family: ListFamily,
    /// Bullet character or ordered delimiter.
    pub marker: char,
    /// Start index of an ordered list; zero for bullets.
    pub start_value: u64,
    /// Column index of the marker itself.
    pub indent: usize,
    /// Column a continuation line must reach to stay inside the item.
    pub content_indent: usize,
    /// Index where the item content begins on this line.
    pub rest: usize,
}

/// Raw marker scan, free of any parser-state concerns.
struct RawMarker {
    family: ListFamily,
    marker: char,
    start_value: u64,
    /// Index just past the marker.
    marker_end: usize,
    /// Whitespace run after the marker.
    ws_after: usize,
    /// No content follows the marker on this line.
    empty: bool,
}

fn scan_list_marker(line: &str, at: usize) -> Option<RawMarker> {
    let bytes = line.as_bytes();
    if scanner::is_character_at_index_one_of(line, at, BULLET_MARKERS) {
        let marker_end = at + 1;
        return finish_marker(line, ListFamily::Unordered, bytes[at] as char, 0, marker_end);
    }
    let mut index = at;
    while bytes.get(index).is_some_and(u8::is_ascii_digit) {
        index += 1;
    }
    let digits = index - at;
    if digits == 0 || digits > MAX_ORDERED_DIGITS {
        return None;
    }
    if !scanner::is_character_at_index_one_of(line, index, ORDERED_DELIMITERS) {
        return None;
    }
    let start_value: u64 = line[at..index].parse().ok()?;
    finish_marker(
        line,
        ListFamily::Ordered,
        bytes[index] as char,
        start_value,
        index + 1,
    )
}

fn finish_marker(
    line: &str,
    family: ListFamily,
    marker: char,
    start_value: u64,
    marker_end: usize,
) -> Option<RawMarker> {
    if marker_end < line.len() && !scanner::is_character_at_index_whitespace(line, marker_end) {
        return None;
    }
    let (after_ws, ws) = scanner::extract_whitespace(line, marker_end);
    Some(RawMarker {
        family,
        marker,
        start_value,
        marker_end,
        ws_after: ws.len(),
        empty: after_ws >= line.len(),
    })
}

/// A block quote marker sits at most three columns in from the current
/// container level.
pub(crate) fn is_block_quote_start(line: &str, start: usize) -> bool {
    let (after_ws, ws) = scanner::extract_whitespace(line, start);
    ws.len() <= 3 && scanner::is_character_at_index(line, after_ws, '>')
}

/// Whether a marker at this point would interrupt the open paragraph:
/// only a non-empty bullet item or an ordered item starting at 1 may.
fn marker_may_interrupt_paragraph(marker: &RawMarker) -> bool {
    if marker.empty {
        return false;
    }
    match marker.family {
        ListFamily::Unordered => true,
        ListFamily::Ordered => marker.start_value == 1,
    }
}

/// Probe used by lazy-continuation checks: does a list marker able to
/// interrupt a paragraph start at `at`?
pub(crate) fn interrupting_list_marker(line: &str, at: usize) -> bool {
    scan_list_marker(line, at).is_some_and(|m| marker_may_interrupt_paragraph(&m))
}

/// Detect a list start at the current container level, applying the
/// thematic-break and interrupt-paragraph guards.
pub(crate) fn scan_list_start(
    state: &ParserState,
    line: &str,
    start: usize,
) -> Option<ListStart> {
    let (after_ws, ws) = scanner::extract_whitespace(line, start);
    if ws.len() > 3 {
        return None;
    }
    // a full thematic break line wins over a bullet run such as `- - -`
    if leaf::thematic_break_char(line, after_ws).is_some() {
        return None;
    }
    let marker = scan_list_marker(line, after_ws)?;
    if matches!(state.top(), StackEntry::Paragraph) {
        let below = state.stack.len().checked_sub(2).map(|i| &state.stack[i]);
        let paragraph_in_list = below.is_some_and(StackEntry::is_list);
        if !paragraph_in_list && !marker_may_interrupt_paragraph(&marker) {
            return None;
        }
    }
    // Runs of more than four spaces after the marker degrade to one
    // column, leaving the rest as content indentation.
    let effective_ws = if marker.empty || marker.ws_after > 4 {
        1
    } else {
        marker.ws_after
    };
    let rest = if marker.empty {
        line.len()
    } else if marker.ws_after > 4 {
        marker.marker_end + 1
    } else {
        marker.marker_end + marker.ws_after
    };
    Some(ListStart {
        family: marker.family,
        marker: marker.marker,
        start_value: marker.start_value,
        indent: after_ws,
        content_indent: marker.marker_end + effective_ws,
        rest,
    })
}

fn entry_geometry(entry: &StackEntry) -> Option<(usize, usize)> {
    match entry {
        StackEntry::UnorderedList {
            indent,
            content_indent,
            ..
        }
        | StackEntry::OrderedList {
            indent,
            content_indent,
            ..
        } => Some((*indent, *content_indent)),
        _ => None,
    }
}

/// Two list starts continue the same list when the marker family and
/// character match and, for ordered lists, the start index does not
/// decrease.
pub(crate) fn are_list_starts_equal(entry: &StackEntry, new: &ListStart) -> bool {
    match (entry, new.family) {
        (StackEntry::UnorderedList { marker, .. }, ListFamily::Unordered) => *marker == new.marker,
        (
            StackEntry::OrderedList {
                marker, last_start, ..
            },
            ListFamily::Ordered,
        ) => *marker == new.marker && new.start_value >= *last_start,
        _ => false,
    }
}

fn ordered_start_decreased(entry: &StackEntry, new: &ListStart) -> bool {
    matches!(
        (entry, new.family),
        (
            StackEntry::OrderedList {
                marker, last_start, ..
            },
            ListFamily::Ordered,
        ) if *marker == new.marker && new.start_value < *last_start
    )
}

fn open_new_list(state: &mut ParserState, new: &ListStart) -> Result<(), TokenizerFault> {
    // an open paragraph or leaf never wraps a list start
    state.close_open_blocks(CloseOptions::default())?;
    let position = Position {
        line: state.line,
        column: new.indent + 1,
    };
    match new.family {
        ListFamily::Unordered => state.open(
            StackEntry::UnorderedList {
                indent: new.indent,
                marker: new.marker,
                content_indent: new.content_indent,
            },
            Token::UnorderedList {
                marker: new.marker,
                indent: new.indent,
                content_indent: new.content_indent,
                position,
            },
        ),
        ListFamily::Ordered => state.open(
            StackEntry::OrderedList {
                indent: new.indent,
                marker: new.marker,
                content_indent: new.content_indent,
                last_start: new.start_value,
            },
            Token::OrderedList {
                marker: new.marker,
                start: new.start_value,
                indent: new.indent,
                content_indent: new.content_indent,
                position,
            },
        ),
    }
    state.append(Token::ListItem { position });
    Ok(())
}

fn update_list_entry(state: &mut ParserState, index: usize, new: &ListStart) {
    match &mut state.stack[index] {
        StackEntry::UnorderedList {
            indent,
            content_indent,
            ..
        } => {
            *indent = new.indent;
            *content_indent = new.content_indent;
        }
        StackEntry::OrderedList {
            indent,
            content_indent,
            last_start,
            ..
        } => {
            *indent = new.indent;
            *content_indent = new.content_indent;
            *last_start = new.start_value;
        }
        _ => {}
    }
}

/// Decide what a freshly scanned list marker means against the lists
/// already open: a new item of the same list, a nested list, a sibling
/// list after closing the current one, or a brand new list. Returns the
/// index where item content begins.
pub(crate) fn handle_list_start(
    state: &mut ParserState,
    new: ListStart,
) -> Result<usize, TokenizerFault> {
    loop {
        let Some(index) = state.innermost_list_index() else {
            open_new_list(state, &new)?;
            return Ok(new.rest);
        };
        let (list_indent, list_content) = match entry_geometry(&state.stack[index]) {
            Some(geometry) => geometry,
            None => {
                return Err(TokenizerFault::invariant(
                    "innermost list index does not hold a list",
                ));
            }
        };
        if new.indent >= list_content {
            // the marker sits inside the open item: a nested list
            open_new_list(state, &new)?;
            return Ok(new.rest);
        }
        if new.indent >= list_indent {
            if are_list_starts_equal(&state.stack[index], &new) {
                debug!("line {}: new item of the open list", state.line);
                state.close_open_blocks(CloseOptions::through(index + 1))?;
                state.append(Token::ListItem {
                    position: Position {
                        line: state.line,
                        column: new.indent + 1,
                    },
                });
                update_list_entry(state, index, &new);
                return Ok(new.rest);
            }
            if ordered_start_decreased(&state.stack[index], &new) && state.open_list_count() >= 2 {
                // a decreasing start index restarts as a nested list
                // while more than one list is open
                open_new_list(state, &new)?;
                return Ok(new.rest);
            }
            // same level, different list: close and start a sibling
            state.close_open_blocks(CloseOptions::through(index))?;
            open_new_list(state, &new)?;
            return Ok(new.rest);
        }
        // dedented below this list entirely; close it and compare with
        // the next outer one
        state.close_open_blocks(CloseOptions::through(index))?;
    }
}

/// Outcome of [`list_in_process`] for a marker-less line while a list is
/// open.
pub(crate) enum ListLineDisposition {
    /// No list was open.
    NotInList,
    /// The line stays inside the innermost item; content begins at the
    /// returned index.
    Inside { start: usize },
    /// The line was consumed as a lazy continuation of the item
    /// paragraph.
    LazyContinuation,
    /// Every list the line fell outside of has been closed.
    Closed,
}

/// For a plain content line while a list is open: keep it inside the
/// item when its indentation reaches the item's content column, allow a
/// partially-dedented continuation under an open paragraph, and close
/// the list otherwise.
pub(crate) fn list_in_process(
    state: &mut ParserState,
    line: &str,
    start: usize,
) -> Result<ListLineDisposition, TokenizerFault> {
    let (after_ws, _) = scanner::extract_whitespace(line, start);
    loop {
        let Some(index) = state.innermost_list_index() else {
            return Ok(ListLineDisposition::NotInList);
        };
        let Some((_, content_indent)) = entry_geometry(&state.stack[index]) else {
            return Err(TokenizerFault::invariant(
                "innermost list index does not hold a list",
            ));
        };
        if after_ws >= content_indent {
            return Ok(ListLineDisposition::Inside {
                start: content_indent.clamp(start, after_ws),
            });
        }
        if matches!(state.top(), StackEntry::Paragraph)
            && !leaf::line_interrupts_paragraph(line, start)
        {
            // dedented continuation is still paragraph text
            let position = state.position(after_ws + 1);
            state.append(Token::Text {
                text: line[after_ws..].to_string(),
                position,
            });
            return Ok(ListLineDisposition::LazyContinuation);
        }
        debug!("line {}: closing list below indent {}", state.line, after_ws);
        state.close_open_blocks(CloseOptions::through(index))?;
        if state.innermost_list_index().is_none() {
            return Ok(ListLineDisposition::Closed);
        }
    }
}

/// Consume a maximal run of `>` markers starting at `at` (each optionally
/// followed by one space), opening any block quote levels the line
/// declares beyond those already on the stack. Levels declared short of
/// the stack are left for the lazy-continuation check. Returns the index
/// after the consumed markers and how many were consumed.
pub(crate) fn handle_block_quote_section(
    state: &mut ParserState,
    line: &str,
    at: usize,
    this_bq_count: usize,
) -> Result<(usize, usize), TokenizerFault> {
    let open_quotes = state.block_quote_count();
    let mut marker_columns = Vec::new();
    let mut index = at;
    loop {
        // once the stack's quote levels are all matched, a fenced code
        // or HTML block at the top owns the remainder verbatim
        if state.top_claims_raw_line()
            && this_bq_count + marker_columns.len() == open_quotes
        {
            break;
        }
        if !scanner::is_character_at_index(line, index, '>') {
            break;
        }
        marker_columns.push(index);
        index += 1;
        if scanner::is_character_at_index(line, index, ' ') {
            index += 1;
        }
        let (next, ws) = scanner::extract_whitespace(line, index);
        if ws.len() <= 3 && scanner::is_character_at_index(line, next, '>') {
            index = next;
        }
    }
    let consumed = marker_columns.len();
    let total = this_bq_count + consumed;
    if total > open_quotes {
        // lists whose content column lies right of the first marker are
        // over; ones containing the marker stay open around the quote
        let first_marker = marker_columns[0];
        while let Some(list_index) = state.innermost_list_index() {
            match entry_geometry(&state.stack[list_index]) {
                Some((_, content_indent)) if content_indent > first_marker => {
                    state.close_open_blocks(CloseOptions::through(list_index))?;
                }
                _ => break,
            }
        }
        state.close_open_blocks(CloseOptions::default())?;
        for level in open_quotes..total {
            let column = marker_columns[level - this_bq_count];
            let position = Position {
                line: state.line,
                column: column + 1,
            };
            state.open(StackEntry::BlockQuote, Token::BlockQuote { position });
        }
    }
    Ok((index, consumed))
}
