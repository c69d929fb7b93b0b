//! Leaf block recognizers, tried in a fixed precedence order once no
//! container marker matched: fenced code, ATX heading, indented code,
//! setext underline, thematic break, HTML block, paragraph. The
//! paragraph fallback always succeeds, so the chain is exhaustive and no
//! recognizer ever raises for "not this kind".

use crate::container;
use crate::error::TokenizerFault;
use crate::html_blocks;
use crate::parser;
use crate::scanner;
use crate::stack::{CloseOptions, ParserState, StackEntry, StackKind};
use crate::token::Token;

const THEMATIC_CHARS: &str = "*-_";
const CODE_BLOCK_INDENT: usize = 4;

/// The character of a thematic break when `line[at..]` is one: three or
/// more of the same `*`, `-`, or `_`, interior whitespace allowed.
pub(crate) fn thematic_break_char(line: &str, at: usize) -> Option<char> {
    let bytes = line.as_bytes();
    let first = *bytes.get(at)?;
    if !THEMATIC_CHARS.as_bytes().contains(&first) {
        return None;
    }
    let mut count = 0usize;
    for byte in &bytes[at..] {
        if *byte == first {
            count += 1;
        } else if *byte != b' ' {
            return None;
        }
    }
    (count >= 3).then_some(first as char)
}

/// ATX probe: a run of 1–6 `#` followed by whitespace or the end of the
/// line. Returns the level and the index just past the run.
fn atx_probe(line: &str, at: usize) -> Option<(usize, usize)> {
    let (level, end) = scanner::collect_while_character(line, at, '#');
    if level == 0 || level > 6 {
        return None;
    }
    if end < line.len() && !scanner::is_character_at_index_whitespace(line, end) {
        return None;
    }
    Some((level, end))
}

/// Fence-opening probe: a run of three or more backticks or tildes; a
/// backtick info string may not itself contain a backtick.
fn fenced_probe(line: &str, at: usize) -> Option<(char, usize, usize)> {
    let bytes = line.as_bytes();
    let fence = match bytes.get(at) {
        Some(b'`') => '`',
        Some(b'~') => '~',
        _ => return None,
    };
    let (count, end) = scanner::collect_while_character(line, at, fence);
    if count < 3 {
        return None;
    }
    if fence == '`' && line[end..].contains('`') {
        return None;
    }
    Some((fence, count, end))
}

/// Whether this line would start a block other than a paragraph
/// continuation; this is the test behind lazy continuation for block
/// quotes and dedented list paragraphs. Indented code cannot interrupt
/// a paragraph, so four or more columns of whitespace never interrupt.
pub(crate) fn line_interrupts_paragraph(line: &str, start: usize) -> bool {
    let (after_ws, ws) = scanner::extract_whitespace(line, start);
    if after_ws >= line.len() || ws.len() >= CODE_BLOCK_INDENT {
        return false;
    }
    thematic_break_char(line, after_ws).is_some()
        || atx_probe(line, after_ws).is_some()
        || fenced_probe(line, after_ws).is_some()
        || html_blocks::determine_html_block_type(line, after_ws, true).is_some()
        || container::interrupting_list_marker(line, after_ws)
}

/// Dispatch the remainder of a line to the leaf recognizers.
pub(crate) fn parse_line_for_leaf_blocks(
    state: &mut ParserState,
    line: &str,
    start: usize,
) -> Result<(), TokenizerFault> {
    let (after_ws, ws) = scanner::extract_whitespace(line, start);
    if after_ws >= line.len() {
        // container-only line; an empty remainder behaves as blank
        return parser::blank_line_policy(state, after_ws + 1);
    }
    match state.top() {
        StackEntry::FencedCodeBlock { .. } => return fenced_code_continuation(state, line, start),
        StackEntry::HtmlBlock { .. } => return html_block_continuation(state, line, start),
        _ => {}
    }
    if matches!(state.top(), StackEntry::IndentedCodeBlock) {
        if after_ws - start >= CODE_BLOCK_INDENT {
            let content_start = start + CODE_BLOCK_INDENT;
            let position = state.position(content_start + 1);
            state.append(Token::Text {
                text: line[content_start..].to_string(),
                position,
            });
            return Ok(());
        }
        state.close_open_blocks(CloseOptions::only(&[StackKind::IndentedCodeBlock]))?;
    }
    if try_fenced_code_start(state, line, start, after_ws, ws)? {
        return Ok(());
    }
    if try_atx_heading(state, line, start, after_ws)? {
        return Ok(());
    }
    if try_indented_code_start(state, line, start, after_ws)? {
        return Ok(());
    }
    if try_setext_underline(state, line, start, after_ws)? {
        return Ok(());
    }
    if try_thematic_break(state, line, start, after_ws)? {
        return Ok(());
    }
    if try_html_block_start(state, line, start, after_ws)? {
        return Ok(());
    }
    handle_paragraph(state, line, start, after_ws)
}

/// The nesting-depth cap flattens whatever remains of the line into
/// literal paragraph text.
pub(crate) fn flatten_to_paragraph(
    state: &mut ParserState,
    line: &str,
    start: usize,
) -> Result<(), TokenizerFault> {
    let (after_ws, _) = scanner::extract_whitespace(line, start);
    if after_ws >= line.len() {
        return parser::blank_line_policy(state, after_ws + 1);
    }
    let position = state.position(after_ws + 1);
    if !matches!(state.top(), StackEntry::Paragraph) {
        state.close_open_blocks(CloseOptions::default())?;
        state.open(StackEntry::Paragraph, Token::Paragraph { position });
    }
    state.append(Token::Text {
        text: line[after_ws..].to_string(),
        position,
    });
    Ok(())
}

fn fenced_code_continuation(
    state: &mut ParserState,
    line: &str,
    start: usize,
) -> Result<(), TokenizerFault> {
    let (fence_char, fence_len, fence_indent) = match state.top() {
        StackEntry::FencedCodeBlock {
            fence_char,
            fence_len,
            indent,
        } => (*fence_char, *fence_len, *indent),
        _ => {
            return Err(TokenizerFault::invariant(
                "fenced continuation without an open fence",
            ));
        }
    };
    let (after_ws, ws) = scanner::extract_whitespace(line, start);
    if ws.len() <= 3 {
        let (count, end) = scanner::collect_while_character(line, after_ws, fence_char);
        if count >= fence_len {
            let (rest, _) = scanner::extract_whitespace(line, end);
            if rest >= line.len() {
                return state.close_open_blocks(CloseOptions::only(&[StackKind::FencedCodeBlock]));
            }
        }
    }
    // content keeps its whitespace beyond the opening fence's indent
    let content_start = start + fence_indent.min(ws.len());
    let position = state.position(content_start + 1);
    state.append(Token::Text {
        text: line[content_start..].to_string(),
        position,
    });
    Ok(())
}

fn html_block_continuation(
    state: &mut ParserState,
    line: &str,
    start: usize,
) -> Result<(), TokenizerFault> {
    let closes_on_blank = match state.top() {
        StackEntry::HtmlBlock { kind, .. } => kind.closes_on_blank_line(),
        _ => {
            return Err(TokenizerFault::invariant(
                "HTML continuation without an open HTML block",
            ));
        }
    };
    if closes_on_blank {
        // types 6 and 7 run until a blank line; every other line is content
        let position = state.position(start + 1);
        state.append(Token::Text {
            text: line[start..].to_string(),
            position,
        });
        return Ok(());
    }
    html_blocks::check_normal_html_block_end(state, line, start)
}

fn try_fenced_code_start(
    state: &mut ParserState,
    line: &str,
    start: usize,
    after_ws: usize,
    ws: &str,
) -> Result<bool, TokenizerFault> {
    if after_ws - start > 3 {
        return Ok(false);
    }
    let Some((fence_char, fence_len, end)) = fenced_probe(line, after_ws) else {
        return Ok(false);
    };
    state.close_open_blocks(CloseOptions::default())?;
    let position = state.position(after_ws + 1);
    state.open(
        StackEntry::FencedCodeBlock {
            fence_char,
            fence_len,
            indent: after_ws - start,
        },
        Token::FencedCodeBlock {
            fence_char,
            fence_len,
            info: line[end..].trim().to_string(),
            ws_before: ws.to_string(),
            position,
        },
    );
    Ok(true)
}

fn try_atx_heading(
    state: &mut ParserState,
    line: &str,
    start: usize,
    after_ws: usize,
) -> Result<bool, TokenizerFault> {
    if after_ws - start > 3 {
        return Ok(false);
    }
    let Some((level, end)) = atx_probe(line, after_ws) else {
        return Ok(false);
    };
    state.close_open_blocks(CloseOptions::default())?;
    let (text_start, ws_before) = scanner::extract_whitespace(line, end);
    let ws_before = ws_before.to_string();
    let (content, ws_after) = strip_atx_closing(&line[text_start..]);
    let position = state.position(after_ws + 1);
    state.append(Token::AtxHeading {
        level,
        ws_before,
        ws_after,
        position,
    });
    if !content.is_empty() {
        let position = state.position(text_start + 1);
        state.append(Token::Text {
            text: content,
            position,
        });
    }
    state.append(Token::EndAtxHeading);
    Ok(true)
}

/// Strip an optional closing `#` run (which only counts when preceded by
/// whitespace or standing alone) and capture the whitespace before it.
fn strip_atx_closing(full: &str) -> (String, String) {
    let (end, trailing_ws) = scanner::extract_whitespace_from_end(full);
    let trimmed = &full[..end];
    let body = trimmed.trim_end_matches('#');
    if body.len() == trimmed.len() {
        // no closing run
        return (trimmed.to_string(), trailing_ws.to_string());
    }
    if body.is_empty() {
        return (String::new(), String::new());
    }
    let (content_end, ws_after) = scanner::extract_whitespace_from_end(body);
    if ws_after.is_empty() {
        // the run touches the text and is part of it
        return (trimmed.to_string(), trailing_ws.to_string());
    }
    (body[..content_end].to_string(), ws_after.to_string())
}

fn try_indented_code_start(
    state: &mut ParserState,
    line: &str,
    start: usize,
    after_ws: usize,
) -> Result<bool, TokenizerFault> {
    if after_ws - start < CODE_BLOCK_INDENT || matches!(state.top(), StackEntry::Paragraph) {
        return Ok(false);
    }
    let content_start = start + CODE_BLOCK_INDENT;
    let position = state.position(content_start + 1);
    state.open(
        StackEntry::IndentedCodeBlock,
        Token::IndentedCodeBlock { position },
    );
    state.append(Token::Text {
        text: line[content_start..].to_string(),
        position,
    });
    Ok(true)
}

fn try_setext_underline(
    state: &mut ParserState,
    line: &str,
    start: usize,
    after_ws: usize,
) -> Result<bool, TokenizerFault> {
    if !matches!(state.top(), StackEntry::Paragraph) || after_ws - start > 3 {
        return Ok(false);
    }
    let underline = match line.as_bytes().get(after_ws) {
        Some(b'-') => '-',
        Some(b'=') => '=',
        _ => return Ok(false),
    };
    let (_, end) = scanner::collect_while_character(line, after_ws, underline);
    let (rest, _) = scanner::extract_whitespace(line, end);
    if rest < line.len() {
        return Ok(false);
    }
    state.rewrite_paragraph_to_setext(underline)?;
    Ok(true)
}

fn try_thematic_break(
    state: &mut ParserState,
    line: &str,
    start: usize,
    after_ws: usize,
) -> Result<bool, TokenizerFault> {
    if after_ws - start > 3 {
        return Ok(false);
    }
    let Some(marker) = thematic_break_char(line, after_ws) else {
        return Ok(false);
    };
    state.close_open_blocks(CloseOptions::default())?;
    let position = state.position(after_ws + 1);
    state.append(Token::ThematicBreak {
        marker,
        text: line[after_ws..].trim_end().to_string(),
        position,
    });
    Ok(true)
}

fn try_html_block_start(
    state: &mut ParserState,
    line: &str,
    start: usize,
    after_ws: usize,
) -> Result<bool, TokenizerFault> {
    if after_ws - start > 3 {
        return Ok(false);
    }
    let top_is_paragraph = matches!(state.top(), StackEntry::Paragraph);
    let Some((kind, tag)) = html_blocks::determine_html_block_type(line, after_ws, top_is_paragraph)
    else {
        return Ok(false);
    };
    state.close_open_blocks(CloseOptions::default())?;
    let position = state.position(after_ws + 1);
    state.open(
        StackEntry::HtmlBlock { kind, tag },
        Token::HtmlBlock { kind, position },
    );
    if kind.closes_on_blank_line() {
        let position = state.position(start + 1);
        state.append(Token::Text {
            text: line[start..].to_string(),
            position,
        });
        return Ok(true);
    }
    // the opening line of types 1–5 may already contain the terminator
    html_blocks::check_normal_html_block_end(state, line, start)?;
    Ok(true)
}

fn handle_paragraph(
    state: &mut ParserState,
    line: &str,
    start: usize,
    after_ws: usize,
) -> Result<(), TokenizerFault> {
    let position = state.position(after_ws + 1);
    if !matches!(state.top(), StackEntry::Paragraph) {
        if after_ws - start <= 3 {
            if let Some((label, destination, title)) = link_reference_definition(line, after_ws) {
                state.append(Token::LinkReferenceDefinition {
                    label,
                    destination,
                    title,
                    position,
                });
                return Ok(());
            }
        }
        state.open(StackEntry::Paragraph, Token::Paragraph { position });
    }
    state.append(Token::Text {
        text: line[after_ws..].to_string(),
        position,
    });
    Ok(())
}

/// Single-line link reference definition:
/// `[label]: destination` with an optional quoted or parenthesized title.
fn link_reference_definition(
    line: &str,
    at: usize,
) -> Option<(String, String, Option<String>)> {
    let bytes = line.as_bytes();
    if bytes.get(at) != Some(&b'[') {
        return None;
    }
    let label_start = at + 1;
    let mut index = label_start;
    loop {
        match bytes.get(index) {
            Some(b'\\') => index += 2,
            Some(b']') => break,
            Some(b'[') | None => return None,
            Some(_) => index += 1,
        }
    }
    let label = line.get(label_start..index)?;
    if label.trim().is_empty() || label.len() > 999 {
        return None;
    }
    index += 1;
    if bytes.get(index) != Some(&b':') {
        return None;
    }
    let (dest_start, _) = scanner::extract_whitespace(line, index + 1);
    if dest_start >= line.len() {
        return None;
    }
    let (destination, after_dest) = if bytes[dest_start] == b'<' {
        let close = line[dest_start + 1..]
            .find('>')
            .map(|offset| dest_start + 1 + offset)?;
        (&line[dest_start + 1..close], close + 1)
    } else {
        let (scan, _) = scanner::collect_until_one_of_characters(line, dest_start, " ")?;
        (&line[dest_start..scan.max(dest_start)], scan)
    };
    let (destination, after_dest) = (destination.to_string(), after_dest);
    if destination.is_empty() && bytes[dest_start] != b'<' {
        return None;
    }
    let (title_start, ws) = scanner::extract_whitespace(line, after_dest);
    if title_start >= line.len() {
        return Some((label.trim().to_string(), destination, None));
    }
    if ws.is_empty() {
        return None;
    }
    let close = match bytes[title_start] {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut scan = title_start + 1;
    while bytes.get(scan).is_some_and(|b| *b != close) {
        scan += 1;
    }
    if bytes.get(scan) != Some(&close) {
        return None;
    }
    let title = line[title_start + 1..scan].to_string();
    let (end, _) = scanner::extract_whitespace(line, scan + 1);
    if end < line.len() {
        return None;
    }
    Some((label.trim().to_string(), destination, Some(title)))
}
