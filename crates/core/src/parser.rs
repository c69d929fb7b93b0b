//! The line dispatcher: splits the document into lines and routes each
//! through container-then-leaf processing, recursing for nested
//! containers on the remainder of a line.

use log::debug;

use crate::container::{self, ListLineDisposition};
use crate::error::TokenizerFault;
use crate::html_blocks;
use crate::leaf;
use crate::options::Options;
use crate::scanner;
use crate::stack::{CloseOptions, ParserState, StackEntry, StackKind};
use crate::token::Token;

/// Tokenize one Markdown document into its linear token stream.
///
/// The result is either a complete, balanced stream ending in
/// [`Token::EndOfStream`] or a [`TokenizerFault`], never both. The
/// stream is a pure function of the input: re-running on the same string
/// reproduces it exactly.
pub fn transform(input: &str, options: &Options) -> Result<Vec<Token>, TokenizerFault> {
    let mut state = ParserState::new();
    let mut lines: Vec<&str> = input.split('\n').collect();
    // a trailing newline ends the last line, it does not add a blank one
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    for raw in lines {
        state.line += 1;
        state.no_para_start_if_empty = false;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let line = scanner::expand_tabs(raw);
        debug!("line {}: {:?}", state.line, line);
        if scanner::is_blank_line(&line) {
            handle_blank_line(&mut state)?;
        } else {
            parse_line(&mut state, &line, 0, 0, 0, false, options)?;
        }
    }
    state.close_open_blocks(CloseOptions::everything())?;
    state.append(Token::EndOfStream);
    Ok(state.document)
}

/// Shared policy for blank lines and for empty line remainders after
/// container markers: fenced and indented code keep the blank as
/// content, HTML blocks of types 6/7 close, an open paragraph closes,
/// and a `Blank` token is appended either way.
pub(crate) fn blank_line_policy(
    state: &mut ParserState,
    column: usize,
) -> Result<(), TokenizerFault> {
    let close_html = matches!(
        state.top(),
        StackEntry::HtmlBlock { kind, .. } if kind.closes_on_blank_line()
    );
    if close_html {
        html_blocks::check_blank_html_block_end(state)?;
    } else if matches!(state.top(), StackEntry::Paragraph) {
        state.close_open_blocks(CloseOptions::only(&[StackKind::Paragraph]))?;
    }
    let position = state.position(column);
    state.append(Token::Blank { position });
    Ok(())
}

fn handle_blank_line(state: &mut ParserState) -> Result<(), TokenizerFault> {
    // A second blank line directly after a list item boundary ends the
    // list instead of leaving it dangling.
    if state.innermost_list_index().is_some() {
        let len = state.document.len();
        if len >= 2
            && matches!(state.document[len - 1], Token::Blank { .. })
            && matches!(
                state.document[len - 2],
                Token::ListItem { .. } | Token::UnorderedList { .. } | Token::OrderedList { .. }
            )
        {
            debug!("line {}: double blank closes the open list", state.line);
            state.close_open_blocks(CloseOptions {
                include_lists: true,
                ..CloseOptions::default()
            })?;
        }
    }
    blank_line_policy(state, 1)
}

/// Process one line (or the remainder of one after consumed container
/// markers): match or open containers, settle lazy continuation for
/// unmatched block quotes, then hand off to the leaf recognizers.
fn parse_line(
    state: &mut ParserState,
    line: &str,
    start: usize,
    container_depth: usize,
    this_bq_count: usize,
    lists_processed: bool,
    options: &Options,
) -> Result<(), TokenizerFault> {
    if container_depth > options.max_container_depth {
        return Err(TokenizerFault::NestingLimitExceeded {
            limit: options.max_container_depth,
            line: state.line,
            column: start + 1,
        });
    }
    if container_depth == options.max_container_depth {
        debug!(
            "line {}: container depth cap {} reached, flattening",
            state.line, options.max_container_depth
        );
        return leaf::flatten_to_paragraph(state, line, start);
    }

    let quotes_matched = this_bq_count == state.block_quote_count();

    // once every open quote level is accounted for, a fenced code or
    // HTML block at the top of the stack owns the remainder verbatim
    if quotes_matched && state.top_claims_raw_line() && state.innermost_list_index().is_none() {
        return leaf::parse_line_for_leaf_blocks(state, line, start);
    }

    let (after_ws, _) = scanner::extract_whitespace(line, start);
    let remainder_empty = after_ws >= line.len();

    // container: block quote markers
    if container::is_block_quote_start(line, start)
        && !(quotes_matched && state.top_claims_raw_line())
    {
        let (rest, consumed) =
            container::handle_block_quote_section(state, line, after_ws, this_bq_count)?;
        if consumed > 0 {
            state.no_para_start_if_empty = true;
            return parse_line(
                state,
                line,
                rest,
                container_depth + 1,
                this_bq_count + consumed,
                false,
                options,
            );
        }
    }

    // quote levels this line does not repeat: lazy continuation keeps
    // them open for plain paragraph text, anything else closes them
    if !quotes_matched && !remainder_empty {
        if matches!(state.top(), StackEntry::Paragraph)
            && !leaf::line_interrupts_paragraph(line, start)
        {
            let position = state.position(after_ws + 1);
            state.append(Token::Text {
                text: line[after_ws..].to_string(),
                position,
            });
            return Ok(());
        }
        state.close_to_block_quote_count(this_bq_count)?;
    }

    // container: list starts
    if let Some(list_start) = container::scan_list_start(state, line, start) {
        let rest = container::handle_list_start(state, list_start)?;
        state.no_para_start_if_empty = true;
        return parse_line(
            state,
            line,
            rest,
            container_depth + 1,
            this_bq_count,
            false,
            options,
        );
    }

    // list continuation for marker-less lines
    if !lists_processed && !remainder_empty && state.innermost_list_index().is_some() {
        match container::list_in_process(state, line, start)? {
            ListLineDisposition::Inside { start: rest } => {
                return parse_line(
                    state,
                    line,
                    rest,
                    container_depth + 1,
                    this_bq_count,
                    true,
                    options,
                );
            }
            ListLineDisposition::LazyContinuation => return Ok(()),
            ListLineDisposition::Closed => {
                // re-probe the line now that the lists are gone
                return parse_line(
                    state,
                    line,
                    start,
                    container_depth + 1,
                    this_bq_count,
                    true,
                    options,
                );
            }
            ListLineDisposition::NotInList => {}
        }
    }

    leaf::parse_line_for_leaf_blocks(state, line, start)
}
