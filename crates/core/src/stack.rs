//! The mutable heart of the tokenizer: the stack of currently-open
//! blocks and the append-only token document.
//!
//! The two structures are kept in lockstep: pushing an entry appends its
//! open token in the same step, and every pop appends the matching end
//! token, so the stack is always the "currently open" projection of the
//! document.

use log::trace;

use crate::error::TokenizerFault;
use crate::html_blocks::HtmlBlockKind;
use crate::token::{Position, Token};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StackEntry {
    /// Sentinel, always present at the bottom of the stack.
    Document,
    BlockQuote,
    UnorderedList {
        indent: usize,
        marker: char,
        content_indent: usize,
    },
    OrderedList {
        indent: usize,
        marker: char,
        content_indent: usize,
        last_start: u64,
    },
    Paragraph,
    IndentedCodeBlock,
    FencedCodeBlock {
        fence_char: char,
        fence_len: usize,
        indent: usize,
    },
    HtmlBlock {
        kind: HtmlBlockKind,
        tag: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StackKind {
    Document,
    BlockQuote,
    UnorderedList,
    OrderedList,
    Paragraph,
    IndentedCodeBlock,
    FencedCodeBlock,
    HtmlBlock,
}

impl StackEntry {
    pub fn kind(&self) -> StackKind {
        match self {
            StackEntry::Document => StackKind::Document,
            StackEntry::BlockQuote => StackKind::BlockQuote,
            StackEntry::UnorderedList { .. } => StackKind::UnorderedList,
            StackEntry::OrderedList { .. } => StackKind::OrderedList,
            StackEntry::Paragraph => StackKind::Paragraph,
            StackEntry::IndentedCodeBlock => StackKind::IndentedCodeBlock,
            StackEntry::FencedCodeBlock { .. } => StackKind::FencedCodeBlock,
            StackEntry::HtmlBlock { .. } => StackKind::HtmlBlock,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            StackEntry::UnorderedList { .. } | StackEntry::OrderedList { .. }
        )
    }
}

/// How far [`ParserState::close_open_blocks`] is allowed to pop.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CloseOptions {
    pub include_block_quotes: bool,
    pub include_lists: bool,
    /// Stop once the stack would shrink to this length.
    pub until_me: Option<usize>,
    /// Allow-list of entry kinds to keep popping through.
    pub only_these_blocks: Option<&'static [StackKind]>,
}

impl CloseOptions {
    pub fn everything() -> Self {
        CloseOptions {
            include_block_quotes: true,
            include_lists: true,
            ..CloseOptions::default()
        }
    }

    pub fn only(kinds: &'static [StackKind]) -> Self {
        CloseOptions {
            only_these_blocks: Some(kinds),
            include_block_quotes: true,
            include_lists: true,
            ..CloseOptions::default()
        }
    }

    pub fn through(until_me: usize) -> Self {
        CloseOptions {
            include_block_quotes: true,
            include_lists: true,
            until_me: Some(until_me),
            ..CloseOptions::default()
        }
    }
}

pub(crate) struct ParserState {
    pub stack: Vec<StackEntry>,
    pub document: Vec<Token>,
    /// 1-based number of the line currently being tokenized.
    pub line: usize,
    /// Set while a container marker has consumed a prefix of the current
    /// line; an empty remainder then appends a `Blank` instead of opening
    /// an empty paragraph.
    pub no_para_start_if_empty: bool,
}

impl ParserState {
    pub fn new() -> Self {
        ParserState {
            stack: vec![StackEntry::Document],
            document: Vec::new(),
            line: 0,
            no_para_start_if_empty: false,
        }
    }

    pub fn top(&self) -> &StackEntry {
        self.stack.last().unwrap_or(&StackEntry::Document)
    }

    pub fn position(&self, column: usize) -> Position {
        Position {
            line: self.line,
            column,
        }
    }

    pub fn block_quote_count(&self) -> usize {
        self.stack
            .iter()
            .filter(|e| matches!(e, StackEntry::BlockQuote))
            .count()
    }

    pub fn open_list_count(&self) -> usize {
        self.stack.iter().filter(|e| e.is_list()).count()
    }

    pub fn innermost_list_index(&self) -> Option<usize> {
        self.stack.iter().rposition(StackEntry::is_list)
    }

    /// True when the open leaf at the top of the stack consumes raw lines
    /// wholesale (no further block starts are recognized inside it).
    pub fn top_claims_raw_line(&self) -> bool {
        matches!(
            self.top(),
            StackEntry::FencedCodeBlock { .. } | StackEntry::HtmlBlock { .. }
        )
    }

    pub fn append(&mut self, token: Token) {
        self.document.push(token);
    }

    /// Push a stack entry and its open token as one step.
    pub fn open(&mut self, entry: StackEntry, token: Token) {
        trace!("open {:?}", entry.kind());
        self.stack.push(entry);
        self.document.push(token);
    }

    fn end_token_for(entry: &StackEntry) -> Option<Token> {
        match entry {
            StackEntry::Document => None,
            StackEntry::BlockQuote => Some(Token::EndBlockQuote),
            StackEntry::UnorderedList { .. } => Some(Token::EndUnorderedList),
            StackEntry::OrderedList { .. } => Some(Token::EndOrderedList),
            StackEntry::Paragraph => Some(Token::EndParagraph),
            StackEntry::IndentedCodeBlock => Some(Token::EndIndentedCodeBlock),
            StackEntry::FencedCodeBlock { .. } => Some(Token::EndFencedCodeBlock),
            StackEntry::HtmlBlock { .. } => Some(Token::EndHtmlBlock),
        }
    }

    /// Pop the top entry and append its end token.
    pub fn pop_one(&mut self) -> Result<(), TokenizerFault> {
        let entry = match self.stack.pop() {
            Some(entry) => entry,
            None => return Err(TokenizerFault::invariant("pop from an empty parser stack")),
        };
        trace!("close {:?}", entry.kind());
        if matches!(entry, StackEntry::Document) {
            self.stack.push(entry);
            return Err(TokenizerFault::invariant(
                "attempted to close the document sentinel",
            ));
        }
        if matches!(entry, StackEntry::IndentedCodeBlock) {
            // Trailing blank lines do not belong to an indented code
            // block: pull them back out and re-append after the close.
            let mut blanks = Vec::new();
            while matches!(self.document.last(), Some(Token::Blank { .. })) {
                if let Some(blank) = self.document.pop() {
                    blanks.push(blank);
                }
            }
            blanks.reverse();
            self.document.push(Token::EndIndentedCodeBlock);
            self.document.extend(blanks);
            return Ok(());
        }
        match Self::end_token_for(&entry) {
            Some(token) => {
                self.document.push(token);
                Ok(())
            }
            None => Err(TokenizerFault::invariant("missing end token for stack entry")),
        }
    }

    /// Pop entries from the top of the stack while the options permit,
    /// appending the matching end token for each.
    pub fn close_open_blocks(&mut self, options: CloseOptions) -> Result<(), TokenizerFault> {
        loop {
            if let Some(until) = options.until_me {
                if self.stack.len() <= until {
                    break;
                }
            }
            let kind = self.top().kind();
            if kind == StackKind::Document {
                break;
            }
            if let Some(kinds) = options.only_these_blocks {
                if !kinds.contains(&kind) {
                    break;
                }
            }
            if kind == StackKind::BlockQuote && !options.include_block_quotes {
                break;
            }
            if matches!(kind, StackKind::UnorderedList | StackKind::OrderedList)
                && !options.include_lists
            {
                break;
            }
            self.pop_one()?;
        }
        Ok(())
    }

    /// Close blocks until only `count` block quotes remain open, popping
    /// everything nested inside the quotes being closed.
    pub fn close_to_block_quote_count(&mut self, count: usize) -> Result<(), TokenizerFault> {
        while self.block_quote_count() > count {
            loop {
                let was_quote = matches!(self.top(), StackEntry::BlockQuote);
                self.pop_one()?;
                if was_quote {
                    break;
                }
            }
        }
        Ok(())
    }

    /// The one sanctioned in-place token rewrite: the open paragraph
    /// becomes a setext heading once its underline line is seen. The
    /// paragraph pops without an `EndParagraph`; the heading gets its
    /// own end token.
    pub fn rewrite_paragraph_to_setext(&mut self, underline: char) -> Result<(), TokenizerFault> {
        match self.stack.last() {
            Some(StackEntry::Paragraph) => {
                self.stack.pop();
            }
            _ => {
                return Err(TokenizerFault::invariant(
                    "setext rewrite without an open paragraph",
                ));
            }
        }
        let index = self
            .document
            .iter()
            .rposition(|t| matches!(t, Token::Paragraph { .. }));
        let Some(index) = index else {
            return Err(TokenizerFault::invariant(
                "setext rewrite found no paragraph token",
            ));
        };
        let position = match &self.document[index] {
            Token::Paragraph { position } => *position,
            _ => {
                return Err(TokenizerFault::invariant(
                    "setext rewrite located a non-paragraph token",
                ));
            }
        };
        self.document[index] = Token::SetextHeading {
            underline,
            position,
        };
        self.document.push(Token::EndSetextHeading);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_starts_with_document_sentinel() {
        let state = ParserState::new();
        assert_eq!(state.stack, vec![StackEntry::Document]);
        assert!(state.document.is_empty());
    }

    #[test]
    fn open_appends_token_and_entry_together() {
        let mut state = ParserState::new();
        state.line = 1;
        let position = state.position(1);
        state.open(StackEntry::Paragraph, Token::Paragraph { position });
        assert_eq!(state.stack.len(), 2);
        assert_eq!(state.document, vec![Token::Paragraph { position }]);
    }

    #[test]
    fn close_pops_in_lifo_order_with_end_tokens() {
        let mut state = ParserState::new();
        state.line = 1;
        let position = state.position(1);
        state.open(StackEntry::BlockQuote, Token::BlockQuote { position });
        state.open(StackEntry::Paragraph, Token::Paragraph { position });
        state.close_open_blocks(CloseOptions::everything()).unwrap();
        assert_eq!(
            state.document,
            vec![
                Token::BlockQuote { position },
                Token::Paragraph { position },
                Token::EndParagraph,
                Token::EndBlockQuote,
            ]
        );
        assert_eq!(state.stack, vec![StackEntry::Document]);
    }

    #[test]
    fn default_close_stops_at_containers() {
        let mut state = ParserState::new();
        state.line = 1;
        let position = state.position(1);
        state.open(StackEntry::BlockQuote, Token::BlockQuote { position });
        state.open(StackEntry::Paragraph, Token::Paragraph { position });
        state.close_open_blocks(CloseOptions::default()).unwrap();
        assert_eq!(state.stack.len(), 2);
        assert!(matches!(state.stack[1], StackEntry::BlockQuote));
    }

    #[test]
    fn indented_code_close_pulls_trailing_blanks_out() {
        let mut state = ParserState::new();
        state.line = 1;
        let position = state.position(5);
        state.open(
            StackEntry::IndentedCodeBlock,
            Token::IndentedCodeBlock { position },
        );
        state.append(Token::Text {
            text: "code".to_string(),
            position,
        });
        let blank = Position { line: 2, column: 1 };
        state.append(Token::Blank { position: blank });
        state.close_open_blocks(CloseOptions::everything()).unwrap();
        assert_eq!(
            state.document,
            vec![
                Token::IndentedCodeBlock { position },
                Token::Text {
                    text: "code".to_string(),
                    position,
                },
                Token::EndIndentedCodeBlock,
                Token::Blank { position: blank },
            ]
        );
    }
}
