use serde::Serialize;

use crate::html_blocks::HtmlBlockKind;

/// 1-based source coordinates of the first character of a construct,
/// measured on the tab-expanded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// One element of the linear token stream produced by [`transform`].
///
/// Every `…` open variant is balanced by its `End…` counterpart in strict
/// LIFO order by the time `transform` returns; single-line constructs
/// (`ThematicBreak`, `ListItem`, `Blank`, `LinkReferenceDefinition`) have
/// no end token. Tokens are immutable once appended, with one documented
/// exception: an open `Paragraph` token is rewritten in place into a
/// `SetextHeading` when its underline line is recognized.
///
/// [`transform`]: crate::transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Token {
    Blank {
        position: Position,
    },
    Paragraph {
        position: Position,
    },
    EndParagraph,
    Text {
        text: String,
        position: Position,
    },
    AtxHeading {
        level: usize,
        ws_before: String,
        ws_after: String,
        position: Position,
    },
    EndAtxHeading,
    SetextHeading {
        underline: char,
        position: Position,
    },
    EndSetextHeading,
    ThematicBreak {
        marker: char,
        text: String,
        position: Position,
    },
    IndentedCodeBlock {
        position: Position,
    },
    EndIndentedCodeBlock,
    FencedCodeBlock {
        fence_char: char,
        fence_len: usize,
        info: String,
        ws_before: String,
        position: Position,
    },
    EndFencedCodeBlock,
    HtmlBlock {
        kind: HtmlBlockKind,
        position: Position,
    },
    EndHtmlBlock,
    BlockQuote {
        position: Position,
    },
    EndBlockQuote,
    UnorderedList {
        marker: char,
        indent: usize,
        content_indent: usize,
        position: Position,
    },
    EndUnorderedList,
    OrderedList {
        marker: char,
        start: u64,
        indent: usize,
        content_indent: usize,
        position: Position,
    },
    EndOrderedList,
    ListItem {
        position: Position,
    },
    LinkReferenceDefinition {
        label: String,
        destination: String,
        title: Option<String>,
        position: Position,
    },
    EndOfStream,
}

impl Token {
    /// Source position of the token, for tokens that carry one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Token::Blank { position }
            | Token::Paragraph { position }
            | Token::Text { position, .. }
            | Token::AtxHeading { position, .. }
            | Token::SetextHeading { position, .. }
            | Token::ThematicBreak { position, .. }
            | Token::IndentedCodeBlock { position }
            | Token::FencedCodeBlock { position, .. }
            | Token::HtmlBlock { position, .. }
            | Token::BlockQuote { position }
            | Token::UnorderedList { position, .. }
            | Token::OrderedList { position, .. }
            | Token::ListItem { position }
            | Token::LinkReferenceDefinition { position, .. } => Some(*position),
            _ => None,
        }
    }
}
