use thiserror::Error;

/// Faults produced by the tokenizer.
///
/// A fault never means "invalid Markdown": every input string has a
/// defined token stream, and malformed constructs degrade to paragraphs
/// or literal text. A fault indicates a defect in the tokenizer itself
/// (a broken stack invariant, an unexpected token shape during the
/// setext rewrite) surfaced as a typed error so the embedding
/// application can report it without crashing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizerFault {
    #[error("container nesting exceeded {limit} levels at {line}:{column}")]
    NestingLimitExceeded {
        limit: usize,
        line: usize,
        column: usize,
    },
    #[error("tokenizer invariant violated: {detail}")]
    InvariantViolation { detail: String },
}

impl TokenizerFault {
    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        debug_assert!(false, "tokenizer invariant violated: {detail}");
        TokenizerFault::InvariantViolation { detail }
    }
}
