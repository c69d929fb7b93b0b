use marlin_core::Token;

use crate::Violation;

pub(crate) const ID: &str = "MK009";
pub(crate) const NAME: &str = "no-multiple-blanks";

/// Consecutive blank lines outside code blocks: one is enough.
pub(crate) fn check(tokens: &[Token]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut blank_run = 0usize;
    let mut in_code = false;
    for token in tokens {
        match token {
            Token::FencedCodeBlock { .. } | Token::IndentedCodeBlock { .. } => {
                in_code = true;
                blank_run = 0;
            }
            Token::EndFencedCodeBlock | Token::EndIndentedCodeBlock => {
                in_code = false;
            }
            Token::Blank { position } if !in_code => {
                blank_run += 1;
                if blank_run > 1 {
                    violations.push(Violation {
                        line: position.line,
                        column: position.column,
                        rule_id: ID,
                        rule_name: NAME,
                        description: format!("{blank_run} consecutive blank lines"),
                    });
                }
            }
            Token::Blank { .. } => {}
            _ => {
                blank_run = 0;
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlin_core::{transform, Options};

    fn run(input: &str) -> Vec<Violation> {
        check(&transform(input, &Options::default()).expect("transform"))
    }

    #[test]
    fn single_blank_is_clean() {
        assert!(run("a\n\nb\n").is_empty());
    }

    #[test]
    fn double_blank_is_flagged_once() {
        let found = run("a\n\n\nb\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 3);
    }

    #[test]
    fn blanks_inside_code_blocks_are_ignored() {
        assert!(run("```\na\n\n\nb\n```\n").is_empty());
    }
}
