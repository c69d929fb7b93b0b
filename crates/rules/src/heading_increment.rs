use marlin_core::{Position, Token};

use crate::Violation;

pub(crate) const ID: &str = "MK001";
pub(crate) const NAME: &str = "heading-increment";

fn heading(token: &Token) -> Option<(usize, Position)> {
    match token {
        Token::AtxHeading {
            level, position, ..
        } => Some((*level, *position)),
        Token::SetextHeading {
            underline,
            position,
        } => Some((if *underline == '=' { 1 } else { 2 }, *position)),
        _ => None,
    }
}

/// Heading levels may only increment by one at a time.
pub(crate) fn check(tokens: &[Token]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut last_level = 0usize;
    for token in tokens {
        let Some((level, position)) = heading(token) else {
            continue;
        };
        if last_level != 0 && level > last_level + 1 {
            violations.push(Violation {
                line: position.line,
                column: position.column,
                rule_id: ID,
                rule_name: NAME,
                description: format!(
                    "expected heading level {} or less, found {}",
                    last_level + 1,
                    level
                ),
            });
        }
        last_level = level;
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
    fn skipping_a_level_is_flagged() {
        let found = run("# a\n\n### b\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 3);
        assert_eq!(found[0].rule_id, "MK001");
    }

    #[test]
    fn stepwise_levels_are_clean() {
        assert!(run("# a\n\n## b\n\n### c\n").is_empty());
    }

    #[test]
    fn setext_headings_count_as_levels_one_and_two() {
        assert!(run("Foo\n===\n\nBar\n---\n").is_empty());
        let found = run("Foo\n===\n\n#### deep\n");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn a_document_may_start_at_any_level() {
        assert!(run("### starts deep\n").is_empty());
    }
}
