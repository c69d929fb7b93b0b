use marlin_core::Token;

use crate::Violation;

pub(crate) const ID: &str = "MK015";
pub(crate) const NAME: &str = "ul-style";

/// Every unordered list in a document uses the bullet character the
/// first one chose.
pub(crate) fn check(tokens: &[Token]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut expected: Option<char> = None;
    for token in tokens {
        let Token::UnorderedList {
            marker, position, ..
        } = token
        else {
            continue;
        };
        match expected {
            None => expected = Some(*marker),
            Some(first) if first != *marker => {
                violations.push(Violation {
                    line: position.line,
                    column: position.column,
                    rule_id: ID,
                    rule_name: NAME,
                    description: format!("expected '{first}' bullet, found '{marker}'"),
                });
            }
            Some(_) => {}
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
    fn consistent_bullets_are_clean() {
        assert!(run("- a\n- b\n\n- c\n").is_empty());
    }

    #[test]
    fn switching_bullets_is_flagged() {
        let found = run("- a\n\n* b\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "expected '-' bullet, found '*'");
    }
}
