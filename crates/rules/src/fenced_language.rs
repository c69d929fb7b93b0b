use marlin_core::Token;

use crate::Violation;

pub(crate) const ID: &str = "MK024";
pub(crate) const NAME: &str = "fenced-language";

/// Fenced code blocks should name their language.
pub(crate) fn check(tokens: &[Token]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for token in tokens {
        let Token::FencedCodeBlock { info, position, .. } = token else {
            continue;
        };
        if info.trim().is_empty() {
            violations.push(Violation {
                line: position.line,
                column: position.column,
                rule_id: ID,
                rule_name: NAME,
                description: "fenced code block is missing a language".to_string(),
            });
        }
    }
    violations
}
