use std::fmt;

use marlin_core::Token;
use serde::Deserialize;

mod fenced_language;
mod heading_increment;
mod no_multiple_blanks;
mod ul_style;

/// One rule finding, positioned at the token that triggered it.
///
/// Displays as `line:col: RULEID: description (rule-name)`; callers
/// prefix the file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub line: usize,
    pub column: usize,
    pub rule_id: &'static str,
    pub rule_name: &'static str,
    pub description: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {} ({})",
            self.line, self.column, self.rule_id, self.description, self.rule_name
        )
    }
}

/// Which rules run; deserialized from the `[rules]` table of
/// `marlin.toml`. Rules may be disabled by id or by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl RuleConfig {
    fn is_enabled(&self, id: &str, name: &str) -> bool {
        !self
            .disabled
            .iter()
            .any(|entry| entry == id || entry == name)
    }
}

/// Run every enabled rule over the token stream, sorted by position.
pub fn check_all(tokens: &[Token], config: &RuleConfig) -> Vec<Violation> {
    let mut violations = Vec::new();
    if config.is_enabled(heading_increment::ID, heading_increment::NAME) {
        violations.extend(heading_increment::check(tokens));
    }
    if config.is_enabled(no_multiple_blanks::ID, no_multiple_blanks::NAME) {
        violations.extend(no_multiple_blanks::check(tokens));
    }
    if config.is_enabled(ul_style::ID, ul_style::NAME) {
        violations.extend(ul_style::check(tokens));
    }
    if config.is_enabled(fenced_language::ID, fenced_language::NAME) {
        violations.extend(fenced_language::check(tokens));
    }
    violations.sort_by_key(|v| (v.line, v.column));
    violations
}
