//! The two rewrite phases as distinct types.
//!
//! `Line` text can only become a [`ProtectedLine`] through [`ProtectedLine::protect`],
//! and a `ProtectedLine` can only leave the pipeline through
//! [`ProtectedLine::resolve`]. Bare tokens expand while the line is protected,
//! so they can never match inside a compound token.

use super::rules::RewriteRuleSet;

/// Delimiters of a placeholder. Private-use code points never occur in templates.
pub const PLACEHOLDER_OPEN: char = '\u{E000}';
pub const PLACEHOLDER_CLOSE: char = '\u{E001}';

fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_OPEN}{index}{PLACEHOLDER_CLOSE}")
}

pub fn contains_placeholder(text: &str) -> bool {
    text.contains([PLACEHOLDER_OPEN, PLACEHOLDER_CLOSE])
}

/// A line whose compound tokens are captured as placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedLine(String);

impl ProtectedLine {
    /// Replace every compound token with its placeholder, in rule order.
    pub fn protect(rules: &RewriteRuleSet, line: &str) -> Self {
        let mut text = line.to_string();
        for (index, rule) in rules.compounds().iter().enumerate() {
            text = text.replace(rule.pattern(), &placeholder(index));
        }
        Self(text)
    }

    /// Expand every bare positional token into its comma-joined list.
    pub fn expand_bare(self, rules: &RewriteRuleSet, arity: usize) -> Self {
        let mut text = self.0;
        for rule in rules.bares() {
            text = text.replace(rule.pattern(), &rule.expand(arity));
        }
        Self(text)
    }

    /// Turn every placeholder into its expanded compound form.
    pub fn resolve(self, rules: &RewriteRuleSet, arity: usize) -> ResolvedLine {
        let mut text = self.0;
        for (index, rule) in rules.compounds().iter().enumerate() {
            text = text.replace(&placeholder(index), &rule.expand(arity));
        }
        ResolvedLine(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Final text of one line. May still carry a leaked placeholder, which the
/// expander checks before accepting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine(String);

impl ResolvedLine {
    pub fn has_placeholder(&self) -> bool {
        contains_placeholder(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
