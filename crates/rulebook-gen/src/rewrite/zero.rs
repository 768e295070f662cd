//! Post-pass for arity 0.
//!
//! Expanding to zero parameters empties generic argument lists. What is left
//! behind (`Name<>`, `Name{}`, `, )`) is removed here, and the result is
//! checked for positional tokens that should no longer exist.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::TokenScheme;
use crate::error::{GenError, Result};
use crate::template::Template;

/// An identifier directly followed by an empty type-argument list or an empty
/// doc-reference list (`FuncRule{}` in `cref` attributes).
static EMPTY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)(?:<>|\{\})").expect("empty suffix pattern is valid")
});

/// Separators left dangling in front of a closing delimiter.
const DANGLING_SEPARATORS: [(&str, &str); 3] = [(", )", ")"), (", >", ">"), (", }", "}")];

#[derive(Debug, Clone)]
pub struct ZeroArityCleaner {
    /// Canonical positional tokens of every family
    residual_tokens: Vec<String>,
}

impl ZeroArityCleaner {
    pub fn new(tokens: &TokenScheme) -> Self {
        Self {
            residual_tokens: tokens.canonical_tokens().to_vec(),
        }
    }

    pub fn clean_line(&self, line: &str) -> String {
        let mut text = EMPTY_SUFFIX_RE.replace_all(line, "$1").into_owned();
        for (dangling, closed) in DANGLING_SEPARATORS {
            text = text.replace(dangling, closed);
        }
        text
    }

    /// First positional token still present in `line`, if any.
    pub fn residual_token<'a>(&'a self, line: &str) -> Option<&'a str> {
        self.residual_tokens
            .iter()
            .find(|token| line.contains(token.as_str()))
            .map(String::as_str)
    }

    /// Clean every body line of an arity-0 expansion. The marker line is left alone.
    pub fn clean(&self, template: &Template) -> Result<Template> {
        let header = usize::from(template.has_marker());
        let mut lines = Vec::with_capacity(template.lines().len());
        for (index, line) in template.lines().iter().enumerate() {
            if index < header {
                lines.push(line.clone());
                continue;
            }
            let cleaned = self.clean_line(line);
            if let Some(token) = self.residual_token(&cleaned) {
                return Err(GenError::MalformedExpansion {
                    source_id: template.source_id().to_string(),
                    arity: 0,
                    line: index + 1,
                    reason: format!("positional token `{}` survived", token),
                });
            }
            if EMPTY_SUFFIX_RE.is_match(&cleaned) {
                return Err(GenError::MalformedExpansion {
                    source_id: template.source_id().to_string(),
                    arity: 0,
                    line: index + 1,
                    reason: "empty parameter list survived".to_string(),
                });
            }
            lines.push(cleaned);
        }
        template.with_lines(lines)
    }
}

impl Default for ZeroArityCleaner {
    fn default() -> Self {
        Self::new(&TokenScheme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_generic_suffix() {
        let cleaner = ZeroArityCleaner::default();
        assert_eq!(cleaner.clean_line("public class ActionBook<>"), "public class ActionBook");
        assert_eq!(cleaner.clean_line("Action<> body"), "Action body");
        assert_eq!(cleaner.clean_line("TRule<> Apply()"), "TRule Apply()");
    }

    #[test]
    fn test_empty_cref_suffix() {
        let cleaner = ZeroArityCleaner::default();
        assert_eq!(
            cleaner.clean_line(r#"<see cref="ActionRule{}.Condition"/>"#),
            r#"<see cref="ActionRule.Condition"/>"#
        );
    }

    #[test]
    fn test_dangling_separators() {
        let cleaner = ZeroArityCleaner::default();
        assert_eq!(cleaner.clean_line("Func<TRet, >"), "Func<TRet>");
        assert_eq!(cleaner.clean_line("Invoke(x, )"), "Invoke(x)");
        assert_eq!(cleaner.clean_line("FuncRule{TRet, }"), "FuncRule{TRet}");
    }

    #[test]
    fn test_leaves_non_empty_lists() {
        let cleaner = ZeroArityCleaner::default();
        let line = "Func<FuncRule<TRet>, IRuleResult> body = () => {};";
        assert_eq!(cleaner.clean_line(line), line);
    }

    #[test]
    fn test_residual_token_is_malformed() {
        let cleaner = ZeroArityCleaner::default();
        let template = Template::parse("a.cs", "ok\nstill TArg1 here").unwrap();
        let err = cleaner.clean(&template).unwrap_err();
        match err {
            GenError::MalformedExpansion { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("TArg1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_marker_line_untouched() {
        let cleaner = ZeroArityCleaner::default();
        let template = Template::parse("a.cs", "// This file is generated, please edit source in Foo<>.cs\nBar<>")
            .unwrap();
        let cleaned = cleaner.clean(&template).unwrap();
        assert_eq!(cleaned.lines()[0], template.lines()[0]);
        assert_eq!(cleaned.lines()[1], "Bar");
    }
}
