use crate::config::TokenScheme;
use crate::error::{GenError, Result};
use crate::template::Template;

use super::phase::{ProtectedLine, contains_placeholder};
use super::rules::RewriteRuleSet;
use super::zero::ZeroArityCleaner;

/// Expands an arity-1 template to any arity. Pure: the output depends only on
/// the template lines and the arity.
#[derive(Debug, Clone)]
pub struct ArityExpander {
    rules: RewriteRuleSet,
    cleaner: ZeroArityCleaner,
}

impl ArityExpander {
    pub fn new(tokens: &TokenScheme) -> Self {
        Self {
            rules: RewriteRuleSet::new(tokens),
            cleaner: ZeroArityCleaner::new(tokens),
        }
    }

    /// Expand every body line. A leading marker line is copied as is.
    pub fn expand(&self, template: &Template, arity: usize) -> Result<Template> {
        let header = usize::from(template.has_marker());
        let mut lines = Vec::with_capacity(template.lines().len());
        for (index, line) in template.lines().iter().enumerate() {
            if index < header {
                lines.push(line.clone());
            } else {
                lines.push(self.expand_line(line, arity).map_err(|reason| {
                    GenError::MalformedExpansion {
                        source_id: template.source_id().to_string(),
                        arity,
                        line: index + 1,
                        reason,
                    }
                })?);
            }
        }
        let expanded = template.with_lines(lines)?;

        if arity == 0 {
            self.cleaner.clean(&expanded)
        } else {
            Ok(expanded)
        }
    }

    /// One line through strip (arity 0 only), protect, bare expansion and resolve.
    pub fn expand_line(&self, line: &str, arity: usize) -> std::result::Result<String, String> {
        if contains_placeholder(line) {
            return Err("template text contains a placeholder sentinel".to_string());
        }

        let stripped;
        let line = if arity == 0 {
            stripped = self.rules.strip_for_zero(line);
            stripped.as_str()
        } else {
            line
        };

        let resolved = ProtectedLine::protect(&self.rules, line)
            .expand_bare(&self.rules, arity)
            .resolve(&self.rules, arity);
        if resolved.has_placeholder() {
            return Err("placeholder leaked into output".to_string());
        }
        Ok(resolved.into_string())
    }
}

impl Default for ArityExpander {
    fn default() -> Self {
        Self::new(&TokenScheme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_one(line: &str, arity: usize) -> String {
        let template = Template::parse("FuncRule.1.cs", line).unwrap();
        let expanded = ArityExpander::default().expand(&template, arity).unwrap();
        expanded.lines()[0].clone()
    }

    #[test]
    fn test_generic_and_parameters() {
        assert_eq!(
            expand_one("TRule<TArg1, TRet> Apply(TArg1 arg1)", 3),
            "TRule<TArg1, TArg2, TArg3, TRet> Apply(TArg1 arg1, TArg2 arg2, TArg3 arg3)"
        );
    }

    #[test]
    fn test_constraint_pairing() {
        assert_eq!(
            expand_one("where VArg1 : TArg1", 2),
            "where VArg1 : TArg1 where VArg2 : TArg2"
        );
    }

    #[test]
    fn test_type_check_condition() {
        assert_eq!(
            expand_one("r2.Condition = (arg1) => arg1 is VArg1 varg1 && r.Condition(varg1);", 2),
            "r2.Condition = (arg1, arg2) => arg1 is VArg1 varg1 && arg2 is VArg2 varg2 && r.Condition(varg1, varg2);"
        );
    }

    #[test]
    fn test_narrowing_cast() {
        assert_eq!(
            expand_one("r2.FuncBody = (arg1) => r.FuncBody((VArg1)arg1);", 3),
            "r2.FuncBody = (arg1, arg2, arg3) => r.FuncBody((VArg1)arg1, (VArg2)arg2, (VArg3)arg3);"
        );
    }

    #[test]
    fn test_arity_one_is_identity() {
        let text = "public class FuncBook<TArg1, TRet>\n\
                    OfType<VArg1>() where VArg1 : TArg1\n\
                    arg1 is VArg1 varg1 && r.Condition(varg1)\n\
                    r.FuncBody((VArg1)arg1)\n\
                    public TRet Invoke(TArg1 arg1)";
        let template = Template::parse("FuncBook.1.cs", text).unwrap();
        let expanded = ArityExpander::default().expand(&template, 1).unwrap();
        assert_eq!(expanded, template);
    }

    #[test]
    fn test_zero_arity() {
        assert_eq!(expand_one("TRule<TArg1> Apply(TArg1 arg1)", 0), "TRule Apply()");
        assert_eq!(expand_one("Func<TArg1, TRet> f;", 0), "Func<TRet> f;");
        assert_eq!(expand_one("Invoke(TArg1 arg1, TRet value)", 0), "Invoke(TRet value)");
        assert_eq!(expand_one("Func<TRet, TArg1> g;", 0), "Func<TRet> g;");
    }

    #[test]
    fn test_zero_arity_compound_in_list() {
        let template = Template::parse(
            "FuncBook.1.cs",
            "r.Fire((VArg1)arg1, extra);\nr.Check(arg1 is VArg1 varg1, extra);",
        )
        .unwrap();
        let expanded = ArityExpander::default().expand(&template, 0).unwrap();
        assert_eq!(expanded.lines(), ["r.Fire(extra);", "r.Check(extra);"]);
    }

    #[test]
    fn test_deterministic() {
        let template = Template::parse("a.cs", "Wrap(Func<TArg1, TRet> f, TArg1 arg1)").unwrap();
        let expander = ArityExpander::default();
        for arity in 0..=8 {
            assert_eq!(
                expander.expand(&template, arity).unwrap(),
                expander.expand(&template, arity).unwrap()
            );
        }
    }

    #[test]
    fn test_marker_line_copied() {
        let template = Template::parse(
            "a.cs",
            "// This file is generated, please edit source in TArg1.cs\nFoo(TArg1 arg1)",
        )
        .unwrap();
        let expanded = ArityExpander::default().expand(&template, 2).unwrap();
        assert_eq!(expanded.lines()[0], template.lines()[0]);
        assert_eq!(expanded.lines()[1], "Foo(TArg1 arg1, TArg2 arg2)");
    }

    #[test]
    fn test_sentinel_in_template_is_rejected() {
        let template = Template::parse("a.cs", "ok\nbad \u{E000}0\u{E001}").unwrap();
        let err = ArityExpander::default().expand(&template, 2).unwrap_err();
        assert!(matches!(err, GenError::MalformedExpansion { line: 2, arity: 2, .. }));
    }
}
