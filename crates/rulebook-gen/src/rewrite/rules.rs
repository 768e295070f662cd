//! The rewrite rule set: which literal tokens expand, and how.
//!
//! Every rule is described by an [`IndexedForm`], a piece of text with an
//! index hole. The canonical template uses the form rendered at index 1, and
//! expansion to arity N renders indices `1..=N` and joins them.

use crate::config::{CANONICAL_ARITY, TokenScheme};

/// Text with an `{i}` hole for the positional index, e.g. `TArg{i} arg{i}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedForm(String);

impl IndexedForm {
    pub const HOLE: &'static str = "{i}";

    pub fn new(form: impl Into<String>) -> Self {
        Self(form.into())
    }

    pub fn render(&self, index: usize) -> String {
        self.0.replace(Self::HOLE, &index.to_string())
    }

    /// Rendered at the canonical arity; this is what rules match against.
    pub fn canonical(&self) -> String {
        self.render(CANONICAL_ARITY)
    }

    /// Positions `1..=arity` joined with `separator`. Empty for arity 0.
    pub fn join(&self, arity: usize, separator: &str) -> String {
        (1..=arity)
            .map(|index| self.render(index))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Grammatical role of an expanded list, deciding its separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    /// Parameter and argument lists
    List,
    /// Generic constraints that must all hold
    Constraint,
    /// Runtime conditions that must all hold
    Condition,
}

impl Joiner {
    pub fn separator(self) -> &'static str {
        match self {
            Joiner::List => ", ",
            Joiner::Constraint => " where ",
            Joiner::Condition => " && ",
        }
    }
}

/// A token that contains other, shorter tokens. Captured as a placeholder
/// before any bare token expands.
#[derive(Debug, Clone)]
pub struct CompoundRule {
    pub name: &'static str,
    pub form: IndexedForm,
    pub joiner: Joiner,
    pattern: String,
}

impl CompoundRule {
    fn new(name: &'static str, form: String, joiner: Joiner) -> Self {
        let form = IndexedForm::new(form);
        let pattern = form.canonical();
        Self {
            name,
            form,
            joiner,
            pattern,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn expand(&self, arity: usize) -> String {
        self.form.join(arity, self.joiner.separator())
    }
}

/// A single positional token, expanded to its comma-joined list.
#[derive(Debug, Clone)]
pub struct BareRule {
    pub form: IndexedForm,
    pattern: String,
}

impl BareRule {
    fn new(stem: &str) -> Self {
        let form = IndexedForm::new(format!("{}{}", stem, IndexedForm::HOLE));
        let pattern = form.canonical();
        Self { form, pattern }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn expand(&self, arity: usize) -> String {
        self.form.join(arity, Joiner::List.separator())
    }
}

/// Ordered rules for one token scheme. The order of each list is significant.
#[derive(Debug, Clone)]
pub struct RewriteRuleSet {
    /// `token, ` patterns removed outright when expanding to arity 0
    zero_strips: Vec<String>,
    compounds: Vec<CompoundRule>,
    bares: Vec<BareRule>,
}

impl RewriteRuleSet {
    pub fn new(tokens: &TokenScheme) -> Self {
        let hole = IndexedForm::HOLE;
        let t = format!("{}{}", tokens.type_stem, hole);
        let a = format!("{}{}", tokens.argument_stem, hole);
        let v = format!("{}{}", tokens.covariant_stem, hole);
        let b = format!("{}{}", tokens.binding_stem, hole);

        let compounds = vec![
            CompoundRule::new("constraint pairing", format!("{v} : {t}"), Joiner::Constraint),
            CompoundRule::new("parameter declaration", format!("{t} {a}"), Joiner::List),
            CompoundRule::new("type-check binding", format!("{a} is {v} {b}"), Joiner::Condition),
            CompoundRule::new("binding", b.clone(), Joiner::List),
            CompoundRule::new("narrowing cast", format!("({v}){a}"), Joiner::List),
        ];

        let bares = vec![
            BareRule::new(&tokens.type_stem),
            BareRule::new(&tokens.argument_stem),
            BareRule::new(&tokens.covariant_stem),
        ];

        // Every compound before the bare tokens it contains, longest first,
        // and the binding before the argument it ends with.
        let mut compound_strips: Vec<String> =
            compounds.iter().map(|rule| rule.pattern().to_string()).collect();
        compound_strips.sort_by_key(|pattern| std::cmp::Reverse(pattern.len()));
        let mut zero_strips: Vec<String> = Vec::new();
        for form in compound_strips
            .into_iter()
            .chain([t, v, b, a].iter().map(|form| IndexedForm::new(form.as_str()).canonical()))
        {
            let strip = format!("{}, ", form);
            if !zero_strips.contains(&strip) {
                zero_strips.push(strip);
            }
        }

        Self {
            zero_strips,
            compounds,
            bares,
        }
    }

    pub fn compounds(&self) -> &[CompoundRule] {
        &self.compounds
    }

    pub fn bares(&self) -> &[BareRule] {
        &self.bares
    }

    /// Collapse list entries for arity 0 so no separator dangles.
    pub fn strip_for_zero(&self, line: &str) -> String {
        let mut text = line.to_string();
        for pattern in &self.zero_strips {
            text = text.replace(pattern.as_str(), "");
        }
        text
    }
}

impl Default for RewriteRuleSet {
    fn default() -> Self {
        Self::new(&TokenScheme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_form_join() {
        let form = IndexedForm::new("TArg{i} arg{i}");
        assert_eq!(form.canonical(), "TArg1 arg1");
        assert_eq!(form.join(3, ", "), "TArg1 arg1, TArg2 arg2, TArg3 arg3");
        assert_eq!(form.join(0, ", "), "");
    }

    #[test]
    fn test_compound_patterns() {
        let rules = RewriteRuleSet::default();
        let patterns: Vec<&str> = rules.compounds().iter().map(|r| r.pattern()).collect();
        assert_eq!(
            patterns,
            vec!["VArg1 : TArg1", "TArg1 arg1", "arg1 is VArg1 varg1", "varg1", "(VArg1)arg1"]
        );
    }

    #[test]
    fn test_compound_joiners() {
        let rules = RewriteRuleSet::default();
        let expanded: Vec<String> = rules.compounds().iter().map(|r| r.expand(2)).collect();
        assert_eq!(
            expanded,
            vec![
                "VArg1 : TArg1 where VArg2 : TArg2",
                "TArg1 arg1, TArg2 arg2",
                "arg1 is VArg1 varg1 && arg2 is VArg2 varg2",
                "varg1, varg2",
                "(VArg1)arg1, (VArg2)arg2",
            ]
        );
    }

    #[test]
    fn test_bare_patterns() {
        let rules = RewriteRuleSet::default();
        let patterns: Vec<&str> = rules.bares().iter().map(|r| r.pattern()).collect();
        assert_eq!(patterns, vec!["TArg1", "arg1", "VArg1"]);
        assert_eq!(rules.bares()[2].expand(3), "VArg1, VArg2, VArg3");
    }

    #[test]
    fn test_strip_for_zero() {
        let rules = RewriteRuleSet::default();
        assert_eq!(rules.strip_for_zero("Func<TArg1, TRet>"), "Func<TRet>");
        assert_eq!(rules.strip_for_zero("Invoke(TArg1 arg1, TRet value)"), "Invoke(TRet value)");
        assert_eq!(rules.strip_for_zero("Wrap(arg1, other)"), "Wrap(other)");
        assert_eq!(rules.strip_for_zero("Apply(varg1, other)"), "Apply(other)");
        assert_eq!(rules.strip_for_zero("Of<VArg1, TRet>"), "Of<TRet>");
        assert_eq!(rules.strip_for_zero("Fire((VArg1)arg1, extra)"), "Fire(extra)");
        assert_eq!(rules.strip_for_zero("Check(arg1 is VArg1 varg1, extra)"), "Check(extra)");
    }

    #[test]
    fn test_zero_strip_order() {
        let rules = RewriteRuleSet::default();
        assert_eq!(
            rules.zero_strips,
            vec![
                "arg1 is VArg1 varg1, ",
                "VArg1 : TArg1, ",
                "(VArg1)arg1, ",
                "TArg1 arg1, ",
                "varg1, ",
                "TArg1, ",
                "VArg1, ",
                "arg1, ",
            ]
        );
    }

    #[test]
    fn test_custom_scheme() {
        let tokens = TokenScheme {
            type_stem: "T".to_string(),
            argument_stem: "x".to_string(),
            ..TokenScheme::default()
        };
        let rules = RewriteRuleSet::new(&tokens);
        assert_eq!(rules.compounds()[1].pattern(), "T1 x1");
        assert_eq!(rules.compounds()[1].expand(2), "T1 x1, T2 x2");
    }
}
