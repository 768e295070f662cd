//! Derivation of the void ("Action") canonical template from the
//! value-returning ("Func") one.
//!
//! Runs before arity expansion, on the arity-1 text, and never touches
//! positional tokens.

use crate::config::Config;
use crate::error::Result;
use crate::template::Template;

#[derive(Debug, Clone)]
pub struct VariantDeriver {
    /// Return-value tokens, longest first
    removals: Vec<String>,
    /// Value construct name to void construct name
    renames: Vec<(String, String)>,
    directive: String,
}

impl VariantDeriver {
    pub fn new(config: &Config) -> Self {
        let tokens = &config.tokens;
        let mut removals = vec![
            format!(", {} {}", tokens.return_type, tokens.value_param),
            format!("{} {}", tokens.return_type, tokens.value_param),
            format!(", {}", tokens.return_type),
        ];
        // No removal may fire inside a longer one.
        removals.sort_by_key(|token| std::cmp::Reverse(token.len()));

        let renames = config
            .constructs
            .iter()
            .map(|construct| (config.value_construct(construct), config.void_construct(construct)))
            .collect();

        Self {
            removals,
            renames,
            directive: config.directives.void.clone(),
        }
    }

    pub fn derive_line(&self, line: &str) -> String {
        let mut text = line.to_string();
        for token in &self.removals {
            text = text.replace(token.as_str(), "");
        }
        for (value, void) in &self.renames {
            text = text.replace(value.as_str(), void);
        }
        text
    }

    /// The void template carries the marker of its value-returning source and
    /// the void directive. The input is left untouched.
    pub fn derive(&self, template: &Template) -> Result<Template> {
        let header = usize::from(template.has_marker());
        let lines = template
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if index < header {
                    line.clone()
                } else {
                    self.derive_line(line)
                }
            })
            .collect();
        Ok(template
            .with_lines(lines)?
            .with_marker(template.source_id())
            .with_directive(&self.directive))
    }
}
