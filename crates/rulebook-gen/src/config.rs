//! Generation settings, loaded from `rulebook-gen.toml`.
//!
//! Search order for the config file:
//! 1. An explicit path (the CLI `--config` flag)
//! 2. Current working directory upward for `rulebook-gen.toml`
//! 3. Built-in defaults

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GenError, Result};

pub const CONFIG_FILE_NAME: &str = "rulebook-gen.toml";

pub const DEFAULT_MIN_ARITY: usize = 0;
pub const DEFAULT_MAX_ARITY: usize = 8;

/// Arity the canonical templates are written for.
pub const CANONICAL_ARITY: usize = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub min_arity: usize,
    pub max_arity: usize,
    /// Construct families, without the Func/Action prefix (e.g. `Rule`, `Book`)
    pub constructs: Vec<String>,
    /// Arities produced by a manual path rather than generation
    pub skip_arities: BTreeSet<usize>,
    /// Directory holding the hand-written canonical templates
    pub source_dir: PathBuf,
    /// Directory receiving generated artifacts
    pub output_dir: PathBuf,
    /// File extension of templates and artifacts, without the dot
    pub extension: String,
    /// Prefix naming the value-returning construct (`FuncRule`)
    pub value_prefix: String,
    /// Prefix naming the void construct (`ActionRule`)
    pub void_prefix: String,
    pub directives: Directives,
    pub tokens: TokenScheme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_arity: DEFAULT_MIN_ARITY,
            max_arity: DEFAULT_MAX_ARITY,
            constructs: vec!["Rule".to_string(), "Book".to_string()],
            skip_arities: BTreeSet::from([CANONICAL_ARITY]),
            source_dir: PathBuf::from("BorisTheBrave.RuleBook"),
            output_dir: PathBuf::from("BorisTheBrave.RuleBook/Gen"),
            extension: "cs".to_string(),
            value_prefix: "Func".to_string(),
            void_prefix: "Action".to_string(),
            directives: Directives::default(),
            tokens: TokenScheme::default(),
        }
    }
}

/// Lines inserted below the generated marker so templates can branch on the variant.
/// An empty string disables the directive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Directives {
    pub void: String,
    pub zero: String,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            void: "#define IS_ACTION".to_string(),
            zero: "#define IS_ZERO".to_string(),
        }
    }
}

/// Stems of the positional token families. The canonical template refers to
/// position 1 of each family, i.e. `{stem}1`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenScheme {
    /// Type parameter stem: `TArg1`
    #[serde(rename = "type")]
    pub type_stem: String,
    /// Value argument stem: `arg1`
    #[serde(rename = "argument")]
    pub argument_stem: String,
    /// Covariant type stem: `VArg1`
    #[serde(rename = "covariant")]
    pub covariant_stem: String,
    /// Pattern-binding stem: `varg1`
    #[serde(rename = "binding")]
    pub binding_stem: String,
    /// Return type parameter removed by the void variant: `TRet`
    pub return_type: String,
    /// Name of the value parameter removed by the void variant: `value`
    pub value_param: String,
}

impl Default for TokenScheme {
    fn default() -> Self {
        Self {
            type_stem: "TArg".to_string(),
            argument_stem: "arg".to_string(),
            covariant_stem: "VArg".to_string(),
            binding_stem: "varg".to_string(),
            return_type: "TRet".to_string(),
            value_param: "value".to_string(),
        }
    }
}

impl TokenScheme {
    pub fn type_token(&self, index: usize) -> String {
        format!("{}{}", self.type_stem, index)
    }

    pub fn argument_token(&self, index: usize) -> String {
        format!("{}{}", self.argument_stem, index)
    }

    pub fn covariant_token(&self, index: usize) -> String {
        format!("{}{}", self.covariant_stem, index)
    }

    pub fn binding_token(&self, index: usize) -> String {
        format!("{}{}", self.binding_stem, index)
    }

    /// Canonical (arity-1) text of every positional family.
    pub fn canonical_tokens(&self) -> [String; 4] {
        [
            self.type_token(CANONICAL_ARITY),
            self.argument_token(CANONICAL_ARITY),
            self.covariant_token(CANONICAL_ARITY),
            self.binding_token(CANONICAL_ARITY),
        ]
    }
}

impl Config {
    /// Parse from TOML string
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|source| GenError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GenError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Load an explicit config file, or discover one upward from `start`,
    /// or fall back to defaults.
    pub fn load(explicit: Option<&Path>, start: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        match find_config_file(start) {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_arity > self.max_arity {
            return Err(GenError::InvalidConfig(format!(
                "min_arity ({}) is greater than max_arity ({})",
                self.min_arity, self.max_arity
            )));
        }
        if self.constructs.is_empty() {
            return Err(GenError::InvalidConfig("no constructs configured".to_string()));
        }
        if self.value_prefix.is_empty() || self.void_prefix.is_empty() {
            return Err(GenError::InvalidConfig(
                "value_prefix and void_prefix must not be empty".to_string(),
            ));
        }
        let stems = [
            &self.tokens.type_stem,
            &self.tokens.argument_stem,
            &self.tokens.covariant_stem,
            &self.tokens.binding_stem,
        ];
        if stems.iter().any(|stem| stem.is_empty()) {
            return Err(GenError::InvalidConfig("token stems must not be empty".to_string()));
        }
        Ok(())
    }

    /// Arities generated by the expansion path, ascending.
    pub fn arities(&self) -> impl Iterator<Item = usize> + '_ {
        (self.min_arity..=self.max_arity).filter(|n| !self.skip_arities.contains(n))
    }

    pub fn value_construct(&self, construct: &str) -> String {
        format!("{}{}", self.value_prefix, construct)
    }

    pub fn void_construct(&self, construct: &str) -> String {
        format!("{}{}", self.void_prefix, construct)
    }

    /// `{name}.{arity}.{extension}`
    pub fn file_name(&self, name: &str, arity: usize) -> String {
        format!("{}.{}.{}", name, arity, self.extension)
    }

    /// Relative paths are resolved against `root`.
    pub fn resolve_dirs(&mut self, root: &Path) {
        if self.source_dir.is_relative() {
            self.source_dir = root.join(&self.source_dir);
        }
        if self.output_dir.is_relative() {
            self.output_dir = root.join(&self.output_dir);
        }
    }
}

/// Find a config file by searching upward from a starting directory.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
