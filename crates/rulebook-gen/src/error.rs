//! Error types for template generation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenError>;

#[derive(Debug, Error)]
pub enum GenError {
    /// A configured construct has no canonical source. Aborts the whole run.
    #[error("missing canonical template for `{construct}` at {}", path.display())]
    MissingTemplate { construct: String, path: PathBuf },

    #[error("template `{source_id}` is empty")]
    EmptyTemplate { source_id: String },

    #[error("failed to read template {}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delete/create/permission failure for one artifact. Siblings are unaffected.
    #[error("failed to write artifact {}", destination.display())]
    WriteFailure {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal invariant violation in the rewrite pipeline. Always fatal.
    #[error("malformed expansion of `{source_id}` at arity {arity}, line {line}: {reason}")]
    MalformedExpansion {
        source_id: String,
        arity: usize,
        line: usize,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
