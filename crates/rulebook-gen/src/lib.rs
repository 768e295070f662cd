//! Generator for the RuleBook `Func`/`Action` families.
//!
//! A hand-written canonical template exists per construct (`FuncRule`,
//! `FuncBook`), written for a single argument. From it this crate produces:
//! - the void variant (`ActionRule.1`), with return-value tokens removed
//! - every other arity (0..=8 by default) of both variants
//!
//! ```text
//! FuncRule.1   -- derive -->    ActionRule.1
//! FuncRule.1   -- expand(N) --> FuncRule.N
//! ActionRule.1 -- expand(N) --> ActionRule.N
//! ```
//!
//! The rewriting is purely textual. See [`rewrite`] for the rule ordering.

pub mod artifact;
pub mod config;
pub mod driver;
pub mod error;
pub mod rewrite;
pub mod template;
pub mod variant;

pub use artifact::{Artifact, ArtifactWriter, WriteOutcome};
pub use config::Config;
pub use driver::{GenerationPlan, Generator, ReportEntry, RunReport, Step, Variant};
pub use error::{GenError, Result};
pub use rewrite::{ArityExpander, ZeroArityCleaner};
pub use template::Template;
pub use variant::VariantDeriver;
