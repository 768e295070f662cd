//! Textual arity expansion.
//!
//! Lines are opaque text. An arity-1 line becomes an arity-N line through an
//! ordered pass: protect compound tokens, expand bare tokens, resolve the
//! protected compounds. Arity 0 additionally strips list entries up front and
//! runs the [`ZeroArityCleaner`] afterwards.

mod expander;
mod phase;
mod rules;
mod zero;

pub use expander::ArityExpander;
pub use phase::{ProtectedLine, ResolvedLine, contains_placeholder};
pub use rules::{BareRule, CompoundRule, IndexedForm, Joiner, RewriteRuleSet};
pub use zero::ZeroArityCleaner;
