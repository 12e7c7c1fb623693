//! # Shelve Pattern
//!
//! Parser and renderer for the Shelve path-pattern language. A pattern is
//! plain text with three kinds of markup:
//!
//! - `{name}` - a required placeholder, filled from the entity `name`
//! - `[...]` - an optional group, kept only if all its placeholders resolve
//! - `{name<regex>}` / `{name|default}` - value constraints and defaults
//!
//! ## Usage
//!
//! ```
//! # use shelve_core::entity::Entities;
//! # use shelve_pattern::{Pattern, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let pattern = Pattern::parse("sub-{subject}/[ses-{session}/]{task}.nii.gz")?;
//!     let entities = Entities::new().with("subject", "01").with("task", "rest");
//!
//!     assert_eq!(pattern.render(&entities).unwrap(), "sub-01/rest.nii.gz");
//!     Ok(())
//! }
//! ```
//!
//! Parsing runs in two phases, each collecting every diagnostic it finds:
//!
//! 1. **Tokenize** - Split text into literals, placeholders and brackets
//! 2. **Build** - Check group structure and compile value constraints

pub mod error;

mod lexer;
mod parser;
mod pattern;
mod span;
mod tokens;

pub use pattern::{
    Constraint, Pattern, PatternError, PatternList, Placeholder, Segment, Unresolved,
};
pub use span::Span;
