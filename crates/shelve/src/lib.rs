//! Shelve - materialize files at locations computed from path patterns.
//!
//! A path pattern such as `sub-{subject}/[ses-{session}/]{task}.nii.gz` is
//! rendered against a mapping of entity names to values. The first pattern
//! in a list that renders completely decides where a file goes; the file is
//! then copied, linked or written there under a [`ConflictPolicy`].
//!
//! [`LayoutWriter`] is the entry point for most uses. [`Resolver`] and
//! [`materialize`] expose the two halves separately.
//!
//! [`ConflictPolicy`]: policy::ConflictPolicy

pub mod config;

mod error;
mod materialize;
mod resolver;
mod writer;

pub use shelve_core::{entity, policy};
pub use shelve_pattern::{Pattern, PatternError, PatternList, Unresolved};

pub use error::ShelveError;
pub use materialize::{MAX_APPEND_ATTEMPTS, Materialized, Payload, materialize};
pub use resolver::{Resolver, Target, TargetKind};
pub use writer::{LayoutWriter, SourceFile, TaggedFile};
