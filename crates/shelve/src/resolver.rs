//! Path resolution over ordered pattern lists.
//!
//! A [`Resolver`] renders each candidate pattern in turn and returns the
//! first one that renders completely, joined onto its root directory.

use std::path::{self, Component, Path, PathBuf};

use log::debug;

use shelve_core::entity::Entities;
use shelve_pattern::{Pattern, PatternList};

use crate::error::ShelveError;

/// Whether a resolved path names a file or a directory to write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The path is the file to write.
    File,

    /// The path is a directory; the source's own file name is appended.
    Directory,
}

/// An absolute destination produced by a [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    path: PathBuf,
    kind: TargetKind,
}

impl Target {
    pub fn new(path: impl Into<PathBuf>, kind: TargetKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == TargetKind::Directory
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Resolves pattern lists against entity mappings under a root directory.
///
/// # Examples
///
/// ```
/// use shelve::{Resolver, TargetKind, entity::Entities, PatternList};
///
/// let patterns = PatternList::parse([
///     "{session}/{task}/r-{run}.nii.gz",
///     "t-{task}/{subject}-{run}.nii.gz",
/// ]).unwrap();
/// let entities = Entities::new()
///     .with("task", "rest")
///     .with("subject", "3")
///     .with("run", 2);
///
/// let target = Resolver::new("/data").resolve(&patterns, &entities).unwrap();
/// assert_eq!(target.path(), std::path::Path::new("/data/t-rest/3-2.nii.gz"));
/// assert_eq!(target.kind(), TargetKind::File);
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    strict: bool,
}

impl Resolver {
    /// Create a resolver for relative patterns under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strict: false,
        }
    }

    /// In strict mode a pattern is only a candidate if it names every
    /// entity in the mapping.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Resolve the first pattern that renders completely.
    ///
    /// Later patterns are never consulted once one succeeds. Patterns whose
    /// own text is absolute are used as they are; all others are nested
    /// under the root and made absolute, even when an entity value starts
    /// with a separator.
    ///
    /// # Errors
    ///
    /// - [`ShelveError::NoPatternResolved`] if the list is empty or no
    ///   pattern renders.
    /// - [`ShelveError::Io`] if the current directory is needed to make the
    ///   path absolute and cannot be read.
    pub fn resolve(
        &self,
        patterns: &PatternList,
        entities: &Entities,
    ) -> Result<Target, ShelveError> {
        for pattern in patterns {
            if self.strict {
                if let Some(unused) = unused_entity(pattern, entities) {
                    debug!(pattern = pattern.source(), entity = unused; "Pattern skipped in strict mode");
                    continue;
                }
            }

            match pattern.render(entities) {
                Ok(rendered) => {
                    let target = self.target(pattern, &rendered)?;
                    debug!(
                        pattern = pattern.source(),
                        path = target.path().display().to_string(),
                        kind:? = target.kind();
                        "Pattern resolved"
                    );
                    return Ok(target);
                }
                Err(missing) => {
                    debug!(pattern = pattern.source(), missing = missing.placeholder(); "Pattern unresolved");
                }
            }
        }

        Err(ShelveError::NoPatternResolved {
            tried: patterns.len(),
        })
    }

    fn target(&self, pattern: &Pattern, rendered: &str) -> Result<Target, ShelveError> {
        let path = if pattern.is_absolute() {
            PathBuf::from(rendered)
        } else {
            nest_under(&self.root, rendered)
        };
        let path = path::absolute(path)?;

        let kind = if rendered.is_empty() || rendered.ends_with(path::is_separator) {
            TargetKind::Directory
        } else if pattern.ends_with_placeholder_component() && path.is_dir() {
            TargetKind::Directory
        } else {
            TargetKind::File
        };

        Ok(Target { path, kind })
    }
}

/// Append `rendered` below `root`, dropping any root or drive prefix it
/// carries. `Path::join` would replace `root` instead.
fn nest_under(root: &Path, rendered: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in Path::new(rendered).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => path.push(other),
        }
    }
    path
}

/// Returns an entity that `pattern` has no placeholder for, if any.
fn unused_entity<'a>(pattern: &Pattern, entities: &'a Entities) -> Option<&'a str> {
    let names = pattern.placeholder_names();
    entities.names().find(|name| !names.contains(name))
}
