//! Configuration types for Shelve layouts.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! TOML or any other serde format.
//!
//! - [`AppConfig`] - Top-level configuration: output root and layout settings.
//! - [`LayoutConfig`] - Default patterns and write behavior for a
//!   [`LayoutWriter`](crate::LayoutWriter).
//!
//! # Example
//!
//! ```
//! # use shelve::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.layout().path_patterns().is_empty());
//! assert!(config.root().is_none());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use shelve_core::policy::ConflictPolicy;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Directory that relative patterns are resolved against.
    #[serde(default)]
    root: Option<PathBuf>,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    pub fn new(root: Option<PathBuf>, layout: LayoutConfig) -> Self {
        Self { root, layout }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }
}

/// Layout settings: the default pattern list and how files are written.
///
/// The pattern list is parsed once when a [`LayoutWriter`](crate::LayoutWriter)
/// is constructed and is used whenever a call supplies no patterns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutConfig {
    /// Default path patterns, tried in order.
    #[serde(default)]
    path_patterns: Vec<String>,

    /// Default conflict policy.
    #[serde(default)]
    conflicts: ConflictPolicy,

    /// Link to sources instead of copying them.
    #[serde(default)]
    symbolic_links: bool,

    /// Only accept patterns that name every supplied entity.
    #[serde(default)]
    strict: bool,
}

impl LayoutConfig {
    /// Creates a [`LayoutConfig`] with the given default patterns and
    /// default settings otherwise.
    pub fn new<I, S>(path_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path_patterns: path_patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_conflicts(mut self, conflicts: ConflictPolicy) -> Self {
        self.conflicts = conflicts;
        self
    }

    pub fn with_symbolic_links(mut self, symbolic_links: bool) -> Self {
        self.symbolic_links = symbolic_links;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn path_patterns(&self) -> &[String] {
        &self.path_patterns
    }

    pub fn conflicts(&self) -> ConflictPolicy {
        self.conflicts
    }

    pub fn symbolic_links(&self) -> bool {
        self.symbolic_links
    }

    pub fn strict(&self) -> bool {
        self.strict
    }
}
