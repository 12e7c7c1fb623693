//! Manifest loading: the list of tagged files to write.
//!
//! A manifest is a TOML document with one `[[file]]` table per source:
//!
//! ```toml
//! [[file]]
//! path = "raw/sub-01_task-rest_bold.nii.gz"
//! entities = { subject = "01", task = "rest", run = 1 }
//! ```
//!
//! Relative source paths are taken relative to the manifest's directory.

use std::{fs, path::Path};

use log::debug;
use serde::Deserialize;

use shelve::{ShelveError, SourceFile, TaggedFile};

use crate::config::ConfigError;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "file")]
    files: Vec<TaggedFile>,
}

/// Read the tagged files listed in the manifest at `path`.
///
/// # Errors
///
/// Returns [`ShelveError::Io`] if the manifest cannot be read and
/// [`ShelveError::Config`] if it is not a valid manifest.
pub fn load_manifest(path: &Path) -> Result<Vec<TaggedFile>, ShelveError> {
    let content = fs::read_to_string(path)?;
    let manifest: Manifest =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let base = path.parent().unwrap_or(Path::new(""));
    let files: Vec<_> = manifest
        .files
        .into_iter()
        .map(|file| {
            if file.path().is_relative() {
                let resolved = base.join(file.path());
                file.with_path(resolved)
            } else {
                file
            }
        })
        .collect();

    debug!(manifest = path.display().to_string(), files = files.len(); "Manifest loaded");
    Ok(files)
}
