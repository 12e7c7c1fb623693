//! Shelve CLI library
//!
//! This module contains the core CLI logic for the Shelve layout tool.

pub mod error_adapter;

mod args;
mod config;
mod manifest;

pub use args::Args;

use std::path::{Path, PathBuf};

use log::info;

use shelve::{
    LayoutWriter, PatternList, ShelveError, config::LayoutConfig, entity::Entities,
    policy::ConflictPolicy,
};

/// Run the Shelve CLI application
///
/// Either copies (or links) every file of a manifest into the layout, or
/// writes `--contents` to the single path rendered from the `-e` entities.
/// Command-line flags take precedence over the configuration file.
///
/// # Errors
///
/// Returns `ShelveError` for:
/// - An unknown conflict policy, before anything is written
/// - Configuration, manifest or pattern errors
/// - Unresolvable patterns and destination conflicts
/// - File I/O errors
pub fn run(args: &Args) -> Result<(), ShelveError> {
    let policy_override = args
        .conflicts
        .as_deref()
        .map(str::parse::<ConflictPolicy>)
        .transpose()?;

    let app_config = config::load_config(args.config.as_ref())?;

    let root = args
        .root
        .as_deref()
        .or(app_config.root())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let layout = app_config.layout();
    let policy = policy_override.unwrap_or(layout.conflicts());
    let symbolic_link = args.symlink || layout.symbolic_links();
    let layout =
        LayoutConfig::new(layout.path_patterns()).with_strict(args.strict || layout.strict());

    let patterns = if args.patterns.is_empty() {
        None
    } else {
        Some(PatternList::parse(&args.patterns)?)
    };

    let mut writer = LayoutWriter::new(&root, &layout)?;

    info!(
        root = writer.root().display().to_string(),
        policy:% = policy,
        symbolic_link = symbolic_link;
        "Writing into layout"
    );

    match (&args.manifest, &args.contents) {
        (Some(manifest), None) => {
            let files = manifest::load_manifest(manifest)?;
            let written = writer.write_files(&files, patterns.as_ref(), policy, symbolic_link)?;
            for path in &written {
                info!(path = path.display().to_string(); "Wrote file");
            }
        }
        (None, Some(contents)) => {
            let entities: Entities = args
                .entities
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            let path =
                writer.write_contents_to_file(&entities, patterns.as_ref(), contents, policy)?;
            info!(path = path.display().to_string(); "Wrote file");
        }
        (Some(_), Some(_)) => {
            return Err(ShelveError::Config(
                "a manifest and --contents cannot be used together".to_string(),
            ));
        }
        (None, None) => {
            return Err(ShelveError::Config(
                "nothing to write: pass a manifest or --contents".to_string(),
            ));
        }
    }

    info!(files = writer.files().len(); "Layout updated");
    Ok(())
}
