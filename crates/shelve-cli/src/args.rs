//! Command-line argument definitions for the Shelve CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input (a manifest of tagged files or
//! inline contents), the patterns and output root, the write behavior, and
//! logging verbosity.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the Shelve layout tool
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Manifest (TOML) listing the files to write and their entities
    #[arg(help = "Path to a manifest of tagged files")]
    pub manifest: Option<PathBuf>,

    /// Directory that relative patterns are resolved against
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Path pattern; may be repeated, earlier patterns win
    #[arg(short, long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Entity for `--contents`, as KEY=VALUE; may be repeated
    #[arg(short, long = "entity", value_name = "KEY=VALUE", value_parser = parse_entity)]
    pub entities: Vec<(String, String)>,

    /// Write this text instead of copying manifest files
    #[arg(long)]
    pub contents: Option<String>,

    /// Conflict policy (fail, skip, append, overwrite)
    #[arg(long)]
    pub conflicts: Option<String>,

    /// Link to source files instead of copying them
    #[arg(long)]
    pub symlink: bool,

    /// Only use patterns that name every entity
    #[arg(long)]
    pub strict: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn parse_entity(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "shelve",
            "files.toml",
            "--root",
            "out",
            "-p",
            "{task}/{run}.txt",
            "-p",
            "{task}.txt",
            "--conflicts",
            "append",
            "--symlink",
        ])
        .unwrap();

        assert_eq!(args.manifest, Some(PathBuf::from("files.toml")));
        assert_eq!(args.patterns, vec!["{task}/{run}.txt", "{task}.txt"]);
        assert_eq!(args.conflicts.as_deref(), Some("append"));
        assert!(args.symlink);
        assert!(!args.strict);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_entities_keep_text_values() {
        let args = Args::try_parse_from(["shelve", "-e", "run=01", "-e", "desc=a=b"]).unwrap();

        assert_eq!(
            args.entities,
            vec![
                ("run".to_string(), "01".to_string()),
                ("desc".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn test_entity_without_key_rejected() {
        assert!(Args::try_parse_from(["shelve", "-e", "=01"]).is_err());
        assert!(Args::try_parse_from(["shelve", "-e", "run"]).is_err());
    }
}
