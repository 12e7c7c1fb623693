//! Batch and single-shot writing into a pattern-defined layout.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use log::{debug, info};
use serde::Deserialize;

use shelve_core::{entity::Entities, policy::ConflictPolicy};
use shelve_pattern::PatternList;

use crate::{
    config::LayoutConfig,
    error::ShelveError,
    materialize::{Materialized, Payload, materialize},
    resolver::{Resolver, Target},
};

/// A file to be placed into a layout, described by its own entities.
pub trait SourceFile {
    /// Location of the existing file.
    fn path(&self) -> &Path;

    /// Entities used to resolve the file's destination.
    fn entities(&self) -> &Entities;
}

impl<T: SourceFile + ?Sized> SourceFile for &T {
    fn path(&self) -> &Path {
        (**self).path()
    }

    fn entities(&self) -> &Entities {
        (**self).entities()
    }
}

/// A source path paired with its entity mapping.
///
/// Deserializes from tables such as
///
/// ```toml
/// path = "raw/sub-03_task-rest_bold.nii.gz"
/// entities = { subject = "03", task = "rest" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaggedFile {
    path: PathBuf,
    #[serde(default)]
    entities: Entities,
}

impl TaggedFile {
    pub fn new(path: impl Into<PathBuf>, entities: Entities) -> Self {
        Self {
            path: path.into(),
            entities,
        }
    }

    /// Replace the source path, keeping the entities.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

impl SourceFile for TaggedFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn entities(&self) -> &Entities {
        &self.entities
    }
}

/// Writes files into a directory tree laid out by path patterns.
///
/// The writer keeps a record of every path it has produced. Calls that pass
/// no patterns fall back to the default list from the [`LayoutConfig`] the
/// writer was built with.
///
/// # Examples
///
/// ```rust,no_run
/// use shelve::{LayoutWriter, config::LayoutConfig, entity::Entities, policy::ConflictPolicy};
///
/// let config = LayoutConfig::new(["sub-{subject}/[ses-{session}/]{task}.txt"]);
/// let mut writer = LayoutWriter::new("/data/derivatives", &config)
///     .expect("default patterns are valid");
///
/// let entities = Entities::new().with("subject", "01").with("task", "rest");
/// let path = writer
///     .write_contents_to_file(&entities, None, "notes", ConflictPolicy::Fail)
///     .expect("write succeeds");
///
/// assert!(writer.contains(&path));
/// ```
#[derive(Debug)]
pub struct LayoutWriter {
    resolver: Resolver,
    default_patterns: PatternList,
    files: IndexSet<PathBuf>,
}

impl LayoutWriter {
    /// Create a writer rooted at `root`.
    ///
    /// The default pattern list is parsed here, once.
    ///
    /// # Errors
    ///
    /// Returns [`ShelveError::Pattern`] if any default pattern is malformed.
    pub fn new(root: impl Into<PathBuf>, config: &LayoutConfig) -> Result<Self, ShelveError> {
        let default_patterns = PatternList::parse(config.path_patterns())?;
        let resolver = Resolver::new(root).with_strict(config.strict());

        info!(
            root = resolver.root().display().to_string(),
            default_patterns = default_patterns.len(),
            strict = resolver.is_strict();
            "Layout writer created"
        );

        Ok(Self {
            resolver,
            default_patterns,
            files: IndexSet::new(),
        })
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn default_patterns(&self) -> &PatternList {
        &self.default_patterns
    }

    /// Every path produced so far, in the order it was produced.
    pub fn files(&self) -> &IndexSet<PathBuf> {
        &self.files
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains(path.as_ref())
    }

    /// Resolve a destination without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`ShelveError::NoPatternResolved`] if no candidate renders.
    pub fn build_path(
        &self,
        entities: &Entities,
        patterns: Option<&PatternList>,
    ) -> Result<Target, ShelveError> {
        let patterns = patterns.unwrap_or(&self.default_patterns);
        self.resolver.resolve(patterns, entities)
    }

    /// Copy or link each file to the destination resolved from its own
    /// entities.
    ///
    /// Returns the destination of every file in order. Under
    /// [`ConflictPolicy::Skip`] an existing destination is returned as is.
    ///
    /// # Errors
    ///
    /// The first failure halts the batch. Files written before it stay in
    /// place and stay recorded.
    pub fn write_files<I>(
        &mut self,
        files: I,
        patterns: Option<&PatternList>,
        policy: ConflictPolicy,
        symbolic_link: bool,
    ) -> Result<Vec<PathBuf>, ShelveError>
    where
        I: IntoIterator,
        I::Item: SourceFile,
    {
        let Self {
            resolver,
            default_patterns,
            files: record,
        } = self;
        let patterns = patterns.unwrap_or(&*default_patterns);

        info!(policy:% = policy, symbolic_link = symbolic_link; "Writing files");

        let mut written = Vec::new();
        for file in files {
            let target = resolver.resolve(patterns, file.entities())?;
            let outcome = materialize(&target, Payload::file(file.path(), symbolic_link), policy)?;
            debug!(
                source = file.path().display().to_string(),
                destination = outcome.path().display().to_string();
                "File placed"
            );
            written.push(record_outcome(record, outcome));
        }

        info!(count = written.len(); "Files written");
        Ok(written)
    }

    /// Write `contents` to the path rendered from `entities`.
    ///
    /// # Errors
    ///
    /// Same as [`materialize`](crate::materialize), plus
    /// [`ShelveError::NoPatternResolved`].
    pub fn write_contents_to_file(
        &mut self,
        entities: &Entities,
        patterns: Option<&PatternList>,
        contents: impl AsRef<[u8]>,
        policy: ConflictPolicy,
    ) -> Result<PathBuf, ShelveError> {
        let target = self.build_path(entities, patterns)?;
        let outcome = materialize(&target, Payload::Contents(contents.as_ref()), policy)?;
        info!(path = outcome.path().display().to_string(); "Contents written");
        Ok(record_outcome(&mut self.files, outcome))
    }

    /// Create a symbolic link to `link_target` at the path rendered from
    /// `entities`. The link target is stored exactly as given.
    pub fn link_to_file(
        &mut self,
        entities: &Entities,
        patterns: Option<&PatternList>,
        link_target: impl AsRef<Path>,
        policy: ConflictPolicy,
    ) -> Result<PathBuf, ShelveError> {
        let target = self.build_path(entities, patterns)?;
        let outcome = materialize(&target, Payload::LinkTo(link_target.as_ref()), policy)?;
        info!(
            path = outcome.path().display().to_string(),
            link_target = link_target.as_ref().display().to_string();
            "Link created"
        );
        Ok(record_outcome(&mut self.files, outcome))
    }
}

fn record_outcome(record: &mut IndexSet<PathBuf>, outcome: Materialized) -> PathBuf {
    let path = outcome.into_path();
    record.insert(path.clone());
    path
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn entities() -> Entities {
        Entities::new()
            .with("subject", "Bob")
            .with("session", "01")
            .with("task", "rest")
    }

    #[test]
    fn test_new_rejects_malformed_default_pattern() {
        let config = LayoutConfig::new(["sub-{subject}/{task"]);
        let err = LayoutWriter::new("/data", &config).unwrap_err();

        assert!(matches!(err, ShelveError::Pattern { src, .. } if src == "sub-{subject}/{task"));
    }

    #[test]
    fn test_build_path_uses_default_patterns() {
        let config = LayoutConfig::new(["sub-{subject}/ses-{session}/{task}.txt"]);
        let writer = LayoutWriter::new("/data", &config).unwrap();

        let target = writer.build_path(&entities(), None).unwrap();
        assert_eq!(target.path(), Path::new("/data/sub-Bob/ses-01/rest.txt"));
    }

    #[test]
    fn test_explicit_patterns_replace_defaults() {
        let config = LayoutConfig::new(["sub-{subject}.txt"]);
        let writer = LayoutWriter::new("/data", &config).unwrap();
        let patterns = PatternList::parse(["{task}.txt"]).unwrap();

        let target = writer.build_path(&entities(), Some(&patterns)).unwrap();
        assert_eq!(target.path(), Path::new("/data/rest.txt"));
    }

    #[test]
    fn test_no_patterns_at_all() {
        let writer = LayoutWriter::new("/data", &LayoutConfig::default()).unwrap();

        let err = writer.build_path(&entities(), None).unwrap_err();
        assert!(matches!(err, ShelveError::NoPatternResolved { tried: 0 }));
    }

    #[test]
    fn test_write_contents_records_path() {
        let dir = tempdir().unwrap();
        let config = LayoutConfig::new(["sub-{subject}/sess-{session}/desc.txt"]);
        let mut writer = LayoutWriter::new(dir.path(), &config).unwrap();

        let path = writer
            .write_contents_to_file(&entities(), None, "test", ConflictPolicy::Fail)
            .unwrap();

        assert_eq!(path, dir.path().join("sub-Bob/sess-01/desc.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "test");
        assert!(writer.contains(&path));
    }

    #[test]
    fn test_skipped_path_is_recorded() {
        let dir = tempdir().unwrap();
        let config = LayoutConfig::new(["{task}.txt"]);
        let mut writer = LayoutWriter::new(dir.path(), &config).unwrap();
        fs::write(dir.path().join("rest.txt"), "kept").unwrap();

        let path = writer
            .write_contents_to_file(&entities(), None, "new", ConflictPolicy::Skip)
            .unwrap();

        assert!(writer.contains(&path));
        assert_eq!(fs::read_to_string(path).unwrap(), "kept");
    }

    #[test]
    fn test_write_files_resolves_each_file_separately() {
        let dir = tempdir().unwrap();
        let sources = ["a.txt", "b.txt"].map(|name| dir.path().join(name));
        for source in &sources {
            fs::write(source, source.file_name().unwrap().as_encoded_bytes()).unwrap();
        }
        let files = vec![
            TaggedFile::new(&sources[0], Entities::new().with("run", 1)),
            TaggedFile::new(&sources[1], Entities::new().with("run", 2)),
        ];
        let config = LayoutConfig::new(["out/run-{run}.txt"]);
        let mut writer = LayoutWriter::new(dir.path(), &config).unwrap();

        let written = writer
            .write_files(&files, None, ConflictPolicy::Fail, false)
            .unwrap();

        assert_eq!(
            written,
            vec![dir.path().join("out/run-1.txt"), dir.path().join("out/run-2.txt")]
        );
        assert_eq!(fs::read_to_string(&written[1]).unwrap(), "b.txt");
        assert_eq!(writer.files().len(), 2);
    }

    #[test]
    fn test_write_files_halts_on_first_failure() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();
        let files = [
            TaggedFile::new(&source, Entities::new().with("run", 1)),
            TaggedFile::new(&source, Entities::new().with("run", 1)),
            TaggedFile::new(&source, Entities::new().with("run", 2)),
        ];
        let config = LayoutConfig::new(["run-{run}.txt"]);
        let mut writer = LayoutWriter::new(dir.path(), &config).unwrap();

        let err = writer
            .write_files(&files, None, ConflictPolicy::Fail, false)
            .unwrap_err();

        assert!(matches!(err, ShelveError::DestinationExists(_)));
        assert!(writer.contains(dir.path().join("run-1.txt")));
        assert!(!dir.path().join("run-2.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_link_to_file_keeps_target_verbatim() {
        let dir = tempdir().unwrap();
        let config = LayoutConfig::new(["{task}.lnk"]);
        let mut writer = LayoutWriter::new(dir.path(), &config).unwrap();

        let path = writer
            .link_to_file(&entities(), None, "../elsewhere/file", ConflictPolicy::Fail)
            .unwrap();

        assert_eq!(fs::read_link(path).unwrap(), Path::new("../elsewhere/file"));
    }

    #[test]
    fn test_tagged_file_deserializes() {
        let file: TaggedFile = toml::from_str(
            r#"
            path = "raw/bold.nii.gz"
            entities = { subject = "03", run = 2 }
            "#,
        )
        .unwrap();

        assert_eq!(file.path(), Path::new("raw/bold.nii.gz"));
        assert_eq!(file.entities().get("run").map(ToString::to_string).as_deref(), Some("2"));
    }
}
