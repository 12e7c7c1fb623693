//! Writing files at resolved destinations.
//!
//! [`materialize`] turns a [`Target`] and a [`Payload`] into a file on disk:
//! it creates missing parent directories, applies the [`ConflictPolicy`]
//! when the destination already exists, then copies, links or writes.
//!
//! There is no locking between the existence check and the write; a
//! concurrent writer to the same tree can race with this process.

use std::{
    ffi::{OsStr, OsString},
    fs, io,
    path::{self, Path, PathBuf},
};

use log::{debug, warn};

use shelve_core::policy::ConflictPolicy;

use crate::{
    error::ShelveError,
    resolver::{Target, TargetKind},
};

/// Upper bound on `_N` suffixes tried under [`ConflictPolicy::Append`].
pub const MAX_APPEND_ATTEMPTS: usize = 10_000;

/// What to place at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Copy the bytes of an existing file.
    Copy(&'a Path),

    /// Link to an existing file by its absolute path.
    Symlink(&'a Path),

    /// Write an in-memory buffer.
    Contents(&'a [u8]),

    /// Link to an arbitrary target, stored as given.
    LinkTo(&'a Path),
}

impl<'a> Payload<'a> {
    /// Copy or link `source`, depending on `symbolic_link`.
    pub fn file(source: &'a Path, symbolic_link: bool) -> Self {
        if symbolic_link {
            Self::Symlink(source)
        } else {
            Self::Copy(source)
        }
    }

    /// File name to use when the destination is a directory target.
    fn file_name(&self) -> Option<&'a OsStr> {
        match *self {
            Payload::Copy(source) | Payload::Symlink(source) => source.file_name(),
            Payload::Contents(_) | Payload::LinkTo(_) => None,
        }
    }
}

/// Outcome of [`materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// The payload was written at this path.
    Written(PathBuf),

    /// A file already existed at this path and was left untouched.
    Skipped(PathBuf),
}

impl Materialized {
    pub fn path(&self) -> &Path {
        match self {
            Materialized::Written(path) | Materialized::Skipped(path) => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Materialized::Written(path) | Materialized::Skipped(path) => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Materialized::Written(_))
    }
}

/// Place `payload` at `target` under the given conflict policy.
///
/// Returns the path actually used, which differs from the target under
/// [`ConflictPolicy::Append`] and for directory targets.
///
/// # Errors
///
/// - [`ShelveError::DestinationExists`] under [`ConflictPolicy::Fail`].
/// - [`ShelveError::MissingFileName`] for a directory target whose payload
///   has no file name to reuse.
/// - [`ShelveError::AppendExhausted`] if no free `_N` name is found.
/// - [`ShelveError::Io`] for any filesystem failure. Directories created
///   before the failure are left in place.
pub fn materialize(
    target: &Target,
    payload: Payload<'_>,
    policy: ConflictPolicy,
) -> Result<Materialized, ShelveError> {
    let mut destination = match target.kind() {
        TargetKind::File => target.path().to_path_buf(),
        TargetKind::Directory => {
            let name = payload
                .file_name()
                .ok_or_else(|| ShelveError::MissingFileName(target.path().to_path_buf()))?;
            target.path().join(name)
        }
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Some(existing) = existing_entry(&destination)? {
        match policy {
            ConflictPolicy::Fail => return Err(ShelveError::DestinationExists(destination)),
            ConflictPolicy::Skip => {
                warn!(
                    "A file at path {} already exists, skipping writing file.",
                    destination.display()
                );
                return Ok(Materialized::Skipped(destination));
            }
            ConflictPolicy::Overwrite if existing.is_dir() => {
                warn!(
                    path = destination.display().to_string();
                    "New path is a directory, not going to overwrite it, skipping"
                );
                return Ok(Materialized::Skipped(destination));
            }
            ConflictPolicy::Overwrite => fs::remove_file(&destination)?,
            ConflictPolicy::Append => destination = next_free_destination(&destination)?,
        }
    }

    write_payload(payload, &destination)?;
    debug!(path = destination.display().to_string(), policy:% = policy; "File materialized");

    Ok(Materialized::Written(destination))
}

/// File type of whatever is at `path`, without following symbolic links.
///
/// A dangling link counts as an existing entry.
fn existing_entry(path: &Path) -> Result<Option<fs::FileType>, ShelveError> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => Ok(Some(metadata.file_type())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Find the first free `stem_N.ext` next to `destination`.
fn next_free_destination(destination: &Path) -> Result<PathBuf, ShelveError> {
    let file_name = destination
        .file_name()
        .ok_or_else(|| ShelveError::MissingFileName(destination.to_path_buf()))?;
    let (stem, extension) = split_extension(file_name);

    for n in 1..=MAX_APPEND_ATTEMPTS {
        let mut numbered = OsString::from(stem);
        numbered.push(format!("_{n}"));
        numbered.push(extension);

        let candidate = destination.with_file_name(numbered);
        if existing_entry(&candidate)?.is_none() {
            return Ok(candidate);
        }
    }

    Err(ShelveError::AppendExhausted {
        path: destination.to_path_buf(),
        attempts: MAX_APPEND_ATTEMPTS,
    })
}

/// Split a file name before its first `.`, so `run-2.nii.gz` becomes
/// `("run-2", ".nii.gz")`. A leading dot belongs to the stem. Names that are
/// not valid UTF-8 are split the same way, byte for byte.
fn split_extension(file_name: &OsStr) -> (&OsStr, &OsStr) {
    let bytes = file_name.as_encoded_bytes();
    let search_from = usize::from(bytes.first() == Some(&b'.'));

    match bytes[search_from..].iter().position(|&b| b == b'.') {
        Some(index) => {
            let (stem, extension) = bytes.split_at(search_from + index);
            // SAFETY: both halves come from `file_name` and the split is
            // immediately before an ASCII `.`.
            unsafe {
                (
                    OsStr::from_encoded_bytes_unchecked(stem),
                    OsStr::from_encoded_bytes_unchecked(extension),
                )
            }
        }
        None => (file_name, OsStr::new("")),
    }
}

fn write_payload(payload: Payload<'_>, destination: &Path) -> io::Result<()> {
    match payload {
        Payload::Copy(source) => fs::copy(source, destination).map(|_| ()),
        Payload::Symlink(source) => symlink(&path::absolute(source)?, destination),
        Payload::Contents(bytes) => fs::write(destination, bytes),
        Payload::LinkTo(original) => symlink(original, destination),
    }
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    if original.is_dir() {
        std::os::windows::fs::symlink_dir(original, link)
    } else {
        std::os::windows::fs::symlink_file(original, link)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{TempDir, tempdir};

    use super::*;

    struct Fixture {
        dir: TempDir,
        source: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let source = dir
                .path()
                .join("sub-03_ses-2_task-rest_acq-fullbrain_run-2_bold.nii.gz");
            fs::write(&source, "###").unwrap();
            Self { dir, source }
        }

        fn file_target(&self, relative: &str) -> Target {
            Target::new(self.dir.path().join(relative), TargetKind::File)
        }
    }

    #[test]
    fn test_copy_creates_parent_directories() {
        let fixture = Fixture::new();
        let target = fixture.file_target("rest/sub-3/run-2.nii.gz");

        let written = materialize(&target, Payload::Copy(&fixture.source), ConflictPolicy::Fail)
            .unwrap();

        assert_eq!(written, Materialized::Written(target.path().to_path_buf()));
        assert_eq!(fs::read_to_string(target.path()).unwrap(), "###");
    }

    #[test]
    fn test_fail_policy_rejects_existing() {
        let fixture = Fixture::new();
        let target = fixture.file_target("out.nii.gz");
        materialize(&target, Payload::Copy(&fixture.source), ConflictPolicy::Fail).unwrap();

        let err = materialize(&target, Payload::Copy(&fixture.source), ConflictPolicy::Fail)
            .unwrap_err();

        assert!(matches!(err, ShelveError::DestinationExists(path) if path == target.path()));
    }

    #[test]
    fn test_skip_policy_keeps_existing_bytes() {
        let fixture = Fixture::new();
        let target = fixture.file_target("out.txt");
        fs::write(target.path(), "original").unwrap();

        let result = materialize(&target, Payload::Copy(&fixture.source), ConflictPolicy::Skip)
            .unwrap();

        assert_eq!(result, Materialized::Skipped(target.path().to_path_buf()));
        assert!(!result.is_written());
        assert_eq!(fs::read_to_string(target.path()).unwrap(), "original");
    }

    #[test]
    fn test_append_policy_numbers_before_extension() {
        let fixture = Fixture::new();
        let target = fixture.file_target("rest/run-2.nii.gz");
        let payload = Payload::Copy(&fixture.source);
        materialize(&target, payload, ConflictPolicy::Fail).unwrap();

        let first = materialize(&target, payload, ConflictPolicy::Append).unwrap();
        let second = materialize(&target, payload, ConflictPolicy::Append).unwrap();

        assert_eq!(first.path(), fixture.dir.path().join("rest/run-2_1.nii.gz"));
        assert_eq!(second.path(), fixture.dir.path().join("rest/run-2_2.nii.gz"));
    }

    #[test]
    fn test_overwrite_policy_replaces_contents() {
        let fixture = Fixture::new();
        let target = fixture.file_target("out.txt");
        fs::write(target.path(), "stale").unwrap();

        materialize(&target, Payload::Copy(&fixture.source), ConflictPolicy::Overwrite).unwrap();

        assert_eq!(fs::read_to_string(target.path()).unwrap(), "###");
    }

    #[test]
    fn test_overwrite_policy_leaves_directories_alone() {
        let fixture = Fixture::new();
        let target = fixture.file_target("occupied");
        fs::create_dir(target.path()).unwrap();

        let result = materialize(&target, Payload::Contents(b"x"), ConflictPolicy::Overwrite)
            .unwrap();

        assert!(!result.is_written());
        assert!(target.path().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_points_at_absolute_source() {
        let fixture = Fixture::new();
        let target = fixture.file_target("linked/run-2.nii.gz");

        materialize(&target, Payload::file(&fixture.source, true), ConflictPolicy::Fail).unwrap();

        let metadata = fs::symlink_metadata(target.path()).unwrap();
        assert!(metadata.file_type().is_symlink());
        assert_eq!(fs::read_link(target.path()).unwrap(), fixture.source);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_counts_as_existing() {
        let fixture = Fixture::new();
        let target = fixture.file_target("dangling");
        std::os::unix::fs::symlink(fixture.dir.path().join("gone"), target.path()).unwrap();

        let err = materialize(&target, Payload::Contents(b"x"), ConflictPolicy::Fail).unwrap_err();
        assert!(matches!(err, ShelveError::DestinationExists(_)));
    }

    #[test]
    fn test_directory_target_appends_source_name() {
        let fixture = Fixture::new();
        let target = Target::new(fixture.dir.path().join("rest"), TargetKind::Directory);

        let written = materialize(&target, Payload::Copy(&fixture.source), ConflictPolicy::Fail)
            .unwrap();

        assert_eq!(written.path().file_name(), fixture.source.file_name());
        assert!(written.path().starts_with(fixture.dir.path().join("rest")));
    }

    #[test]
    fn test_directory_target_needs_a_file_name() {
        let fixture = Fixture::new();
        let target = Target::new(fixture.dir.path().join("rest"), TargetKind::Directory);

        let err = materialize(&target, Payload::Contents(b"x"), ConflictPolicy::Fail).unwrap_err();
        assert!(matches!(err, ShelveError::MissingFileName(_)));
    }

    #[test]
    fn test_contents_written() {
        let fixture = Fixture::new();
        let target = fixture.file_target("sub-Bob/sess-01/desc.txt");

        materialize(&target, Payload::Contents(b"test"), ConflictPolicy::Fail).unwrap();

        assert_eq!(fs::read_to_string(target.path()).unwrap(), "test");
    }

    #[test]
    fn test_split_extension() {
        let split = |name: &'static str| {
            let (stem, extension) = split_extension(OsStr::new(name));
            (stem.to_str().unwrap(), extension.to_str().unwrap())
        };

        assert_eq!(split("run-2.nii.gz"), ("run-2", ".nii.gz"));
        assert_eq!(split("README"), ("README", ""));
        assert_eq!(split(".bidsignore"), (".bidsignore", ""));
        assert_eq!(split(".config.toml"), (".config", ".toml"));
    }

    // Linux file systems accept arbitrary bytes in names; others may not.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_append_policy_keeps_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        let fixture = Fixture::new();
        let name = OsStr::from_bytes(b"r\xffn.txt");
        let target = Target::new(fixture.dir.path().join(name), TargetKind::File);
        fs::write(target.path(), "original").unwrap();

        let written = materialize(&target, Payload::Contents(b"new"), ConflictPolicy::Append)
            .unwrap();

        let expected = fixture.dir.path().join(OsStr::from_bytes(b"r\xffn_1.txt"));
        assert_eq!(written, Materialized::Written(expected.clone()));
        assert_eq!(fs::read_to_string(&expected).unwrap(), "new");
        assert_eq!(fs::read_to_string(target.path()).unwrap(), "original");
    }
}
