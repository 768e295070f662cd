//! Persisting generated artifacts.
//!
//! Artifacts are kept read-only at rest so they are not edited by hand.
//! Regeneration revokes that, deletes the old file and writes the new
//! content in full before sealing it again.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{GenError, Result};
use crate::template::Template;

/// What happened to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Replaced,
    /// Rewritten with byte-identical content
    Unchanged,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Created => write!(f, "created"),
            WriteOutcome::Replaced => write!(f, "replaced"),
            WriteOutcome::Unchanged => write!(f, "unchanged"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub destination: PathBuf,
    pub lines: Vec<String>,
    pub immutable: bool,
    /// SHA256 of the written bytes, hex encoded
    pub digest: String,
    pub outcome: WriteOutcome,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactWriter;

impl ArtifactWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, destination: &Path, template: &Template) -> Result<Artifact> {
        let fail = |source: io::Error| GenError::WriteFailure {
            destination: destination.to_path_buf(),
            source,
        };

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(fail)?;
        }

        let text = template.to_text();
        let digest = compute_sha256(text.as_bytes());

        let previous = match fs::symlink_metadata(destination) {
            Ok(_) => {
                revoke(destination).map_err(fail)?;
                let previous = compute_sha256(&fs::read(destination).map_err(fail)?);
                fs::remove_file(destination).map_err(fail)?;
                Some(previous)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(fail(e)),
        };

        fs::write(destination, &text).map_err(fail)?;
        seal(destination).map_err(fail)?;

        let outcome = match previous {
            None => WriteOutcome::Created,
            Some(previous) if previous == digest => WriteOutcome::Unchanged,
            Some(_) => WriteOutcome::Replaced,
        };
        log::debug!("{} {} ({})", outcome, destination.display(), &digest[..12]);

        Ok(Artifact {
            destination: destination.to_path_buf(),
            lines: template.lines().to_vec(),
            immutable: true,
            digest,
            outcome,
        })
    }
}

/// Make the file writable again.
pub fn revoke(path: &Path) -> io::Result<()> {
    set_writable(path, true)
}

/// Make the file read-only.
pub fn seal(path: &Path) -> io::Result<()> {
    set_writable(path, false)
}

#[cfg(unix)]
fn set_writable(path: &Path, writable: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if writable { 0o644 } else { 0o444 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn set_writable(path: &Path, writable: bool) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(!writable);
    fs::set_permissions(path, permissions)
}

/// Compute SHA256 hash of content
fn compute_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(text: &str) -> Template {
        Template::parse("a.cs", text).unwrap()
    }

    #[test]
    fn test_write_creates_sealed_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("Gen").join("FuncRule.2.cs");

        let artifact = ArtifactWriter::new().write(&destination, &template("one\ntwo")).unwrap();

        assert_eq!(artifact.outcome, WriteOutcome::Created);
        assert!(artifact.immutable);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "one\ntwo\n");
        assert!(fs::metadata(&destination).unwrap().permissions().readonly());
    }

    #[test]
    fn test_rewrite_replaces_sealed_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("FuncRule.2.cs");
        let writer = ArtifactWriter::new();

        writer.write(&destination, &template("old")).unwrap();
        let artifact = writer.write(&destination, &template("new")).unwrap();

        assert_eq!(artifact.outcome, WriteOutcome::Replaced);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new\n");
        assert!(fs::metadata(&destination).unwrap().permissions().readonly());
    }

    #[test]
    fn test_same_content_reports_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("FuncRule.2.cs");
        let writer = ArtifactWriter::new();

        let first = writer.write(&destination, &template("same")).unwrap();
        let second = writer.write(&destination, &template("same")).unwrap();

        assert_eq!(second.outcome, WriteOutcome::Unchanged);
        assert_eq!(first.digest, second.digest);
    }

    #[cfg(unix)]
    #[test]
    fn test_replaces_file_without_any_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("FuncRule.2.cs");
        let writer = ArtifactWriter::new();
        writer.write(&destination, &template("old")).unwrap();
        fs::set_permissions(&destination, fs::Permissions::from_mode(0o000)).unwrap();

        let artifact = writer.write(&destination, &template("new")).unwrap();

        assert_eq!(artifact.outcome, WriteOutcome::Replaced);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new\n");
        assert!(fs::metadata(&destination).unwrap().permissions().readonly());
    }

    #[test]
    fn test_directory_in_the_way_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("FuncRule.2.cs");
        fs::create_dir(&destination).unwrap();

        let err = ArtifactWriter::new().write(&destination, &template("x")).unwrap_err();
        assert!(matches!(err, GenError::WriteFailure { .. }));
    }

    #[test]
    fn test_sha256_computation() {
        let hash = compute_sha256(b"test content");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_sha256(b"test content"));
    }
}
