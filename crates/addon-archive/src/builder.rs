//! Archive builder
//!
//! Archives are reproducible: entries are added in name order with a fixed
//! timestamp and normalized permissions, so the same addon tree always
//! produces the same bytes.

use crate::{Error, IgnoreRules, Result};
use addon_fs::{io, layout};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// What to do when the archive for a version already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchivePolicy {
    /// Keep the existing archive untouched
    #[default]
    SkipExisting,
    /// Rebuild in memory; reuse identical archives, reject differing ones
    VerifyExisting,
    /// Always rewrite the archive
    Rebuild,
}

/// Whether the archive was written by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Created,
    Reused,
}

/// A packaged addon version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveArtifact {
    pub addon_id: String,
    pub version: String,
    pub path: PathBuf,
    pub byte_size: u64,
    pub outcome: ArchiveOutcome,
}

/// Builds filtered, deterministic zip archives of addon directories.
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    ignore: IgnoreRules,
    policy: ArchivePolicy,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore(mut self, ignore: IgnoreRules) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_policy(mut self, policy: ArchivePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ArchivePolicy {
        self.policy
    }

    /// Package `addon_dir` as `destination_root/<id>/<id>-<version>.zip`.
    ///
    /// Entry names are relative to the parent of `addon_dir`, so the
    /// archive holds a single top-level folder named after the addon
    /// directory.
    pub fn build(
        &self,
        addon_dir: &Path,
        addon_id: &str,
        version: &str,
        destination_root: &Path,
    ) -> Result<ArchiveArtifact> {
        let target = layout::archive_path(destination_root, addon_id, version);
        let exists = target.is_file();

        if exists && self.policy == ArchivePolicy::SkipExisting {
            tracing::debug!(path = %target.display(), "archive exists, skipping");
            return self.artifact(addon_id, version, target, ArchiveOutcome::Reused);
        }

        let bytes = self.archive_bytes(addon_dir, &target)?;

        if exists && self.policy == ArchivePolicy::VerifyExisting {
            let existing = fs::read(&target).map_err(|e| Error::io(&target, e))?;
            if existing != bytes {
                return Err(Error::VersionCollision { path: target });
            }
            tracing::debug!(path = %target.display(), "archive exists with identical content");
            return self.artifact(addon_id, version, target, ArchiveOutcome::Reused);
        }

        io::write_atomic(&target, &bytes)?;
        tracing::debug!(path = %target.display(), bytes = bytes.len(), "wrote archive");

        Ok(ArchiveArtifact {
            addon_id: addon_id.to_string(),
            version: version.to_string(),
            path: target,
            byte_size: bytes.len() as u64,
            outcome: ArchiveOutcome::Created,
        })
    }

    /// Build the archive for `addon_dir` in memory.
    fn archive_bytes(&self, addon_dir: &Path, target: &Path) -> Result<Vec<u8>> {
        let top_level = addon_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::io(
                    addon_dir,
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "addon directory has no name",
                    ),
                )
            })?;

        let zip_error = |source: zip::result::ZipError| Error::Zip {
            path: target.to_path_buf(),
            source,
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let walker = WalkDir::new(addon_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_ignored(entry));

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            let metadata = match fs::metadata(path) {
                Ok(metadata) => metadata,
                Err(e) if entry.path_is_symlink() => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping dangling symlink");
                    continue;
                }
                Err(e) => return Err(Error::io(path, e)),
            };
            if !metadata.is_file() {
                continue;
            }

            let relative = path.strip_prefix(addon_dir).unwrap_or(path);
            let mut name = top_level.clone();
            for component in relative.components() {
                name.push('/');
                name.push_str(&component.as_os_str().to_string_lossy());
            }

            let contents = fs::read(path).map_err(|e| Error::io(path, e))?;
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(DateTime::default())
                .unix_permissions(if is_executable(&metadata) { 0o755 } else { 0o644 });

            writer.start_file(name, options).map_err(zip_error)?;
            writer
                .write_all(&contents)
                .map_err(|e| Error::io(target, e))?;
        }

        let cursor = writer.finish().map_err(zip_error)?;
        Ok(cursor.into_inner())
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            self.ignore.is_ignored_dir(&name)
        } else {
            self.ignore.is_ignored_file(&name)
        }
    }

    fn artifact(
        &self,
        addon_id: &str,
        version: &str,
        path: PathBuf,
        outcome: ArchiveOutcome,
    ) -> Result<ArchiveArtifact> {
        let byte_size = fs::metadata(&path).map_err(|e| Error::io(&path, e))?.len();
        Ok(ArchiveArtifact {
            addon_id: addon_id.to_string(),
            version: version.to_string(),
            path,
            byte_size,
            outcome,
        })
    }
}

/// Check if a file is executable
fn is_executable(metadata: &fs::Metadata) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        false
    }
}
