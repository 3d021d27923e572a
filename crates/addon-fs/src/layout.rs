//! Release-root layout
//!
//! Resolves every output location of a release root from its path:
//!
//! ```text
//! <root>/
//!   <addon>/addon-manifest.xml      source
//!   zips/
//!     addons.xml                    index document
//!     addons.xml.md5                checksum record
//!     .packager.lock                run lock
//!     <id>/<id>-<version>.zip       archive artifact
//! ```

use std::path::{Path, PathBuf};

/// Fixed names inside a release root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePath {
    /// The output directory holding archives and the index
    OutputDir,
    /// The aggregate index document
    IndexFile,
    /// Extension appended to the index file name for its checksum
    ChecksumExtension,
    /// Advisory lock held for the duration of a run
    LockFile,
    /// Archive file extension
    ArchiveExtension,
}

impl ReleasePath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutputDir => "zips",
            Self::IndexFile => "addons.xml",
            Self::ChecksumExtension => "md5",
            Self::LockFile => ".packager.lock",
            Self::ArchiveExtension => "zip",
        }
    }
}

impl AsRef<str> for ReleasePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ReleasePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output locations for one release root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLayout {
    root: PathBuf,
    output_dir: String,
    index_file: String,
}

impl ReleaseLayout {
    /// Layout with the default output directory and index file names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_dir: ReleasePath::OutputDir.as_str().to_string(),
            index_file: ReleasePath::IndexFile.as_str().to_string(),
        }
    }

    /// Override the output directory name.
    pub fn with_output_dir(mut self, name: impl Into<String>) -> Self {
        self.output_dir = name.into();
        self
    }

    /// Override the index file name.
    pub fn with_index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the output directory, excluded from addon discovery.
    pub fn output_dir_name(&self) -> &str {
        &self.output_dir
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir().join(&self.index_file)
    }

    /// The checksum sits next to the index as `<index>.md5`.
    pub fn checksum_path(&self) -> PathBuf {
        self.output_dir().join(format!(
            "{}.{}",
            self.index_file,
            ReleasePath::ChecksumExtension
        ))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.output_dir().join(ReleasePath::LockFile.as_str())
    }

    /// Directory receiving an addon's archives and copied metadata.
    pub fn addon_output_dir(&self, addon_id: &str) -> PathBuf {
        self.output_dir().join(addon_id)
    }

    /// Path of the archive for one addon version.
    pub fn archive_path(&self, addon_id: &str, version: &str) -> PathBuf {
        archive_path(&self.output_dir(), addon_id, version)
    }
}

/// `<destination>/<id>/<id>-<version>.zip`
pub fn archive_path(destination_root: &Path, addon_id: &str, version: &str) -> PathBuf {
    destination_root.join(addon_id).join(format!(
        "{}-{}.{}",
        addon_id,
        version,
        ReleasePath::ArchiveExtension
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_paths() {
        let layout = ReleaseLayout::new("matrix");

        assert_eq!(layout.output_dir(), Path::new("matrix/zips"));
        assert_eq!(layout.index_path(), Path::new("matrix/zips/addons.xml"));
        assert_eq!(
            layout.checksum_path(),
            Path::new("matrix/zips/addons.xml.md5")
        );
        assert_eq!(
            layout.archive_path("plugin.video.foo", "1.2.0"),
            Path::new("matrix/zips/plugin.video.foo/plugin.video.foo-1.2.0.zip")
        );
    }

    #[test]
    fn checksum_follows_renamed_index() {
        let layout = ReleaseLayout::new("repo")
            .with_output_dir("dist")
            .with_index_file("index.xml");

        assert_eq!(layout.output_dir_name(), "dist");
        assert_eq!(layout.checksum_path(), Path::new("repo/dist/index.xml.md5"));
    }
}
