//! [`TestRelease`] builder for release roots on disk.

use crate::ManifestBuilder;
use addon_manifest::DEFAULT_MANIFEST_FILE;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary working directory holding one release root.
///
/// # Example
///
/// ```rust,no_run
/// use addon_test_utils::{ManifestBuilder, TestRelease};
///
/// let release = TestRelease::new("matrix");
/// release.add_addon("plugin.video.demo", &ManifestBuilder::new("plugin.video.demo", "1.0.0"));
/// release.assert_file_exists("plugin.video.demo/addon-manifest.xml");
/// ```
pub struct TestRelease {
    temp_dir: TempDir,
    name: String,
}

impl TestRelease {
    /// Create an empty release root named `name` in a fresh temporary
    /// directory.
    pub fn new(name: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        Self {
            temp_dir,
            name: name.to_string(),
        }
    }

    /// The temporary directory containing the release root.
    pub fn workspace(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The release root.
    pub fn root(&self) -> PathBuf {
        self.workspace().join(&self.name)
    }

    /// Path relative to the release root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Create `<root>/<directory>` with a manifest and a `main.py`.
    pub fn add_addon(&self, directory: &str, manifest: &ManifestBuilder) -> PathBuf {
        self.write(&format!("{}/{}", directory, DEFAULT_MANIFEST_FILE), &manifest.build());
        self.write(&format!("{}/main.py", directory), "print('hello')\n");
        self.path(directory)
    }

    /// Create `<root>/<directory>` whose manifest is `content` verbatim.
    pub fn add_raw_addon(&self, directory: &str, content: &str) -> PathBuf {
        self.write(&format!("{}/{}", directory, DEFAULT_MANIFEST_FILE), content);
        self.path(directory)
    }

    /// Write a file relative to the release root, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        self.write_bytes(relative, content.as_bytes());
    }

    pub fn write_bytes(&self, relative: &str, content: &[u8]) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Read a file relative to the release root.
    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    pub fn index_path(&self) -> PathBuf {
        self.path("zips/addons.xml")
    }

    pub fn checksum_path(&self) -> PathBuf {
        self.path("zips/addons.xml.md5")
    }

    pub fn index_text(&self) -> String {
        self.read("zips/addons.xml")
    }

    /// Assert that `path` (relative to the release root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the release root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
