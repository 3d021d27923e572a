//! Packager configuration
//!
//! Every field has a default, so an absent or partial configuration file is
//! valid. The CLI looks for [`CONFIG_FILE_NAME`] in the working directory.

use crate::Result;
use addon_archive::{
    ArchiveBuilder, ArchivePolicy, DEFAULT_IGNORED_NAMES, DEFAULT_IGNORED_SUFFIXES, IgnoreRules,
};
use addon_fs::{ConfigStore, ReleaseLayout, ReleasePath};
use addon_manifest::{
    DEFAULT_MANIFEST_FILE, DependencyMigration, ManifestReader, MigrationTable,
    default_migrations,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "addon-pack.toml";

/// Release roots processed when none are configured.
pub const DEFAULT_RELEASE_ROOTS: &[&str] = &["krypton", "leia", "matrix", "omega", "repo"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Release root directories, relative to the working directory
    pub release_roots: Vec<String>,
    /// Output directory name inside each release root
    pub output_dir: String,
    /// Manifest file name inside each addon directory
    pub manifest_file: String,
    /// Index file name inside the output directory
    pub index_file: String,
    /// Directory names and file name prefixes left out of archives
    pub ignore: Vec<String>,
    /// File name suffixes left out of archives
    pub ignore_suffixes: Vec<String>,
    pub archive_policy: ArchivePolicy,
    /// Mirror manifests and art next to the archives
    pub copy_metadata: bool,
    /// Dependency pins rewritten before indexing
    pub migrations: Vec<DependencyMigration>,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            release_roots: to_strings(DEFAULT_RELEASE_ROOTS),
            output_dir: ReleasePath::OutputDir.as_str().to_string(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            index_file: ReleasePath::IndexFile.as_str().to_string(),
            ignore: to_strings(DEFAULT_IGNORED_NAMES),
            ignore_suffixes: to_strings(DEFAULT_IGNORED_SUFFIXES),
            archive_policy: ArchivePolicy::default(),
            copy_metadata: true,
            migrations: default_migrations(),
        }
    }
}

impl PackagerConfig {
    /// Load from an explicit file (TOML, JSON or YAML).
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Load [`CONFIG_FILE_NAME`] from `dir`, or the defaults if absent.
    pub fn discover(dir: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(&dir.join(CONFIG_FILE_NAME))?)
    }

    pub fn layout(&self, root: &Path) -> ReleaseLayout {
        ReleaseLayout::new(root)
            .with_output_dir(self.output_dir.as_str())
            .with_index_file(self.index_file.as_str())
    }

    pub fn manifest_reader(&self) -> ManifestReader {
        ManifestReader::new().with_file_name(self.manifest_file.as_str())
    }

    pub fn archive_builder(&self) -> ArchiveBuilder {
        ArchiveBuilder::new()
            .with_ignore(IgnoreRules::new(
                self.ignore.iter().cloned(),
                self.ignore_suffixes.iter().cloned(),
            ))
            .with_policy(self.archive_policy)
    }

    pub fn migration_table(&self) -> MigrationTable {
        MigrationTable::new(self.migrations.clone())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
