//! Manifest reader
//!
//! Reads one addon's manifest and extracts its identity. The whole manifest
//! tree is kept because the index stores full metadata.

use crate::xml::Element;
use crate::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Manifest file name expected inside every addon directory.
pub const DEFAULT_MANIFEST_FILE: &str = "addon-manifest.xml";

/// One addon as read from its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonDescriptor {
    /// Addon identifier, the `id` attribute of the manifest root
    pub id: String,
    /// The `version` attribute of the manifest root
    pub version: String,
    /// The full manifest root element
    pub manifest: Element,
    /// Directory the manifest was read from
    pub directory: PathBuf,
}

impl AddonDescriptor {
    /// Name of the addon directory, which becomes the archive's top folder.
    pub fn directory_name(&self) -> String {
        self.directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Reads addon manifests from addon directories.
#[derive(Debug, Clone)]
pub struct ManifestReader {
    file_name: String,
}

impl Default for ManifestReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestReader {
    pub fn new() -> Self {
        Self {
            file_name: DEFAULT_MANIFEST_FILE.to_string(),
        }
    }

    /// Read manifests named `file_name` instead of the default.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path of the manifest inside `directory`.
    pub fn manifest_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.file_name)
    }

    /// Whether `directory` contains a manifest file.
    pub fn has_manifest(&self, directory: &Path) -> bool {
        self.manifest_path(directory).is_file()
    }

    /// Read the manifest in `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the directory if the manifest is
    /// missing, unreadable, malformed, or lacks `id`/`version`.
    pub fn read(&self, directory: &Path) -> Result<AddonDescriptor> {
        let path = self.manifest_path(directory);
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::parse(directory, format!("cannot read {}: {}", self.file_name, e))
        })?;

        let manifest = Element::parse_str(&content).map_err(|e| match e {
            Error::Xml { message } => Error::parse(directory, message),
            other => other,
        })?;

        let id = required_attr(&manifest, "id", directory)?;
        let version = required_attr(&manifest, "version", directory)?;

        tracing::debug!(
            directory = %directory.display(),
            id = %id,
            version = %version,
            "read manifest"
        );

        Ok(AddonDescriptor {
            id,
            version,
            manifest,
            directory: directory.to_path_buf(),
        })
    }
}

/// A root attribute that is later used as a file name: `id` names the
/// output directory and both `id` and `version` name the archive.
fn required_attr(manifest: &Element, name: &str, directory: &Path) -> Result<String> {
    match manifest.attr(name).map(str::trim) {
        Some(value) if !value.is_empty() && is_file_name(value) => Ok(value.to_string()),
        Some(value) if !value.is_empty() => Err(Error::parse(
            directory,
            format!("'{}' attribute {:?} is not a valid file name", name, value),
        )),
        _ => Err(Error::parse(
            directory,
            format!("root element <{}> has no '{}' attribute", manifest.name, name),
        )),
    }
}

/// Exactly one normal path component, with no separator of any platform.
fn is_file_name(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !value.contains(['/', '\\'])
}
