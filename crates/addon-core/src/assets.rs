//! Metadata copy
//!
//! Repository browsers fetch an addon's manifest and art without
//! downloading the archive, so both are mirrored into `zips/<id>/` with
//! their relative paths preserved.

use crate::{Error, Result};
use addon_fs::io;
use addon_manifest::AddonDescriptor;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Extension points whose `assets` block names art files.
pub const METADATA_POINTS: &[&str] = &["xbmc.addon.metadata", "kodi.addon.metadata"];

/// Result of copying one addon's metadata files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataCopy {
    /// Files written because the destination was absent or different
    pub written: Vec<PathBuf>,
    /// Files whose destination was already identical
    pub unchanged: Vec<PathBuf>,
    /// Referenced art files that do not exist in the addon directory
    pub missing: Vec<PathBuf>,
    /// Referenced paths that are absolute or leave the addon directory
    pub rejected: Vec<String>,
}

impl MetadataCopy {
    /// Number of files present at the destination after the copy.
    pub fn file_count(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

/// Relative paths of the art files referenced by `descriptor`'s metadata
/// extensions, in document order. Blank entries are skipped.
pub fn asset_paths(descriptor: &AddonDescriptor) -> Vec<String> {
    descriptor
        .manifest
        .children_named("extension")
        .filter(|ext| {
            ext.attr("point")
                .is_some_and(|point| METADATA_POINTS.contains(&point))
        })
        .filter_map(|ext| ext.child("assets"))
        .flat_map(|assets| assets.elements())
        .map(|art| art.text().trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

/// Copy the manifest file and referenced art of `descriptor` into
/// `destination`.
///
/// # Errors
///
/// Missing art is recorded, not an error. Any other read or write failure
/// fails the copy.
pub fn copy_metadata(
    descriptor: &AddonDescriptor,
    manifest_file: &str,
    destination: &Path,
) -> Result<MetadataCopy> {
    let mut copy = MetadataCopy::default();

    copy_file(
        &descriptor.directory,
        Path::new(manifest_file),
        destination,
        &mut copy,
    )?;

    for asset in asset_paths(descriptor) {
        let Some(relative) = contained_path(&asset) else {
            tracing::warn!(addon = %descriptor.id, path = %asset, "asset path escapes addon directory");
            copy.rejected.push(asset);
            continue;
        };
        if copy.written.contains(&relative) || copy.unchanged.contains(&relative) {
            continue;
        }
        copy_file(&descriptor.directory, &relative, destination, &mut copy)?;
    }

    Ok(copy)
}

fn copy_file(
    source_dir: &Path,
    relative: &Path,
    destination: &Path,
    copy: &mut MetadataCopy,
) -> Result<()> {
    let source = source_dir.join(relative);
    let contents = match fs::read(&source) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %source.display(), "asset not found");
            copy.missing.push(relative.to_path_buf());
            return Ok(());
        }
        Err(source_error) => {
            return Err(Error::MetadataCopy {
                path: source,
                source: source_error,
            });
        }
    };

    let target = destination.join(relative);
    if fs::read(&target).is_ok_and(|existing| existing == contents) {
        copy.unchanged.push(relative.to_path_buf());
        return Ok(());
    }

    io::write_atomic(&target, &contents)?;
    tracing::debug!(path = %target.display(), "copied metadata file");
    copy.written.push(relative.to_path_buf());
    Ok(())
}

/// `path` as a relative path that stays inside its base directory.
fn contained_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use addon_manifest::Element;
    use pretty_assertions::assert_eq;

    fn descriptor_with_assets(point: &str, assets: &[&str]) -> AddonDescriptor {
        let mut block = Element::new("assets");
        for (i, path) in assets.iter().enumerate() {
            let name = if i == 0 { "icon" } else { "screenshot" };
            block = block.with_child(Element::new(name).with_text(*path));
        }
        AddonDescriptor {
            id: "plugin.video.demo".into(),
            version: "1.0.0".into(),
            manifest: Element::new("addon")
                .with_attr("id", "plugin.video.demo")
                .with_child(Element::new("extension").with_attr("point", point).with_child(block)),
            directory: PathBuf::from("plugin.video.demo"),
        }
    }

    #[test]
    fn assets_come_from_metadata_extensions_only() {
        let metadata = descriptor_with_assets("xbmc.addon.metadata", &["icon.png", " fanart.jpg "]);
        let other = descriptor_with_assets("xbmc.python.pluginsource", &["icon.png"]);

        assert_eq!(asset_paths(&metadata), vec!["icon.png", "fanart.jpg"]);
        assert!(asset_paths(&other).is_empty());
    }

    #[test]
    fn contained_paths() {
        assert_eq!(
            contained_path("resources/icon.png"),
            Some(PathBuf::from("resources/icon.png"))
        );
        assert_eq!(contained_path("./icon.png"), Some(PathBuf::from("icon.png")));
        assert_eq!(contained_path("../other/icon.png"), None);
        assert_eq!(contained_path("/etc/passwd"), None);
        assert_eq!(contained_path("."), None);
    }
}
