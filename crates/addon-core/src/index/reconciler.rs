//! Replace-or-insert folding of descriptors into the index

use super::IndexDocument;
use addon_manifest::{AddonDescriptor, AppliedMigration, MigrationTable};

/// Outcome of folding one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    /// Whether the index changed
    pub updated: bool,
    /// Dependency pins rewritten before the comparison
    pub migrations: Vec<AppliedMigration>,
}

/// Folds addon manifests into an [`IndexDocument`].
#[derive(Debug, Clone, Default)]
pub struct IndexReconciler {
    migrations: MigrationTable,
}

impl IndexReconciler {
    pub fn new(migrations: MigrationTable) -> Self {
        Self { migrations }
    }

    pub fn migrations(&self) -> &MigrationTable {
        &self.migrations
    }

    /// Fold `descriptor` into `index`.
    ///
    /// Deprecated dependency pins are migrated first; the migrated tree is
    /// what gets compared with the existing entry and stored. An entry with
    /// the same id is replaced only when its content differs.
    pub fn merge(&self, index: &mut IndexDocument, descriptor: &AddonDescriptor) -> Merge {
        let mut manifest = descriptor.manifest.clone();
        let migrations = self.migrations.apply(&mut manifest);
        for applied in &migrations {
            tracing::debug!(
                addon = %descriptor.id,
                dependency = %applied.addon,
                from = %applied.from_version,
                to = %applied.to_version,
                "migrated dependency"
            );
        }

        let updated = index.upsert(manifest);
        Merge {
            updated,
            migrations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addon_manifest::{DependencyMigration, Element};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn descriptor(id: &str, version: &str, python: &str) -> AddonDescriptor {
        let manifest = Element::new("addon")
            .with_attr("id", id)
            .with_attr("version", version)
            .with_child(
                Element::new("requires").with_child(
                    Element::new("import")
                        .with_attr("addon", "xbmc.python")
                        .with_attr("version", python),
                ),
            );
        AddonDescriptor {
            id: id.to_string(),
            version: version.to_string(),
            manifest,
            directory: PathBuf::from(id),
        }
    }

    fn python_pin(index: &IndexDocument, id: &str) -> String {
        let import = index
            .get(id)
            .and_then(|e| e.child("requires"))
            .and_then(|e| e.child("import"))
            .unwrap();
        import.attr("version").unwrap().to_string()
    }

    #[test]
    fn insert_then_identical_then_replace() {
        let reconciler = IndexReconciler::default();
        let mut index = IndexDocument::new();

        assert!(reconciler.merge(&mut index, &descriptor("a", "1.0.0", "3.0.0")).updated);
        assert!(!reconciler.merge(&mut index, &descriptor("a", "1.0.0", "3.0.0")).updated);
        assert!(reconciler.merge(&mut index, &descriptor("a", "1.0.1", "3.0.0")).updated);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn migrated_tree_is_stored() {
        let reconciler = IndexReconciler::default();
        let mut index = IndexDocument::new();

        let merge = reconciler.merge(&mut index, &descriptor("a", "1.0.0", "2.26.0"));

        assert!(merge.updated);
        assert_eq!(merge.migrations.len(), 1);
        assert_eq!(python_pin(&index, "a"), "3.0.0");
    }

    #[test]
    fn migration_makes_old_pin_equal_to_stored_entry() {
        let reconciler = IndexReconciler::default();
        let mut index = IndexDocument::new();
        reconciler.merge(&mut index, &descriptor("a", "1.0.0", "3.0.0"));

        let merge = reconciler.merge(&mut index, &descriptor("a", "1.0.0", "2.25.0"));
        assert!(!merge.updated);
    }

    #[test]
    fn custom_table_replaces_defaults() {
        let reconciler = IndexReconciler::new(MigrationTable::new(vec![
            DependencyMigration::new("xbmc.python", "2.25.0", "2.26.0"),
        ]));
        let mut index = IndexDocument::new();

        reconciler.merge(&mut index, &descriptor("a", "1.0.0", "2.25.0"));
        reconciler.merge(&mut index, &descriptor("b", "1.0.0", "2.26.0"));

        assert_eq!(python_pin(&index, "a"), "2.26.0");
        assert_eq!(python_pin(&index, "b"), "2.26.0");
    }
}
