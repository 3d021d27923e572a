//! Deprecated dependency migration
//!
//! Some releases pin dependencies on interpreter versions the target
//! platform no longer ships. Before a manifest is folded into the index,
//! every `import` element that matches a rule in the table has its
//! `version` rewritten to the rule's successor.

use crate::xml::Element;
use serde::{Deserialize, Serialize};

/// Dependency declaration element rewritten by the table.
const IMPORT_ELEMENT: &str = "import";

/// `{addon, from_version} -> to_version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyMigration {
    /// Dependency addon id, e.g. `xbmc.python`
    pub addon: String,
    /// Deprecated pinned version
    pub from_version: String,
    /// Successor version written in its place
    pub to_version: String,
}

impl DependencyMigration {
    pub fn new(
        addon: impl Into<String>,
        from_version: impl Into<String>,
        to_version: impl Into<String>,
    ) -> Self {
        Self {
            addon: addon.into(),
            from_version: from_version.into(),
            to_version: to_version.into(),
        }
    }

    fn matches(&self, import: &Element) -> bool {
        import.attr("addon") == Some(self.addon.as_str())
            && import.attr("version") == Some(self.from_version.as_str())
    }
}

/// A rewrite that was applied to a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub addon: String,
    pub from_version: String,
    pub to_version: String,
}

/// Ordered set of migration rules. The first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTable {
    rules: Vec<DependencyMigration>,
}

impl Default for MigrationTable {
    /// The Python 2 to Python 3 interpreter move.
    fn default() -> Self {
        Self::new(default_migrations())
    }
}

/// Built-in rules, also used as the configuration default.
pub fn default_migrations() -> Vec<DependencyMigration> {
    vec![
        DependencyMigration::new("xbmc.python", "2.25.0", "3.0.0"),
        DependencyMigration::new("xbmc.python", "2.26.0", "3.0.0"),
    ]
}

impl MigrationTable {
    pub fn new(rules: Vec<DependencyMigration>) -> Self {
        Self { rules }
    }

    /// A table that rewrites nothing.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rules(&self) -> &[DependencyMigration] {
        &self.rules
    }

    /// Rewrite matching dependency pins in place.
    pub fn apply(&self, manifest: &mut Element) -> Vec<AppliedMigration> {
        let mut applied = Vec::new();
        if self.rules.is_empty() {
            return applied;
        }

        manifest.visit_mut(&mut |element: &mut Element| {
            if element.name != IMPORT_ELEMENT {
                return;
            }
            if let Some(rule) = self.rules.iter().find(|rule| rule.matches(element)) {
                element.set_attr("version", rule.to_version.as_str());
                applied.push(AppliedMigration {
                    addon: rule.addon.clone(),
                    from_version: rule.from_version.clone(),
                    to_version: rule.to_version.clone(),
                });
            }
        });

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with_import(addon: &str, version: &str) -> Element {
        Element::new("addon")
            .with_attr("id", "plugin.video.demo")
            .with_attr("version", "1.0.0")
            .with_child(
                Element::new("requires").with_child(
                    Element::new("import")
                        .with_attr("addon", addon)
                        .with_attr("version", version),
                ),
            )
    }

    fn import_version(manifest: &Element) -> &str {
        manifest
            .child("requires")
            .and_then(|r| r.child("import"))
            .and_then(|i| i.attr("version"))
            .unwrap()
    }

    #[test]
    fn rewrites_deprecated_pin() {
        let mut manifest = manifest_with_import("xbmc.python", "2.25.0");
        let applied = MigrationTable::default().apply(&mut manifest);

        assert_eq!(import_version(&manifest), "3.0.0");
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].from_version, "2.25.0");
    }

    #[test]
    fn leaves_current_pin_untouched() {
        let mut manifest = manifest_with_import("xbmc.python", "3.0.0");
        let before = manifest.clone();

        let applied = MigrationTable::default().apply(&mut manifest);

        assert!(applied.is_empty());
        assert_eq!(manifest, before);
    }

    #[test]
    fn only_matching_addon_is_rewritten() {
        let mut manifest = manifest_with_import("script.module.requests", "2.25.0");
        MigrationTable::default().apply(&mut manifest);
        assert_eq!(import_version(&manifest), "2.25.0");
    }

    #[test]
    fn empty_table_is_a_no_op() {
        let mut manifest = manifest_with_import("xbmc.python", "2.25.0");
        assert!(MigrationTable::empty().apply(&mut manifest).is_empty());
        assert_eq!(import_version(&manifest), "2.25.0");
    }

    #[test]
    fn custom_rules_extend_the_table() {
        let table = MigrationTable::new(vec![DependencyMigration::new(
            "xbmc.gui",
            "5.14.0",
            "5.15.0",
        )]);
        let mut manifest = manifest_with_import("xbmc.gui", "5.14.0");

        table.apply(&mut manifest);

        assert_eq!(import_version(&manifest), "5.15.0");
    }
}
