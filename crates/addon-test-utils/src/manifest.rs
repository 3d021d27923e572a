//! [`ManifestBuilder`] for addon manifest XML.

/// Builds the text of an addon manifest.
///
/// ```rust
/// use addon_test_utils::ManifestBuilder;
///
/// let xml = ManifestBuilder::new("plugin.video.demo", "1.0.0")
///     .import("xbmc.python", "3.0.0")
///     .asset("icon", "resources/icon.png")
///     .build();
/// assert!(xml.contains(r#"id="plugin.video.demo""#));
/// ```
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    id: String,
    version: String,
    name: Option<String>,
    imports: Vec<(String, String)>,
    assets: Vec<(String, String)>,
    summary: Option<String>,
}

impl ManifestBuilder {
    pub fn new(id: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
            name: None,
            imports: Vec::new(),
            assets: Vec::new(),
            summary: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add a `requires/import` dependency.
    pub fn import(mut self, addon: &str, version: &str) -> Self {
        self.imports.push((addon.to_string(), version.to_string()));
        self
    }

    /// Add an art file to the metadata extension's `assets` block.
    pub fn asset(mut self, kind: &str, path: &str) -> Self {
        self.assets.push((kind.to_string(), path.to_string()));
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn build(&self) -> String {
        let name = self.name.as_deref().unwrap_or(&self.id);
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <addon id=\"{}\" name=\"{}\" version=\"{}\" provider-name=\"tests\">\n",
            self.id, name, self.version
        );

        if !self.imports.is_empty() {
            xml.push_str("  <requires>\n");
            for (addon, version) in &self.imports {
                xml.push_str(&format!(
                    "    <import addon=\"{}\" version=\"{}\"/>\n",
                    addon, version
                ));
            }
            xml.push_str("  </requires>\n");
        }

        xml.push_str("  <extension point=\"xbmc.addon.metadata\">\n");
        if let Some(summary) = &self.summary {
            xml.push_str(&format!("    <summary lang=\"en_GB\">{}</summary>\n", summary));
        }
        if !self.assets.is_empty() {
            xml.push_str("    <assets>\n");
            for (kind, path) in &self.assets {
                xml.push_str(&format!("      <{0}>{1}</{0}>\n", kind, path));
            }
            xml.push_str("    </assets>\n");
        }
        xml.push_str("  </extension>\n</addon>\n");
        xml
    }
}
