//! IndexDocument load, upsert and serialization

use crate::{Error, Result};
use addon_manifest::{Element, Node};
use std::fs;
use std::path::Path;

/// Root element name of the index document.
pub const INDEX_ROOT: &str = "addons";

/// Identifying attribute of every entry.
const ID_ATTRIBUTE: &str = "id";

/// Manifest trees keyed by addon id.
///
/// Entries are kept sorted by id and ids are unique, so serialization is a
/// pure function of the set of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDocument {
    entries: Vec<Element>,
    needs_rewrite: bool,
}

impl IndexDocument {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index at `path`, or an empty index if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Index`] if the file exists but is not a valid index
    /// document.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no index yet, starting empty");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::Index {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| Error::Index {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse index XML.
    ///
    /// Later duplicates of an id replace earlier ones and entries are
    /// sorted. An index that needed either repair reports
    /// [`needs_rewrite`](Self::needs_rewrite).
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let root = Element::parse_str(content).map_err(|e| e.to_string())?;
        if root.name != INDEX_ROOT {
            return Err(format!(
                "expected root element <{}>, found <{}>",
                INDEX_ROOT, root.name
            ));
        }

        let mut loaded: Vec<Element> = Vec::new();
        for node in root.children {
            let Node::Element(entry) = node else {
                continue;
            };
            if entry.attr(ID_ATTRIBUTE).is_none() {
                return Err(format!("<{}> entry without an id attribute", entry.name));
            }
            loaded.push(entry);
        }

        let loaded_ids: Vec<String> = loaded.iter().map(|e| entry_id(e).to_string()).collect();

        let mut document = Self::new();
        for entry in loaded {
            document.upsert(entry);
        }

        document.needs_rewrite = !document.ids().eq(loaded_ids.iter().map(String::as_str));
        if document.needs_rewrite {
            tracing::warn!("index contained duplicate or unsorted entries");
        }
        Ok(document)
    }

    /// Insert `entry`, or replace the entry with the same id.
    ///
    /// Returns `false` when an identical entry was already present.
    /// Entries without an id are ignored.
    pub fn upsert(&mut self, entry: Element) -> bool {
        let Some(id) = entry.attr(ID_ATTRIBUTE) else {
            return false;
        };

        match self
            .entries
            .binary_search_by(|existing| entry_id(existing).cmp(id))
        {
            Ok(position) if self.entries[position] == entry => false,
            Ok(position) => {
                self.entries[position] = entry;
                true
            }
            Err(position) => {
                self.entries.insert(position, entry);
                true
            }
        }
    }

    /// Entry for `id`.
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.entries
            .binary_search_by(|existing| entry_id(existing).cmp(id))
            .ok()
            .map(|position| &self.entries[position])
    }

    /// Entry ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(entry_id)
    }

    pub fn entries(&self) -> &[Element] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the loaded file differs from its normalized form.
    pub fn needs_rewrite(&self) -> bool {
        self.needs_rewrite
    }

    /// The document as a single `<addons>` tree.
    pub fn to_element(&self) -> Element {
        Element {
            name: INDEX_ROOT.to_string(),
            attributes: Vec::new(),
            children: self.entries.iter().cloned().map(Node::Element).collect(),
        }
    }

    /// Serialize with an XML declaration, four-space indentation and a
    /// trailing newline.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_element().to_document_bytes()?)
    }
}

fn entry_id(entry: &Element) -> &str {
    entry.attr(ID_ATTRIBUTE).unwrap_or_default()
}
