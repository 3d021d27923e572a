//! Exclusion rules for addon archives
//!
//! Matching is by name at every directory level:
//! - a directory is pruned when its name equals an ignored name
//! - a file is dropped when its name starts with an ignored name
//!   (so `.git` also drops `.gitattributes`) or ends with an ignored suffix

/// Names excluded from every archive
pub const DEFAULT_IGNORED_NAMES: &[&str] = &[
    ".git",
    ".github",
    ".gitignore",
    ".DS_Store",
    "thumbs.db",
    "Thumbs.db",
    ".idea",
    ".vscode",
    "venv",
    ".venv",
    "__pycache__",
];

/// Compiled bytecode left behind by the interpreter
pub const DEFAULT_IGNORED_SUFFIXES: &[&str] = &[".pyc", ".pyo"];

/// Exclusion rules for filtering addon files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    names: Vec<String>,
    suffixes: Vec<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_IGNORED_NAMES.iter().map(|s| s.to_string()),
            DEFAULT_IGNORED_SUFFIXES.iter().map(|s| s.to_string()),
        )
    }
}

impl IgnoreRules {
    pub fn new(
        names: impl IntoIterator<Item = String>,
        suffixes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            names: names.into_iter().filter(|n| !n.is_empty()).collect(),
            suffixes: suffixes.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// Add names on top of the current set.
    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names
            .extend(names.iter().filter(|n| !n.is_empty()).map(|n| n.to_string()));
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.names.iter().any(|ignored| ignored == name)
    }

    pub fn is_ignored_file(&self, name: &str) -> bool {
        self.names.iter().any(|ignored| name.starts_with(ignored.as_str()))
            || self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }
}
