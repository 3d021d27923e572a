//! Structured run events
//!
//! The engine never prints. Everything a run does is emitted as a
//! [`SyncEvent`] to a [`Reporter`], which decides how to present it.

use std::fmt;
use std::path::PathBuf;

/// Severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Something that happened while synchronizing a release root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A release root is about to be processed
    ReleaseStarted { root: PathBuf },
    /// Candidate addon directories were found
    AddonsDiscovered { root: PathBuf, count: usize },
    /// A new archive was written
    ArchiveCreated {
        addon: String,
        path: PathBuf,
        bytes: u64,
    },
    /// The archive for this version already existed
    ArchiveReused {
        addon: String,
        path: PathBuf,
        bytes: u64,
    },
    /// A deprecated dependency pin was rewritten
    DependencyMigrated {
        addon: String,
        dependency: String,
        from_version: String,
        to_version: String,
    },
    /// Manifest and art files were copied next to the archive
    MetadataCopied { addon: String, files: usize },
    /// A referenced art file does not exist
    AssetMissing { addon: String, path: PathBuf },
    /// A referenced art file points outside the addon directory
    AssetRejected { addon: String, path: String },
    /// The index entry for an addon was inserted or replaced
    AddonUpdated { addon: String, version: String },
    /// The index entry for an addon was already current
    AddonUnchanged { addon: String, version: String },
    /// An addon was skipped because one of its steps failed
    AddonFailed { directory: PathBuf, error: String },
    /// A file of the persist step was written
    FileWritten { path: PathBuf, bytes: u64 },
    /// Nothing changed, so nothing was persisted
    IndexUnchanged { path: PathBuf },
    /// Writing the index or checksum failed
    PersistFailed { path: PathBuf, error: String },
    /// The release root could not be processed at all
    ReleaseFailed { root: PathBuf, error: String },
}

impl SyncEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            Self::AssetMissing { .. } | Self::AssetRejected { .. } => EventLevel::Warn,
            Self::AddonFailed { .. } | Self::PersistFailed { .. } | Self::ReleaseFailed { .. } => {
                EventLevel::Error
            }
            _ => EventLevel::Info,
        }
    }

    /// Key/value context for structured sinks.
    pub fn context(&self) -> Vec<(&'static str, String)> {
        let path = |p: &PathBuf| p.display().to_string();
        match self {
            Self::ReleaseStarted { root } => vec![("root", path(root))],
            Self::AddonsDiscovered { root, count } => {
                vec![("root", path(root)), ("count", count.to_string())]
            }
            Self::ArchiveCreated {
                addon,
                path: archive,
                bytes,
            }
            | Self::ArchiveReused {
                addon,
                path: archive,
                bytes,
            } => vec![
                ("addon", addon.clone()),
                ("path", path(archive)),
                ("bytes", bytes.to_string()),
            ],
            Self::DependencyMigrated {
                addon,
                dependency,
                from_version,
                to_version,
            } => vec![
                ("addon", addon.clone()),
                ("dependency", dependency.clone()),
                ("from", from_version.clone()),
                ("to", to_version.clone()),
            ],
            Self::MetadataCopied { addon, files } => {
                vec![("addon", addon.clone()), ("files", files.to_string())]
            }
            Self::AssetMissing { addon, path: asset } => {
                vec![("addon", addon.clone()), ("path", path(asset))]
            }
            Self::AssetRejected { addon, path: asset } => {
                vec![("addon", addon.clone()), ("path", asset.clone())]
            }
            Self::AddonUpdated { addon, version } | Self::AddonUnchanged { addon, version } => {
                vec![("addon", addon.clone()), ("version", version.clone())]
            }
            Self::AddonFailed { directory, error } => {
                vec![("directory", path(directory)), ("error", error.clone())]
            }
            Self::FileWritten { path: file, bytes } => {
                vec![("path", path(file)), ("bytes", bytes.to_string())]
            }
            Self::IndexUnchanged { path: index } => vec![("path", path(index))],
            Self::PersistFailed { path: file, error } => {
                vec![("path", path(file)), ("error", error.clone())]
            }
            Self::ReleaseFailed { root, error } => {
                vec![("root", path(root)), ("error", error.clone())]
            }
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReleaseStarted { root } => write!(f, "Processing {}", root.display()),
            Self::AddonsDiscovered { root, count } => {
                write!(f, "Found {} addon(s) in {}", count, root.display())
            }
            Self::ArchiveCreated { addon, path, .. } => {
                write!(f, "Created archive for {}: {}", addon, path.display())
            }
            Self::ArchiveReused { addon, path, .. } => {
                write!(f, "Archive for {} already exists: {}", addon, path.display())
            }
            Self::DependencyMigrated {
                addon,
                dependency,
                from_version,
                to_version,
            } => write!(
                f,
                "Migrated {} dependency {} {} -> {}",
                addon, dependency, from_version, to_version
            ),
            Self::MetadataCopied { addon, files } => {
                write!(f, "Copied {} metadata file(s) for {}", files, addon)
            }
            Self::AssetMissing { addon, path } => {
                write!(f, "Missing asset for {}: {}", addon, path.display())
            }
            Self::AssetRejected { addon, path } => {
                write!(f, "Ignoring asset outside of {}: {}", addon, path)
            }
            Self::AddonUpdated { addon, version } => write!(f, "Updated {} {}", addon, version),
            Self::AddonUnchanged { addon, version } => {
                write!(f, "{} {} is up to date", addon, version)
            }
            Self::AddonFailed { directory, error } => {
                write!(f, "Skipped {}: {}", directory.display(), error)
            }
            Self::FileWritten { path, .. } => write!(f, "Wrote {}", path.display()),
            Self::IndexUnchanged { path } => write!(f, "No changes to {}", path.display()),
            Self::PersistFailed { path, error } => {
                write!(f, "Failed to write {}: {}", path.display(), error)
            }
            Self::ReleaseFailed { root, error } => {
                write!(f, "Cannot process {}: {}", root.display(), error)
            }
        }
    }
}

/// Receives the events of a run.
pub trait Reporter {
    fn report(&mut self, event: &SyncEvent);
}

/// Forwards events to `tracing`, one structured field per context value.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&mut self, event: &SyncEvent) {
        use tracing::{error, info, warn};

        match event {
            SyncEvent::ReleaseStarted { root } => info!(root = %root.display(), "{}", event),
            SyncEvent::AddonsDiscovered { root, count } => {
                info!(root = %root.display(), count, "{}", event)
            }
            SyncEvent::ArchiveCreated { addon, path, bytes }
            | SyncEvent::ArchiveReused { addon, path, bytes } => {
                info!(addon = %addon, path = %path.display(), bytes, "{}", event)
            }
            SyncEvent::DependencyMigrated {
                addon,
                dependency,
                from_version,
                to_version,
            } => info!(
                addon = %addon,
                dependency = %dependency,
                from = %from_version,
                to = %to_version,
                "{}",
                event
            ),
            SyncEvent::MetadataCopied { addon, files } => {
                info!(addon = %addon, files, "{}", event)
            }
            SyncEvent::AssetMissing { addon, path } => {
                warn!(addon = %addon, path = %path.display(), "{}", event)
            }
            SyncEvent::AssetRejected { addon, path } => {
                warn!(addon = %addon, path = %path, "{}", event)
            }
            SyncEvent::AddonUpdated { addon, version }
            | SyncEvent::AddonUnchanged { addon, version } => {
                info!(addon = %addon, version = %version, "{}", event)
            }
            SyncEvent::AddonFailed {
                directory,
                error: message,
            } => error!(directory = %directory.display(), error = %message, "{}", event),
            SyncEvent::FileWritten { path, bytes } => {
                info!(path = %path.display(), bytes, "{}", event)
            }
            SyncEvent::IndexUnchanged { path } => info!(path = %path.display(), "{}", event),
            SyncEvent::PersistFailed {
                path,
                error: message,
            } => error!(path = %path.display(), error = %message, "{}", event),
            SyncEvent::ReleaseFailed {
                root,
                error: message,
            } => error!(root = %root.display(), error = %message, "{}", event),
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    events: Vec<SyncEvent>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }

    /// Events at the given level.
    pub fn at_level(&self, level: EventLevel) -> impl Iterator<Item = &SyncEvent> {
        self.events.iter().filter(move |e| e.level() == level)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, event: &SyncEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels() {
        let failed = SyncEvent::AddonFailed {
            directory: PathBuf::from("matrix/broken"),
            error: "no manifest".into(),
        };
        let missing = SyncEvent::AssetMissing {
            addon: "a".into(),
            path: PathBuf::from("icon.png"),
        };
        let updated = SyncEvent::AddonUpdated {
            addon: "a".into(),
            version: "1.0.0".into(),
        };

        assert_eq!(failed.level(), EventLevel::Error);
        assert_eq!(missing.level(), EventLevel::Warn);
        assert_eq!(updated.level(), EventLevel::Info);
    }

    #[test]
    fn failure_message_names_directory() {
        let event = SyncEvent::AddonFailed {
            directory: PathBuf::from("matrix/broken"),
            error: "no manifest".into(),
        };
        assert_eq!(event.to_string(), "Skipped matrix/broken: no manifest");
        assert_eq!(
            event.context(),
            vec![
                ("directory", "matrix/broken".to_string()),
                ("error", "no manifest".to_string()),
            ]
        );
    }

    #[test]
    fn memory_reporter_filters_by_level() {
        let mut reporter = MemoryReporter::new();
        reporter.report(&SyncEvent::ReleaseStarted {
            root: PathBuf::from("repo"),
        });
        reporter.report(&SyncEvent::ReleaseFailed {
            root: PathBuf::from("repo"),
            error: "locked".into(),
        });

        assert_eq!(reporter.events().len(), 2);
        assert_eq!(reporter.at_level(EventLevel::Error).count(), 1);
    }
}
