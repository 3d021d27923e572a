//! SyncEngine implementation

use std::fs;
use std::path::{Path, PathBuf};

use addon_archive::{ArchiveBuilder, ArchiveOutcome};
use addon_fs::{ChecksumWriter, ReleaseLayout, RunLock};
use addon_manifest::{AddonDescriptor, ManifestReader, MigrationTable};

use super::report::{AddonFailure, SyncReport};
use crate::assets;
use crate::config::PackagerConfig;
use crate::index::{IndexDocument, IndexReconciler};
use crate::report::{Reporter, SyncEvent};
use crate::{Error, Result};

/// Synchronizes one release root.
///
/// Runs are three sequential steps:
/// - **Discover**: list addon directories of the release root
/// - **Reconcile**: per addon, read the manifest, build the archive, copy
///   metadata, then fold the manifest into the index. A failing addon is
///   reported and skipped
/// - **Persist**: write the index and its checksum if any entry changed
#[derive(Debug, Clone)]
pub struct SyncEngine {
    layout: ReleaseLayout,
    reader: ManifestReader,
    archiver: ArchiveBuilder,
    reconciler: IndexReconciler,
    checksum: ChecksumWriter,
    copy_metadata: bool,
}

impl SyncEngine {
    /// Create an engine with default settings for `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: ReleaseLayout::new(root),
            reader: ManifestReader::new(),
            archiver: ArchiveBuilder::new(),
            reconciler: IndexReconciler::default(),
            checksum: ChecksumWriter::new(),
            copy_metadata: true,
        }
    }

    /// Create an engine for `root` from a loaded configuration
    pub fn from_config(root: &Path, config: &PackagerConfig) -> Self {
        Self {
            layout: config.layout(root),
            reader: config.manifest_reader(),
            archiver: config.archive_builder(),
            reconciler: IndexReconciler::new(config.migration_table()),
            checksum: ChecksumWriter::new(),
            copy_metadata: config.copy_metadata,
        }
    }

    pub fn with_reader(mut self, reader: ManifestReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_archiver(mut self, archiver: ArchiveBuilder) -> Self {
        self.archiver = archiver;
        self
    }

    pub fn with_migrations(mut self, migrations: MigrationTable) -> Self {
        self.reconciler = IndexReconciler::new(migrations);
        self
    }

    pub fn with_copy_metadata(mut self, copy_metadata: bool) -> Self {
        self.copy_metadata = copy_metadata;
        self
    }

    pub fn layout(&self) -> &ReleaseLayout {
        &self.layout
    }

    /// Addon directories of the release root, sorted by name.
    ///
    /// Candidates are real directories (not symlinks) other than the output
    /// directory, whose names do not start with `.`, and that contain a
    /// manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if the release root cannot be read.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = self.layout.root();
        let discovery_error = |source| Error::Discovery {
            path: root.to_path_buf(),
            source,
        };

        let mut candidates = Vec::new();
        for entry in fs::read_dir(root).map_err(discovery_error)? {
            let entry = entry.map_err(discovery_error)?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.starts_with('.') || name == self.layout.output_dir_name() {
                continue;
            }
            if !entry.file_type().map_err(discovery_error)?.is_dir() {
                continue;
            }

            let path = entry.path();
            if self.reader.has_manifest(&path) {
                candidates.push(path);
            } else {
                tracing::debug!(path = %path.display(), "no manifest, not an addon");
            }
        }

        candidates.sort();
        Ok(candidates)
    }

    /// Load the persisted index, or an empty one.
    pub fn load_index(&self) -> Result<IndexDocument> {
        IndexDocument::load(&self.layout.index_path())
    }

    /// Run Discover, Reconcile and Persist once.
    ///
    /// # Errors
    ///
    /// Only errors that abort the whole release root are returned: a held
    /// run lock, an unreadable release root, or a malformed index. Nothing
    /// is written in those cases. Addon and persist failures are recorded
    /// in the [`SyncReport`] instead.
    pub fn sync(&self, reporter: &mut dyn Reporter) -> Result<SyncReport> {
        let root = self.layout.root().to_path_buf();
        reporter.report(&SyncEvent::ReleaseStarted { root: root.clone() });

        let outcome = self.run(reporter);
        if let Err(e) = &outcome {
            reporter.report(&SyncEvent::ReleaseFailed {
                root,
                error: e.to_string(),
            });
        }
        outcome
    }

    fn run(&self, reporter: &mut dyn Reporter) -> Result<SyncReport> {
        let root = self.layout.root();
        if !root.is_dir() {
            return Err(Error::Discovery {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let _lock = RunLock::acquire(&self.layout.lock_path())?;
        let mut index = self.load_index()?;
        let candidates = self.discover()?;

        let mut report = SyncReport::new(root);
        reporter.report(&SyncEvent::AddonsDiscovered {
            root: root.to_path_buf(),
            count: candidates.len(),
        });

        for directory in &candidates {
            if let Err(e) = self.reconcile(directory, &mut index, reporter, &mut report) {
                tracing::debug!(path = %directory.display(), error = %e, "addon failed");
                reporter.report(&SyncEvent::AddonFailed {
                    directory: directory.clone(),
                    error: e.to_string(),
                });
                report.failed.push(AddonFailure {
                    directory: directory.clone(),
                    message: e.to_string(),
                });
            }
        }
        report.discovered = candidates;

        if report.index_changed() || index.needs_rewrite() {
            self.persist(&index, reporter, &mut report);
        } else {
            reporter.report(&SyncEvent::IndexUnchanged {
                path: self.layout.index_path(),
            });
        }

        Ok(report)
    }

    /// Process one addon directory.
    fn reconcile(
        &self,
        directory: &Path,
        index: &mut IndexDocument,
        reporter: &mut dyn Reporter,
        report: &mut SyncReport,
    ) -> Result<()> {
        let descriptor = self.reader.read(directory)?;
        tracing::debug!(id = %descriptor.id, version = %descriptor.version, "read manifest");

        let artifact = self.archiver.build(
            directory,
            &descriptor.id,
            &descriptor.version,
            &self.layout.output_dir(),
        )?;
        let event = match artifact.outcome {
            ArchiveOutcome::Created => {
                report.archives_created.push(artifact.path.clone());
                SyncEvent::ArchiveCreated {
                    addon: descriptor.id.clone(),
                    path: artifact.path,
                    bytes: artifact.byte_size,
                }
            }
            ArchiveOutcome::Reused => {
                report.archives_reused.push(artifact.path.clone());
                SyncEvent::ArchiveReused {
                    addon: descriptor.id.clone(),
                    path: artifact.path,
                    bytes: artifact.byte_size,
                }
            }
        };
        reporter.report(&event);

        if self.copy_metadata {
            self.copy_metadata(&descriptor, reporter)?;
        }

        let merge = self.reconciler.merge(index, &descriptor);
        for applied in merge.migrations {
            reporter.report(&SyncEvent::DependencyMigrated {
                addon: descriptor.id.clone(),
                dependency: applied.addon,
                from_version: applied.from_version,
                to_version: applied.to_version,
            });
        }

        if merge.updated {
            reporter.report(&SyncEvent::AddonUpdated {
                addon: descriptor.id.clone(),
                version: descriptor.version.clone(),
            });
            report.updated.push(descriptor.id);
        } else {
            reporter.report(&SyncEvent::AddonUnchanged {
                addon: descriptor.id,
                version: descriptor.version,
            });
        }
        Ok(())
    }

    fn copy_metadata(
        &self,
        descriptor: &AddonDescriptor,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        let destination = self.layout.addon_output_dir(&descriptor.id);
        let copy = assets::copy_metadata(descriptor, self.reader.file_name(), &destination)?;

        for path in &copy.missing {
            reporter.report(&SyncEvent::AssetMissing {
                addon: descriptor.id.clone(),
                path: path.clone(),
            });
        }
        for path in &copy.rejected {
            reporter.report(&SyncEvent::AssetRejected {
                addon: descriptor.id.clone(),
                path: path.clone(),
            });
        }
        reporter.report(&SyncEvent::MetadataCopied {
            addon: descriptor.id.clone(),
            files: copy.file_count(),
        });
        Ok(())
    }

    /// Write the index, then its checksum. The checksum is only written if
    /// the index was.
    fn persist(&self, index: &IndexDocument, reporter: &mut dyn Reporter, report: &mut SyncReport) {
        let index_path = self.layout.index_path();

        let bytes = match index.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => return persist_failed(reporter, report, &index_path, e),
        };
        if let Err(e) = addon_fs::io::write_atomic(&index_path, &bytes) {
            return persist_failed(reporter, report, &index_path, e.into());
        }
        report.index_written = true;
        reporter.report(&SyncEvent::FileWritten {
            path: index_path,
            bytes: bytes.len() as u64,
        });

        let checksum_path = self.layout.checksum_path();
        match self.checksum.write(&bytes, &checksum_path) {
            Ok(record) => {
                reporter.report(&SyncEvent::FileWritten {
                    path: checksum_path,
                    bytes: record.as_str().len() as u64,
                });
                report.checksum = Some(record);
            }
            Err(e) => persist_failed(reporter, report, &checksum_path, e.into()),
        }
    }
}

fn persist_failed(reporter: &mut dyn Reporter, report: &mut SyncReport, path: &Path, error: Error) {
    tracing::debug!(path = %path.display(), error = %error, "persist failed");
    reporter.report(&SyncEvent::PersistFailed {
        path: path.to_path_buf(),
        error: error.to_string(),
    });
    report.persist_errors.push(error.to_string());
}
