//! Human-readable console output

use std::io::{self, IsTerminal, Write};

use addon_core::{Reporter, SyncEvent, SyncReport};
use colored::{Color, Colorize};

/// Terminal capabilities, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub color: bool,
    pub verbose: bool,
}

impl ConsoleConfig {
    /// Color is used unless disabled by flag or `NO_COLOR`, or stdout is not
    /// a terminal.
    pub fn detect(no_color: bool, verbose: bool) -> Self {
        let color =
            !no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { color, verbose }
    }

    pub fn plain() -> Self {
        Self {
            color: false,
            verbose: false,
        }
    }
}

/// Prints events as they happen. Errors and warnings go to the error
/// stream.
pub struct ConsoleReporter<O: Write, E: Write> {
    config: ConsoleConfig,
    out: O,
    err: E,
}

impl ConsoleReporter<io::Stdout, io::Stderr> {
    pub fn stdio(config: ConsoleConfig) -> Self {
        Self::new(config, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(config: ConsoleConfig, out: O, err: E) -> Self {
        Self { config, out, err }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.config.color {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// One summary line per release root.
    pub fn summary(&mut self, report: &SyncReport) {
        let status = if report.is_clean() {
            self.paint("OK", Color::Green)
        } else {
            self.paint("FAILED", Color::Red)
        };
        let _ = writeln!(
            self.out,
            "{} {}: {} updated, {} archive(s) created, {} failed",
            status,
            report.root.display(),
            report.updated.len(),
            report.archives_created.len(),
            report.failed.len() + report.persist_errors.len(),
        );
    }

    fn line(&mut self, marker: &str, color: Color, message: String) {
        let marker = self.paint(marker, color);
        let _ = writeln!(self.out, "   {} {}", marker, message);
    }

    fn error_line(&mut self, label: &str, color: Color, message: String) {
        let label = self.paint(label, color);
        let _ = writeln!(self.err, "{}: {}", label, message);
    }
}

impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn report(&mut self, event: &SyncEvent) {
        let verbose = self.config.verbose;
        match event {
            SyncEvent::ReleaseStarted { root } => {
                let marker = self.paint("=>", Color::Blue);
                let _ = writeln!(self.out, "{} Processing {}", marker, root.display());
            }
            SyncEvent::ArchiveCreated { path, bytes, .. } => {
                self.line("+", Color::Green, format!("{} ({})", path.display(), human_size(*bytes)))
            }
            SyncEvent::ArchiveReused { path, bytes, .. } if verbose => {
                self.line("=", Color::Cyan, format!("{} ({})", path.display(), human_size(*bytes)))
            }
            SyncEvent::FileWritten { path, bytes } => self.line(
                "+",
                Color::Green,
                format!("{} ({})", path.display(), human_size(*bytes)),
            ),
            SyncEvent::DependencyMigrated { .. } => {
                self.line("~", Color::Yellow, event.to_string())
            }
            SyncEvent::AddonUpdated { .. } | SyncEvent::IndexUnchanged { .. } => {
                self.line("*", Color::Green, event.to_string())
            }
            SyncEvent::AddonsDiscovered { .. }
            | SyncEvent::AddonUnchanged { .. }
            | SyncEvent::MetadataCopied { .. }
                if verbose =>
            {
                self.line("-", Color::White, event.to_string())
            }
            SyncEvent::AssetMissing { .. } | SyncEvent::AssetRejected { .. } => {
                self.error_line("warning", Color::Yellow, event.to_string())
            }
            SyncEvent::AddonFailed { .. }
            | SyncEvent::PersistFailed { .. }
            | SyncEvent::ReleaseFailed { .. } => {
                self.error_line("error", Color::Red, event.to_string())
            }
            _ => {}
        }
    }
}

/// Format a byte count with binary units, e.g. `1.5 KB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
