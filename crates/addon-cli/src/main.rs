//! Addon repository packager CLI
//!
//! Archives every addon of each release root and rebuilds the release's
//! `addons.xml` index and checksum.

mod cli;
mod console;
mod error;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use addon_core::{PackagerConfig, Reporter, SyncEngine, SyncReport, TracingReporter};
use cli::Cli;
use console::{ConsoleConfig, ConsoleReporter};
use error::{CliError, Result};

/// Exit status when some addon or persist step failed.
const PARTIAL_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = ConsoleConfig::detect(cli.no_color, cli.verbose);
    colored::control::set_override(console.color);

    let default_level = if cli.log { "info" } else { "warn" };
    if let Err(e) = logging::init(cli.verbose, default_level, console.color) {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow().bold(), e);
    }

    match run(&cli, console) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(PARTIAL_FAILURE),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Process every release root. Returns whether all of them ran cleanly.
fn run(cli: &Cli, console: ConsoleConfig) -> Result<bool> {
    let cwd = std::env::current_dir()?;
    let config = load_config(cli, &cwd)?;
    let roots = release_roots(cli, &config, &cwd)?;

    if cli.log {
        Ok(sync_all(&roots, &config, &mut TracingReporter::new(), |_| {}))
    } else {
        let mut reporter = ConsoleReporter::stdio(console);
        let mut summaries = Vec::new();
        let clean = sync_all(&roots, &config, &mut reporter, |report| {
            summaries.push(report.clone())
        });
        for report in &summaries {
            reporter.summary(report);
        }
        Ok(clean)
    }
}

fn sync_all(
    roots: &[PathBuf],
    config: &PackagerConfig,
    reporter: &mut dyn Reporter,
    mut on_report: impl FnMut(&SyncReport),
) -> bool {
    let mut clean = true;
    for root in roots {
        match SyncEngine::from_config(root, config).sync(reporter) {
            Ok(report) => {
                clean &= report.is_clean();
                on_report(&report);
            }
            Err(e) => {
                // Already reported as a release failure
                tracing::debug!(root = %root.display(), error = %e, "release root aborted");
                clean = false;
            }
        }
    }
    clean
}

fn load_config(cli: &Cli, cwd: &Path) -> Result<PackagerConfig> {
    let config = match &cli.config {
        Some(path) => PackagerConfig::load(path)?,
        None => PackagerConfig::discover(cwd)?,
    };
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Roots named on the command line are used as given; configured roots
/// that do not exist are skipped.
fn release_roots(cli: &Cli, config: &PackagerConfig, cwd: &Path) -> Result<Vec<PathBuf>> {
    if !cli.roots.is_empty() {
        return Ok(cli.roots.iter().map(PathBuf::from).collect());
    }

    let roots: Vec<PathBuf> = config
        .release_roots
        .iter()
        .filter(|root| {
            let exists = cwd.join(root).is_dir();
            if !exists {
                tracing::debug!(root = %root, "release root not present, skipping");
            }
            exists
        })
        .map(PathBuf::from)
        .collect();

    if roots.is_empty() {
        return Err(CliError::user(format!(
            "No release roots found in {} (looked for: {})",
            cwd.display(),
            config.release_roots.join(", ")
        )));
    }
    Ok(roots)
}
