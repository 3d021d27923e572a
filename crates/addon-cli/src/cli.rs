//! CLI argument parsing using clap derive

use clap::Parser;
use std::path::PathBuf;

/// Addon repository packager - archive addons and rebuild the addons.xml index
///
/// Without arguments every configured release root that exists in the
/// current directory is processed.
#[derive(Parser, Debug)]
#[command(name = "addon-pack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Release roots to process instead of the configured ones
    pub roots: Vec<String>,

    /// Configuration file (TOML, JSON or YAML); defaults to ./addon-pack.toml
    #[arg(short, long, env = "ADDON_PACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Emit run events as log records instead of console output
    #[arg(long)]
    pub log: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_roots_and_flags() {
        let cli = Cli::parse_from(["addon-pack", "--no-color", "-v", "matrix", "omega"]);

        assert_eq!(cli.roots, vec!["matrix", "omega"]);
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(!cli.log);
        assert!(cli.config.is_none());
    }
}
