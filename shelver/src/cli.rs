//! Command line interface

use clap::Parser;
use std::path::PathBuf;

/// Organize a music collection into Artist/Album/Track folders
#[derive(Debug, Clone, Parser)]
#[command(name = "shelver", version, about)]
pub struct Cli {
    /// Directory containing the music to organize
    pub source_dir: PathBuf,

    /// Root of the organized collection (may equal SOURCE_DIR)
    pub dest_dir: PathBuf,

    /// Show what would happen without touching any file
    #[arg(long)]
    pub dryrun: bool,

    /// Move files instead of copying them
    #[arg(long = "move")]
    pub move_files: bool,

    /// AcoustID API key for fingerprint lookups
    #[arg(long, value_name = "KEY")]
    pub acoustid_key: Option<String>,

    /// Minimum AcoustID score (0.0 to 1.0) for accepting a match
    #[arg(long, value_name = "F")]
    pub min_score: Option<f64>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["shelver", "/in", "/out"]).unwrap();
        assert_eq!(cli.source_dir, PathBuf::from("/in"));
        assert_eq!(cli.dest_dir, PathBuf::from("/out"));
        assert!(!cli.dryrun);
        assert!(!cli.move_files);
        assert!(cli.acoustid_key.is_none());
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "shelver",
            "/music",
            "/music",
            "--dryrun",
            "--move",
            "--acoustid-key",
            "k3y",
            "--min-score",
            "0.8",
            "--config",
            "/etc/shelver.toml",
            "-v",
        ])
        .unwrap();

        assert!(cli.dryrun);
        assert!(cli.move_files);
        assert_eq!(cli.acoustid_key.as_deref(), Some("k3y"));
        assert_eq!(cli.min_score, Some(0.8));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/shelver.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_missing_destination_is_rejected() {
        assert!(Cli::try_parse_from(["shelver", "/in"]).is_err());
    }
}
