//! shelver - music collection organizer
//!
//! Sorts audio files into `Artist/Album/NN - Title.ext` using embedded tags,
//! falling back to AcoustID fingerprint lookups when tags are incomplete.

use anyhow::Result;
use clap::Parser;
use shelver::cli::Cli;
use shelver::config::{build_organizer, RunConfig};
use shelver::models::PlaceMode;
use shelver::workflow::render_mode_note;
use shelver_common::config::{config_file_path, TomlConfig};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config_file_path(cli.config.as_deref())?;
    let toml_config = TomlConfig::load(config_path.as_deref())?;
    shelver_common::logging::init_logging(&toml_config.logging, cli.verbose)?;

    info!("shelver {}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => debug!("No configuration file found, using defaults"),
    }

    let config = RunConfig::from_sources(&cli, &toml_config)?.preflight()?;
    let organizer = build_organizer(&config)?;

    let report = organizer.run().await?;

    println!();
    println!("{}", report.stats.render());
    println!();
    println!("{}", render_mode_note(config.dry_run, config.mode == PlaceMode::Move));

    Ok(())
}
