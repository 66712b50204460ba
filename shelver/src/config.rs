//! Run configuration
//!
//! Merges command line arguments, environment and the TOML file into a
//! validated `RunConfig`, runs the pre-flight checks and assembles the
//! organizer with its production services.

use crate::cli::Cli;
use crate::error::{OrganizeError, OrganizeResult};
use crate::models::PlaceMode;
use crate::services::acoustid_client::AcoustIdClient;
use crate::services::fingerprinter::FpcalcFingerprinter;
use crate::services::metadata_resolver::{Identifier, MetadataResolver};
use crate::services::plan_executor::{DryRunSimulator, FsExecutor, PlanApplier};
use crate::services::rate_limiter::LookupThrottle;
use crate::services::tag_reader::LoftyTagReader;
use crate::workflow::organizer::{OrganizeOptions, Organizer};
use shelver_common::config::{resolve_acoustid_api_key, TomlConfig, DEFAULT_ACCEPTANCE_THRESHOLD};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const WRITE_PROBE_NAME: &str = ".shelver-partial-write-probe";

/// Everything one run needs to know
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub mode: PlaceMode,
    pub dry_run: bool,
    pub acoustid_api_key: Option<String>,
    pub acceptance_threshold: f64,
    pub fpcalc_path: PathBuf,
}

impl RunConfig {
    /// Merge sources
    ///
    /// **Threshold priority:** `--min-score` → TOML → 0.5
    pub fn from_sources(cli: &Cli, toml_config: &TomlConfig) -> OrganizeResult<Self> {
        let threshold = cli
            .min_score
            .or(toml_config.acceptance_threshold)
            .unwrap_or(DEFAULT_ACCEPTANCE_THRESHOLD);

        Ok(Self {
            source_root: cli.source_dir.clone(),
            dest_root: cli.dest_dir.clone(),
            mode: PlaceMode::from_move_flag(cli.move_files),
            dry_run: cli.dryrun,
            acoustid_api_key: resolve_acoustid_api_key(cli.acoustid_key.as_deref(), toml_config),
            acceptance_threshold: validate_threshold(threshold)?,
            fpcalc_path: toml_config.fpcalc_path(),
        })
    }

    /// Check and normalize both roots before any file is touched
    ///
    /// The destination is created when missing, except during a dry run.
    pub fn preflight(mut self) -> OrganizeResult<Self> {
        self.source_root = fs::canonicalize(&self.source_root).map_err(|e| {
            OrganizeError::Configuration(format!(
                "Source directory {} is not accessible: {}",
                self.source_root.display(),
                e
            ))
        })?;

        if !self.source_root.is_dir() {
            return Err(OrganizeError::Configuration(format!(
                "Source {} is not a directory",
                self.source_root.display()
            )));
        }

        if self.dest_root.exists() {
            if !self.dest_root.is_dir() {
                return Err(OrganizeError::Configuration(format!(
                    "Destination {} is not a directory",
                    self.dest_root.display()
                )));
            }
            self.dest_root = fs::canonicalize(&self.dest_root)
                .map_err(|e| OrganizeError::file_system(&self.dest_root, e))?;
        } else if self.dry_run {
            self.dest_root = absolute(&self.dest_root)?;
            info!("Destination {} does not exist yet", self.dest_root.display());
        } else {
            fs::create_dir_all(&self.dest_root).map_err(|e| {
                OrganizeError::Configuration(format!(
                    "Cannot create destination {}: {}",
                    self.dest_root.display(),
                    e
                ))
            })?;
            self.dest_root = fs::canonicalize(&self.dest_root)
                .map_err(|e| OrganizeError::file_system(&self.dest_root, e))?;
        }

        self.check_destination_writable()?;

        if self.is_in_place() && self.mode == PlaceMode::Copy {
            warn!("Source and destination are the same; copy mode leaves the originals in place");
        }

        Ok(self)
    }

    fn check_destination_writable(&self) -> OrganizeResult<()> {
        let unwritable = |detail: String| {
            OrganizeError::Configuration(format!(
                "Destination {} is not writable: {}",
                self.dest_root.display(),
                detail
            ))
        };

        if self.dry_run {
            if let Ok(meta) = fs::metadata(&self.dest_root) {
                if meta.permissions().readonly() {
                    return Err(unwritable("read-only".to_string()));
                }
            }
            return Ok(());
        }

        let probe = self.dest_root.join(WRITE_PROBE_NAME);
        fs::write(&probe, b"").map_err(|e| unwritable(e.to_string()))?;
        fs::remove_file(&probe).map_err(|e| unwritable(e.to_string()))
    }

    /// Source and destination are the same tree
    pub fn is_in_place(&self) -> bool {
        self.source_root == self.dest_root
    }

    pub fn organize_options(&self) -> OrganizeOptions {
        OrganizeOptions {
            source_root: self.source_root.clone(),
            dest_root: self.dest_root.clone(),
            mode: self.mode,
            dry_run: self.dry_run,
        }
    }
}

/// Acceptance threshold must be a score in [0, 1]
pub fn validate_threshold(threshold: f64) -> OrganizeResult<f64> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(OrganizeError::Configuration(format!(
            "Acceptance threshold must be between 0.0 and 1.0, got {}",
            threshold
        )))
    }
}

fn absolute(path: &Path) -> OrganizeResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| OrganizeError::file_system(path, e))?;
    Ok(cwd.join(path))
}

/// Organizer wired with the production services
///
/// Fingerprint lookups are enabled only when an AcoustID key was resolved.
pub fn build_organizer(config: &RunConfig) -> OrganizeResult<Organizer> {
    let mut resolver = MetadataResolver::new(Box::new(LoftyTagReader::new()), config.acceptance_threshold);

    if let Some(key) = &config.acoustid_api_key {
        let client = AcoustIdClient::new(key.clone())
            .map_err(|e| OrganizeError::Configuration(format!("AcoustID client: {}", e)))?;
        let identifier = Identifier::new(
            Box::new(FpcalcFingerprinter::new(config.fpcalc_path.clone())),
            Box::new(client),
            LookupThrottle::default(),
        );
        resolver = resolver.with_identifier(identifier);
        info!(
            threshold = config.acceptance_threshold,
            fpcalc = %config.fpcalc_path.display(),
            "AcoustID fingerprint lookups enabled"
        );
    }

    let applier: Box<dyn PlanApplier> = if config.dry_run {
        Box::new(DryRunSimulator::new(config.dest_root.clone()))
    } else {
        Box::new(FsExecutor::new(config.dest_root.clone()))
    };

    Ok(Organizer::new(config.organize_options(), resolver, applier))
}
