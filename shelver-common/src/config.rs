//! Configuration loading and AcoustID key resolution
//!
//! The TOML file is optional. Lookup order for the file:
//! 1. Explicit path (command line `--config`)
//! 2. `<user config dir>/shelver/config.toml`
//! 3. `/etc/shelver/config.toml` (Linux only)
//!
//! A missing file yields built-in defaults. A file that exists but cannot be
//! read or parsed is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable holding the AcoustID API key
pub const ACOUSTID_KEY_ENV: &str = "SHELVER_ACOUSTID_KEY";

/// Default minimum AcoustID score for accepting a fingerprint match
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.5;

/// Default Chromaprint command line tool
pub const DEFAULT_FPCALC_PATH: &str = "fpcalc";

/// Configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// AcoustID application API key
    #[serde(default)]
    pub acoustid_api_key: Option<String>,

    /// Minimum AcoustID score (0.0 to 1.0) for accepting a match
    #[serde(default)]
    pub acceptance_threshold: Option<f64>,

    /// Path or name of the `fpcalc` executable
    #[serde(default)]
    pub fpcalc_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config file {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse the located file, or defaults when there is none
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Fingerprint tool path, falling back to `fpcalc` on PATH
    pub fn fpcalc_path(&self) -> PathBuf {
        self.fpcalc_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FPCALC_PATH))
    }
}

/// Locate the configuration file
///
/// An explicit path must exist. Without one, the platform locations are
/// probed; `None` means built-in defaults apply. Nothing is logged here, the
/// caller reports the chosen file once logging is up.
pub fn config_file_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if !path.exists() => Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        Some(path) => Ok(Some(path.to_path_buf())),
        None => Ok(default_config_path()),
    }
}

/// First existing configuration file in the platform search order
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("shelver").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/shelver/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the AcoustID API key
///
/// **Priority:** command line → environment (`SHELVER_ACOUSTID_KEY`) → TOML
///
/// Returns `None` when no source holds a usable key; fingerprint lookups are
/// then disabled for the run.
pub fn resolve_acoustid_api_key(cli_key: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(ACOUSTID_KEY_ENV).ok();
    let toml_key = toml_config.acoustid_api_key.as_deref();

    let candidates = [
        ("command line", cli_key),
        ("environment", env_key.as_deref()),
        ("TOML", toml_key),
    ];

    let sources: Vec<&str> = candidates
        .iter()
        .filter(|(_, key)| key.is_some_and(is_valid_key))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "AcoustID API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    for (source, key) in candidates {
        if let Some(key) = key.filter(|k| is_valid_key(k)) {
            debug!("AcoustID API key loaded from {}", source);
            return Some(key.trim().to_string());
        }
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
