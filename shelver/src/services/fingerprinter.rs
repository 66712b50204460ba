//! Audio fingerprinting via Chromaprint's `fpcalc`
//!
//! The fingerprint algorithm is not reimplemented here. `fpcalc -json` is run
//! as a subprocess and its JSON output is parsed into an `AudioFingerprint`
//! suitable for the AcoustID lookup API.

use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Fingerprinting errors
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("fpcalc not found at {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("fpcalc failed: {0}")]
    ToolFailed(String),

    #[error("Unparseable fpcalc output: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Chromaprint fingerprint plus the duration AcoustID needs alongside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFingerprint {
    pub fingerprint: String,
    pub duration_seconds: u64,
}

/// Capability: compute an acoustic fingerprint for a file
#[async_trait]
pub trait FingerprintSource: Send + Sync {
    async fn fingerprint(&self, path: &Path) -> Result<AudioFingerprint, FingerprintError>;
}

#[derive(Debug, Deserialize)]
struct FpcalcOutput {
    duration: f64,
    fingerprint: String,
}

/// Seconds of audio fingerprinted, as AcoustID recommends
pub const FINGERPRINT_SECONDS: u32 = 120;

/// Runs `fpcalc -json -length 120 <file>`
pub struct FpcalcFingerprinter {
    binary: PathBuf,
}

impl FpcalcFingerprinter {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl FingerprintSource for FpcalcFingerprinter {
    async fn fingerprint(&self, path: &Path) -> Result<AudioFingerprint, FingerprintError> {
        let output = Command::new(&self.binary)
            .arg("-json")
            .arg("-length")
            .arg(FINGERPRINT_SECONDS.to_string())
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FingerprintError::ToolNotFound(self.binary.clone()),
                _ => FingerprintError::IoError(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FingerprintError::ToolFailed(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        let fingerprint = parse_fpcalc_output(&output.stdout)?;

        tracing::debug!(
            file = %path.display(),
            duration_s = fingerprint.duration_seconds,
            fingerprint_length = fingerprint.fingerprint.len(),
            "Fingerprint generated"
        );

        Ok(fingerprint)
    }
}

/// Parse `fpcalc -json` output
pub fn parse_fpcalc_output(stdout: &[u8]) -> Result<AudioFingerprint, FingerprintError> {
    let parsed: FpcalcOutput =
        serde_json::from_slice(stdout).map_err(|e| FingerprintError::ParseError(e.to_string()))?;

    if parsed.fingerprint.trim().is_empty() {
        return Err(FingerprintError::ParseError("empty fingerprint".to_string()));
    }

    Ok(AudioFingerprint {
        fingerprint: parsed.fingerprint,
        duration_seconds: parsed.duration.max(0.0).round() as u64,
    })
}
