//! Applying planned actions
//!
//! `FsExecutor` performs the file operations; `DryRunSimulator` validates the
//! same actions and reports the same outcomes without touching the disk.
//! Per-file failures become `Outcome::Failed` and never abort the run.

use crate::models::{Action, ArtCopy, ArtOutcome, Outcome, PlaceMode};
use crate::services::album_art::folder_has_cover;
use crate::services::file_scanner::PARTIAL_FILE_PREFIX;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Applies actions produced by the planner
pub trait PlanApplier: Send + Sync {
    fn apply(&self, action: &Action) -> Outcome;

    fn apply_art(&self, art: &ArtCopy) -> ArtOutcome;

    /// True when nothing is written to disk
    fn is_dry_run(&self) -> bool;
}

/// Checks shared by both appliers
pub fn validate_destination(source: &Path, dest: &Path, root: &Path) -> Result<(), String> {
    if source.as_os_str().is_empty() {
        return Err("empty source path".to_string());
    }
    if dest.as_os_str().is_empty() {
        return Err("empty destination path".to_string());
    }
    if !dest.starts_with(root) || dest == root {
        return Err(format!(
            "destination {} is outside {}",
            dest.display(),
            root.display()
        ));
    }
    Ok(())
}

fn placed(source: &Path, dest: &Path, mode: PlaceMode, unorganized: bool) -> Outcome {
    Outcome::Placed {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
        mode,
        unorganized,
    }
}

fn failed(path: &Path, error: impl ToString) -> Outcome {
    Outcome::Failed {
        path: path.to_path_buf(),
        error: error.to_string(),
    }
}

/// Real file operations under `dest_root`
pub struct FsExecutor {
    dest_root: PathBuf,
}

impl FsExecutor {
    pub fn new(dest_root: PathBuf) -> Self {
        Self { dest_root }
    }

    fn place(&self, source: &Path, dest: &Path, mode: PlaceMode, unorganized: bool) -> Outcome {
        if let Err(e) = validate_destination(source, dest, &self.dest_root) {
            return failed(source, e);
        }

        if dest.exists() {
            return failed(source, format!("destination {} already exists", dest.display()));
        }

        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return failed(source, format!("cannot create {}: {}", parent.display(), e));
            }
        }

        let result = match mode {
            PlaceMode::Move => move_file(source, dest),
            PlaceMode::Copy => copy_file(source, dest),
        };

        match result {
            Ok(()) => placed(source, dest, mode, unorganized),
            Err(e) => failed(source, e),
        }
    }
}

impl PlanApplier for FsExecutor {
    fn apply(&self, action: &Action) -> Outcome {
        match action {
            Action::Place { source, dest, mode } => self.place(source, dest, *mode, false),
            Action::Unorganized { source, dest, mode } => self.place(source, dest, *mode, true),
            Action::Skip { path, reason } => Outcome::Skipped {
                path: path.clone(),
                reason: *reason,
            },
        }
    }

    fn apply_art(&self, art: &ArtCopy) -> ArtOutcome {
        let art_failed = |error: String| ArtOutcome::Failed {
            source_image: art.source_image.clone(),
            error,
        };

        if let Err(e) = validate_destination(&art.source_image, &art.dest_image, &self.dest_root) {
            return art_failed(e);
        }

        let Some(folder) = art.dest_image.parent() else {
            return art_failed("destination has no parent folder".to_string());
        };

        if folder_has_cover(folder) {
            return ArtOutcome::AlreadyPresent {
                dest_image: art.dest_image.clone(),
            };
        }

        if let Err(e) = fs::create_dir_all(folder) {
            return art_failed(format!("cannot create {}: {}", folder.display(), e));
        }

        match copy_file(&art.source_image, &art.dest_image) {
            Ok(()) => ArtOutcome::Copied {
                source_image: art.source_image.clone(),
                dest_image: art.dest_image.clone(),
            },
            Err(e) => art_failed(e.to_string()),
        }
    }

    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Validates and reports, never writes
pub struct DryRunSimulator {
    dest_root: PathBuf,
}

impl DryRunSimulator {
    pub fn new(dest_root: PathBuf) -> Self {
        Self { dest_root }
    }

    fn place(&self, source: &Path, dest: &Path, mode: PlaceMode, unorganized: bool) -> Outcome {
        match validate_destination(source, dest, &self.dest_root) {
            Ok(()) => placed(source, dest, mode, unorganized),
            Err(e) => failed(source, e),
        }
    }
}

impl PlanApplier for DryRunSimulator {
    fn apply(&self, action: &Action) -> Outcome {
        match action {
            Action::Place { source, dest, mode } => self.place(source, dest, *mode, false),
            Action::Unorganized { source, dest, mode } => self.place(source, dest, *mode, true),
            Action::Skip { path, reason } => Outcome::Skipped {
                path: path.clone(),
                reason: *reason,
            },
        }
    }

    fn apply_art(&self, art: &ArtCopy) -> ArtOutcome {
        match validate_destination(&art.source_image, &art.dest_image, &self.dest_root) {
            Ok(()) => ArtOutcome::Copied {
                source_image: art.source_image.clone(),
                dest_image: art.dest_image.clone(),
            },
            Err(error) => ArtOutcome::Failed {
                source_image: art.source_image.clone(),
                error,
            },
        }
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Rename, falling back to copy-verify-delete across filesystems
///
/// When the source cannot be deleted after the fallback copy, the copy is
/// removed again so the file exists exactly once.
pub fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        ));
    }

    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("Rename {} failed ({}), copying instead", source.display(), e);
            copy_file(source, dest)?;
            if let Err(e) = fs::remove_file(source) {
                warn!("Cannot remove {} after copy: {}", source.display(), e);
                if let Err(cleanup) = fs::remove_file(dest) {
                    warn!("Cannot remove copy {}: {}", dest.display(), cleanup);
                }
                return Err(e);
            }
            Ok(())
        }
    }
}

/// Copy through a hidden sibling, verify size, keep the modification time,
/// then rename into place
pub fn copy_file(source: &Path, dest: &Path) -> io::Result<()> {
    let file_name = dest
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"))?;
    let partial = dest.with_file_name(format!("{}{}", PARTIAL_FILE_PREFIX, file_name.to_string_lossy()));

    let result = copy_verified(source, &partial).and_then(|()| {
        if dest.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", dest.display()),
            ));
        }
        fs::rename(&partial, dest)
    });

    if result.is_err() && partial.exists() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn copy_verified(source: &Path, partial: &Path) -> io::Result<()> {
    let source_meta = fs::metadata(source)?;
    let written = fs::copy(source, partial)?;

    if written != source_meta.len() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("size mismatch: copied {} of {} bytes", written, source_meta.len()),
        ));
    }

    if let Ok(modified) = source_meta.modified() {
        if let Err(e) = File::options().write(true).open(partial).and_then(|f| f.set_modified(modified)) {
            debug!("Cannot carry modification time to {}: {}", partial.display(), e);
        }
    }

    Ok(())
}
