//! Placement planning
//!
//! Turns resolved metadata into one `Action` per audio file. Planning only
//! reads the filesystem (existence checks, content comparison for copy-mode
//! convergence); all writes belong to the executor.

use crate::models::{Action, PlaceMode, SkipReason, SourceFile, TrackMetadata};
use crate::services::path_builder::{build_path, disambiguate, DestinationAllocator};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

const COMPARE_CHUNK: usize = 64 * 1024;

/// Plans placements under one destination root
#[derive(Debug, Clone)]
pub struct PlacementPlanner {
    dest_root: PathBuf,
    mode: PlaceMode,
}

impl PlacementPlanner {
    pub fn new(dest_root: PathBuf, mode: PlaceMode) -> Self {
        Self { dest_root, mode }
    }

    /// Decide what happens to `file`
    ///
    /// Walks the collision variants of the computed destination. The first
    /// variant that is the file itself yields `AlreadyCorrectLocation`; in
    /// copy mode an occupied variant holding identical bytes yields
    /// `AlreadyAtDestination`; otherwise the first free variant is used.
    pub fn plan(&self, file: &SourceFile, metadata: &TrackMetadata, allocator: &DestinationAllocator) -> Action {
        let relative = build_path(metadata, &file.stem(), &file.extension);
        let candidate = self.dest_root.join(relative);
        let unorganized = !metadata.is_resolved();

        let mut n = 1;
        loop {
            let dest = disambiguate(&candidate, n);

            if dest == file.path {
                return Action::Skip {
                    path: file.path.clone(),
                    reason: SkipReason::AlreadyCorrectLocation,
                };
            }

            if !allocator.is_occupied(&dest) {
                return plan_placement(file.path.clone(), dest, self.mode, unorganized);
            }

            if self.mode == PlaceMode::Copy && !allocator.is_assigned(&dest) && holds_same_content(&file.path, &dest) {
                return Action::Skip {
                    path: file.path.clone(),
                    reason: SkipReason::AlreadyAtDestination,
                };
            }

            debug!(dest = %dest.display(), "Destination occupied, trying next variant");
            n += 1;
        }
    }
}

/// `Place` or `Unorganized` for a chosen destination
pub fn plan_placement(source: PathBuf, dest: PathBuf, mode: PlaceMode, unorganized: bool) -> Action {
    if unorganized {
        Action::Unorganized { source, dest, mode }
    } else {
        Action::Place { source, dest, mode }
    }
}

fn holds_same_content(a: &Path, b: &Path) -> bool {
    match files_identical(a, b) {
        Ok(same) => same,
        Err(e) => {
            debug!("Could not compare {} with {}: {}", a.display(), b.display(), e);
            false
        }
    }
}

/// Byte-wise comparison, short-circuiting on size
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let (meta_a, meta_b) = (a.metadata()?, b.metadata()?);
    if !meta_a.is_file() || !meta_b.is_file() || meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a)?);
    let mut reader_b = BufReader::new(File::open(b)?);
    let mut buf_a = vec![0u8; COMPARE_CHUNK];
    let mut buf_b = vec![0u8; COMPARE_CHUNK];

    loop {
        let read = reader_a.read(&mut buf_a)?;
        if read == 0 {
            return Ok(true);
        }
        reader_b.read_exact(&mut buf_b[..read])?;
        if buf_a[..read] != buf_b[..read] {
            return Ok(false);
        }
    }
}
