//! Album art consolidation
//!
//! Each source directory contributes at most one image, copied as `cover.<ext>`
//! into every album folder its audio files were organized into, unless the
//! folder already has a cover.

use crate::models::{ArtCopy, ArtOutcome, SourceDirectory, SourceFile};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File stem album art is stored under
pub const COVER_STEM: &str = "cover";

const PREFERRED_STEMS: &[&str] = &[COVER_STEM, "folder"];

/// Pick the image representing a directory: `cover.*`, then `folder.*`,
/// then the first image in sort order
pub fn select_cover(images: &[SourceFile]) -> Option<&SourceFile> {
    PREFERRED_STEMS
        .iter()
        .find_map(|preferred| images.iter().find(|image| image.stem().eq_ignore_ascii_case(preferred)))
        .or_else(|| images.first())
}

/// True if `folder` holds any `cover.*` file
pub fn folder_has_cover(folder: &Path) -> bool {
    let Ok(entries) = fs::read_dir(folder) else {
        return false;
    };

    entries.flatten().any(|entry| {
        let path = entry.path();
        path.is_file()
            && path
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(COVER_STEM))
    })
}

/// Run-scoped record of art decisions
#[derive(Debug, Default)]
pub struct AlbumArtCollector {
    /// (source directory, album folder) pairs already considered
    handled_pairs: HashSet<(PathBuf, PathBuf)>,
    /// Album folders that received a cover during this run
    covered_folders: HashSet<PathBuf>,
}

impl AlbumArtCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Art copy owed to `album_folder` after a file from `source_dir` was
    /// organized into it, if any
    pub fn plan_copy(&mut self, source_dir: &SourceDirectory, album_folder: &Path) -> Option<ArtCopy> {
        let pair = (source_dir.path.clone(), album_folder.to_path_buf());
        if !self.handled_pairs.insert(pair) {
            return None;
        }

        let image = select_cover(&source_dir.images)?;

        if self.covered_folders.contains(album_folder) || folder_has_cover(album_folder) {
            debug!(folder = %album_folder.display(), "Album art already present");
            return None;
        }

        let file_name = if image.extension.is_empty() {
            COVER_STEM.to_string()
        } else {
            format!("{}.{}", COVER_STEM, image.extension)
        };

        Some(ArtCopy {
            source_image: image.path.clone(),
            dest_image: album_folder.join(file_name),
        })
    }

    /// Remember folders that now have a cover
    pub fn record(&mut self, outcome: &ArtOutcome) {
        let dest_image = match outcome {
            ArtOutcome::Copied { dest_image, .. } | ArtOutcome::AlreadyPresent { dest_image } => dest_image,
            ArtOutcome::Failed { .. } => return,
        };
        if let Some(folder) = dest_image.parent() {
            self.covered_folders.insert(folder.to_path_buf());
        }
    }
}
