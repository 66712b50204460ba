//! Source tree scanner
//!
//! Recursive file discovery grouped by owning directory. Every regular file
//! is classified by extension; the organizer plans audio, the album art
//! collector consumes images, everything else is reported and left alone.

use crate::models::{SourceDirectory, SourceFile};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Prefix of the temporary files written by the copy executor
pub const PARTIAL_FILE_PREFIX: &str = ".shelver-partial-";

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Scan summary
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Directories in stable (path) order
    pub directories: Vec<SourceDirectory>,
    /// Entries that could not be read
    pub errors: Vec<String>,
}

impl ScanResult {
    pub fn audio_count(&self) -> usize {
        self.directories.iter().map(|d| d.audio.len()).sum()
    }

    pub fn image_count(&self) -> usize {
        self.directories.iter().map(|d| d.images.len()).sum()
    }
}

/// Source tree scanner
pub struct FileScanner {
    ignore_patterns: Vec<String>,
}

impl FileScanner {
    /// Create new file scanner with default ignore patterns
    ///
    /// Ignores system files like .DS_Store, Thumbs.db, .git, and partial
    /// copies left behind by an interrupted run.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
                PARTIAL_FILE_PREFIX.to_string(),
            ],
        }
    }

    /// Scan directory tree, grouping files by owning directory
    pub fn scan(&self, root_path: &Path) -> Result<ScanResult, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut symlink_visited = HashSet::new();
        let mut groups: BTreeMap<PathBuf, SourceDirectory> = BTreeMap::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        let file = SourceFile::new(entry.path().to_path_buf());
                        groups
                            .entry(file.source_dir.clone())
                            .or_insert_with(|| SourceDirectory::new(file.source_dir.clone()))
                            .push(file);
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    errors.push(e.to_string());
                }
            }
        }

        let directories: Vec<SourceDirectory> = groups
            .into_values()
            .map(|mut dir| {
                dir.sort();
                dir
            })
            .collect();

        let result = ScanResult { directories, errors };

        tracing::debug!(
            directories = result.directories.len(),
            audio = result.audio_count(),
            images = result.image_count(),
            "Scan complete"
        );

        Ok(result)
    }

    /// Check if entry should be processed
    fn should_process_entry(&self, entry: &DirEntry, symlink_visited: &mut HashSet<PathBuf>) -> bool {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        // The root itself is always walked
        if entry.depth() > 0 {
            for pattern in &self.ignore_patterns {
                if file_name.contains(pattern.as_str()) {
                    return false;
                }
            }
        }

        if entry.file_type().is_symlink() {
            if let Ok(canonical) = path.canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", path.display());
                    return false;
                }
            }
        }

        true
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
