//! Destination path construction
//!
//! `build_path` is a pure function of the metadata (and, for unresolved
//! files, of the original file name). Collisions are resolved afterwards by
//! the `DestinationAllocator`, which appends ` (2)`, ` (3)`, … to the stem.

use crate::models::{MetadataSource, TrackMetadata};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Reserved destination subtree for files that could not be classified
pub const UNORGANIZED_DIR: &str = "unorganized";

/// Maximum characters kept per path segment
pub const MAX_SEGMENT_CHARS: usize = 200;

/// Substitute for segments that sanitize to nothing
pub const UNKNOWN_SEGMENT: &str = "Unknown";

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make one path segment filesystem-safe
///
/// Forbidden and control characters become spaces, whitespace runs collapse,
/// leading/trailing spaces and dots are trimmed, the result is capped at
/// `MAX_SEGMENT_CHARS` characters and an empty result becomes `Unknown`.
pub fn sanitize_segment(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_CHARS.contains(&c) || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = trim_segment(&collapsed).chars().take(MAX_SEGMENT_CHARS).collect();
    let sanitized = trim_segment(&truncated);

    if sanitized.is_empty() {
        UNKNOWN_SEGMENT.to_string()
    } else {
        sanitized.to_string()
    }
}

fn trim_segment(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '.')
}

fn with_extension(stem: String, extension: &str) -> String {
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Relative destination for a track
///
/// - resolved: `Artist/Album/[NN - ]Title.ext`
/// - unresolved: `unorganized/<original stem>.ext`
pub fn build_path(metadata: &TrackMetadata, original_stem: &str, extension: &str) -> PathBuf {
    match metadata.source {
        MetadataSource::Tag | MetadataSource::Fingerprint => {
            let title = sanitize_segment(&metadata.title);
            let file_name = match metadata.track_number {
                Some(track) if track > 0 => format!("{:02} - {}", track, title),
                _ => title,
            };

            PathBuf::from(sanitize_segment(&metadata.artist))
                .join(sanitize_segment(&metadata.album))
                .join(with_extension(file_name, extension))
        }
        MetadataSource::None => PathBuf::from(UNORGANIZED_DIR)
            .join(with_extension(sanitize_segment(original_stem), extension)),
    }
}

/// `n`-th collision variant of `candidate`; `n == 1` is the candidate itself
pub fn disambiguate(candidate: &Path, n: u32) -> PathBuf {
    if n <= 1 {
        return candidate.to_path_buf();
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = candidate
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    candidate.with_file_name(with_extension(format!("{} ({})", stem, n), &extension))
}

/// Tracks which destinations this run has claimed or freed
///
/// A path is occupied when it was assigned earlier in the run, or when it
/// exists on disk and its file stays there. Files moved away earlier in the
/// run are vacated; sources still waiting to be moved are held and do not
/// block a destination either, the organizer moves them out of the way
/// first. Planning consults this view instead of the raw filesystem so a dry
/// run, which never moves anything, makes the same choices a real run would.
#[derive(Debug, Default)]
pub struct DestinationAllocator {
    assigned: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
    held: HashSet<PathBuf>,
}

impl DestinationAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self, path: &Path) -> bool {
        self.is_assigned(path) || self.exists_on_disk(path)
    }

    pub fn is_assigned(&self, path: &Path) -> bool {
        self.assigned.contains(path)
    }

    /// On disk, neither moved away earlier nor waiting to be moved
    pub fn exists_on_disk(&self, path: &Path) -> bool {
        !self.vacated.contains(path) && !self.held.contains(path) && path.exists()
    }

    /// Source that will be moved later in this run
    pub fn hold(&mut self, source: PathBuf) {
        self.held.insert(source);
    }

    /// Source is being planned now; until it actually moves it occupies its path
    pub fn release(&mut self, source: &Path) {
        self.held.remove(source);
    }

    /// Claim a destination
    pub fn assign(&mut self, dest: PathBuf) {
        self.vacated.remove(&dest);
        self.held.remove(&dest);
        self.assigned.insert(dest);
    }

    /// Record that a source was moved away
    pub fn vacate(&mut self, source: PathBuf) {
        self.assigned.remove(&source);
        self.held.remove(&source);
        self.vacated.insert(source);
    }
}
