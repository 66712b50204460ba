//! Embedded tag reading
//!
//! `TagReader` is the seam between the resolver and the container parsers.
//! The production implementation uses lofty, which normalizes ID3v2, Vorbis
//! comments, MP4 atoms and APE items behind one accessor API.

use crate::models::PartialTags;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::path::Path;
use thiserror::Error;

/// Tag reading errors
#[derive(Debug, Error)]
pub enum TagError {
    /// Container could not be opened or parsed
    #[error("Failed to read tags: {0}")]
    ReadError(String),
}

/// Capability: read whatever tags a file carries
pub trait TagReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<PartialTags, TagError>;
}

/// lofty backed tag reader
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl LoftyTagReader {
    pub fn new() -> Self {
        Self
    }
}

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> Result<PartialTags, TagError> {
        let tagged_file = Probe::open(path)
            .map_err(|e| TagError::ReadError(e.to_string()))?
            .read()
            .map_err(|e| TagError::ReadError(e.to_string()))?;

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            tracing::debug!(file = %path.display(), "No tags present");
            return Ok(PartialTags::default());
        };

        let tags = PartialTags {
            artist: tag.artist().map(|s| s.to_string()),
            album_artist: tag.get_string(&ItemKey::AlbumArtist).map(str::to_string),
            album: tag.album().map(|s| s.to_string()),
            title: tag.title().map(|s| s.to_string()),
            track_number: tag.track(),
        };

        tracing::debug!(
            file = %path.display(),
            artist = ?tags.artist,
            album = ?tags.album,
            title = ?tags.title,
            track = ?tags.track_number,
            "Read tags"
        );

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_nonexistent_file() {
        let reader = LoftyTagReader::new();
        let result = reader.read_tags(Path::new("/nonexistent/file.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_garbage_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("garbage.flac");
        std::fs::write(&path, b"definitely not a flac stream").unwrap();

        let reader = LoftyTagReader::new();
        assert!(reader.read_tags(&path).is_err());
    }
}
