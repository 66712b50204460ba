//! Scanned files and their classification

use std::path::{Path, PathBuf};

/// Audio extensions handled by the organizer (lowercase, no dot)
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "mp4", "ogg", "opus", "wma", "wav", "aac"];

/// Image extensions considered album art (lowercase, no dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// File classification by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Audio,
    Image,
    Other,
}

impl FileKind {
    /// Classify an extension (case-insensitive, without the dot)
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.to_ascii_lowercase();
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Audio
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Image
        } else {
            FileKind::Other
        }
    }
}

/// A file found under the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path
    pub path: PathBuf,
    /// Extension as found on disk (original case, no dot, may be empty)
    pub extension: String,
    pub kind: FileKind,
    /// Directory holding the file; album art is associated per directory
    pub source_dir: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let kind = FileKind::from_extension(&extension);
        let source_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            extension,
            kind,
            source_dir,
        }
    }

    /// File name including extension
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// File name without extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// All files of one source directory, each list in stable sort order
#[derive(Debug, Clone, Default)]
pub struct SourceDirectory {
    pub path: PathBuf,
    pub audio: Vec<SourceFile>,
    pub images: Vec<SourceFile>,
    pub others: Vec<SourceFile>,
}

impl SourceDirectory {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    pub fn push(&mut self, file: SourceFile) {
        match file.kind {
            FileKind::Audio => self.audio.push(file),
            FileKind::Image => self.images.push(file),
            FileKind::Other => self.others.push(file),
        }
    }

    pub fn sort(&mut self) {
        self.audio.sort_by(|a, b| a.path.cmp(&b.path));
        self.images.sort_by(|a, b| a.path.cmp(&b.path));
        self.others.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(FileKind::from_extension("mp3"), FileKind::Audio);
        assert_eq!(FileKind::from_extension("FLAC"), FileKind::Audio);
        assert_eq!(FileKind::from_extension("opus"), FileKind::Audio);
        assert_eq!(FileKind::from_extension("JPEG"), FileKind::Image);
        assert_eq!(FileKind::from_extension("png"), FileKind::Image);
        assert_eq!(FileKind::from_extension("txt"), FileKind::Other);
        assert_eq!(FileKind::from_extension(""), FileKind::Other);
    }

    #[test]
    fn test_source_file_parts() {
        let file = SourceFile::new(PathBuf::from("/music/in/Track One.MP3"));
        assert_eq!(file.extension, "MP3");
        assert_eq!(file.kind, FileKind::Audio);
        assert_eq!(file.stem(), "Track One");
        assert_eq!(file.file_name(), "Track One.MP3");
        assert_eq!(file.source_dir, PathBuf::from("/music/in"));
    }
}
