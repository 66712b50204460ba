//! Resolved track metadata

use std::fmt;

/// Where a track's metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataSource {
    /// Embedded tags were sufficient
    Tag,
    /// AcoustID lookup returned a match at or above the acceptance threshold
    Fingerprint,
    /// Neither tags nor lookup produced usable metadata
    None,
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSource::Tag => write!(f, "tag"),
            MetadataSource::Fingerprint => write!(f, "AcoustID"),
            MetadataSource::None => write!(f, "none"),
        }
    }
}

/// Raw tag values as read from a container, before sufficiency checks
///
/// Every field is optional because formats differ in what they carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialTags {
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track_number: Option<u32>,
}

impl PartialTags {
    /// Artist used for the directory level: track artist, else album artist
    pub fn directory_artist(&self) -> Option<&str> {
        non_blank(self.artist.as_deref()).or_else(|| non_blank(self.album_artist.as_deref()))
    }

    /// True when artist (or album artist), album and title are all present
    pub fn is_sufficient(&self) -> bool {
        self.directory_artist().is_some()
            && non_blank(self.album.as_deref()).is_some()
            && non_blank(self.title.as_deref()).is_some()
    }

    /// True when no field carries anything
    pub fn is_empty(&self) -> bool {
        self.directory_artist().is_none()
            && non_blank(self.album.as_deref()).is_none()
            && non_blank(self.title.as_deref()).is_none()
            && self.track_number.is_none()
    }

    /// Overlay `other` on top of `self`; fields present in `other` win
    pub fn overlaid_with(&self, other: &PartialTags) -> PartialTags {
        PartialTags {
            artist: pick(&other.artist, &self.artist),
            album_artist: pick(&other.album_artist, &self.album_artist),
            album: pick(&other.album, &self.album),
            title: pick(&other.title, &self.title),
            track_number: other.track_number.or(self.track_number),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn pick(preferred: &Option<String>, fallback: &Option<String>) -> Option<String> {
    non_blank(preferred.as_deref())
        .or_else(|| non_blank(fallback.as_deref()))
        .map(str::to_string)
}

/// Metadata used to compute a destination path
///
/// `source == None` implies artist, album and title are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub artist: String,
    pub album_artist: Option<String>,
    pub album: String,
    pub title: String,
    /// Positive track number; zero is never stored
    pub track_number: Option<u32>,
    pub source: MetadataSource,
    /// AcoustID score of the accepted match
    pub confidence: Option<f64>,
}

impl TrackMetadata {
    /// Metadata for a file that could not be classified
    pub fn unresolved() -> Self {
        Self {
            artist: String::new(),
            album_artist: None,
            album: String::new(),
            title: String::new(),
            track_number: None,
            source: MetadataSource::None,
            confidence: None,
        }
    }

    /// Build from tags, or `None` when they are insufficient
    pub fn from_tags(tags: &PartialTags) -> Option<Self> {
        Self::resolved(tags, MetadataSource::Tag, None)
    }

    /// Build from an accepted lookup merged with tags
    pub fn from_fingerprint(merged: &PartialTags, confidence: f64) -> Option<Self> {
        Self::resolved(merged, MetadataSource::Fingerprint, Some(confidence))
    }

    fn resolved(tags: &PartialTags, source: MetadataSource, confidence: Option<f64>) -> Option<Self> {
        if !tags.is_sufficient() {
            return None;
        }
        Some(Self {
            artist: tags.directory_artist()?.to_string(),
            album_artist: non_blank(tags.album_artist.as_deref()).map(str::to_string),
            album: non_blank(tags.album.as_deref())?.to_string(),
            title: non_blank(tags.title.as_deref())?.to_string(),
            track_number: tags.track_number.filter(|n| *n > 0),
            source,
            confidence,
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.source != MetadataSource::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(artist: Option<&str>, album: Option<&str>, title: Option<&str>) -> PartialTags {
        PartialTags {
            artist: artist.map(str::to_string),
            album: album.map(str::to_string),
            title: title.map(str::to_string),
            ..PartialTags::default()
        }
    }

    #[test]
    fn test_sufficient_tags_resolve() {
        let meta = TrackMetadata::from_tags(&tags(Some("Artist"), Some("Album"), Some("Song"))).unwrap();
        assert_eq!(meta.artist, "Artist");
        assert_eq!(meta.source, MetadataSource::Tag);
        assert!(meta.is_resolved());
    }

    #[test]
    fn test_blank_field_is_insufficient() {
        assert!(TrackMetadata::from_tags(&tags(Some("Artist"), Some("  "), Some("Song"))).is_none());
        assert!(TrackMetadata::from_tags(&tags(None, Some("Album"), Some("Song"))).is_none());
    }

    #[test]
    fn test_album_artist_stands_in_for_artist() {
        let mut partial = tags(None, Some("Album"), Some("Song"));
        partial.album_artist = Some("Various Artists".to_string());

        let meta = TrackMetadata::from_tags(&partial).unwrap();
        assert_eq!(meta.artist, "Various Artists");
        assert_eq!(meta.album_artist.as_deref(), Some("Various Artists"));
    }

    #[test]
    fn test_track_zero_is_dropped() {
        let mut partial = tags(Some("A"), Some("B"), Some("C"));
        partial.track_number = Some(0);
        assert_eq!(TrackMetadata::from_tags(&partial).unwrap().track_number, None);
    }

    #[test]
    fn test_overlay_prefers_other() {
        let base = tags(Some("Tag Artist"), Some("Tag Album"), None);
        let lookup = tags(Some("Lookup Artist"), None, Some("Lookup Title"));

        let merged = base.overlaid_with(&lookup);
        assert_eq!(merged.artist.as_deref(), Some("Lookup Artist"));
        assert_eq!(merged.album.as_deref(), Some("Tag Album"));
        assert_eq!(merged.title.as_deref(), Some("Lookup Title"));
    }

    #[test]
    fn test_unresolved_is_empty() {
        let meta = TrackMetadata::unresolved();
        assert!(meta.artist.is_empty() && meta.album.is_empty() && meta.title.is_empty());
        assert!(!meta.is_resolved());
    }
}
