//! Value types shared by the organization pipeline

pub mod action;
pub mod source_file;
pub mod track_metadata;

pub use action::{Action, ArtCopy, ArtOutcome, Outcome, PlaceMode, SkipReason};
pub use source_file::{FileKind, SourceDirectory, SourceFile, AUDIO_EXTENSIONS, IMAGE_EXTENSIONS};
pub use track_metadata::{MetadataSource, PartialTags, TrackMetadata};
