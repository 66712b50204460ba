//! Metadata resolution cascade
//!
//! Tags first; fingerprint lookup only when tags are insufficient and an
//! identifier was configured; otherwise the file stays unresolved. Lookup
//! problems never escape this module: they degrade the file to
//! `MetadataSource::None` and bump the lookup failure counter.

use crate::models::{PartialTags, SourceFile, TrackMetadata};
use crate::services::acoustid_client::LookupService;
use crate::services::fingerprinter::FingerprintSource;
use crate::services::rate_limiter::LookupThrottle;
use crate::services::tag_reader::TagReader;
use crate::workflow::statistics::RunStats;
use tracing::{debug, info, warn};

/// Result of one fingerprint identification attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Top candidate met the threshold and completed the metadata
    Accepted(TrackMetadata, f64),
    /// Service answered, but nothing usable came back
    Rejected(String),
    /// Fingerprinting or the request itself failed
    TransientError(String),
}

/// Fingerprint source + lookup service + the run's rate limit
pub struct Identifier {
    fingerprinter: Box<dyn FingerprintSource>,
    lookup: Box<dyn LookupService>,
    throttle: LookupThrottle,
}

impl Identifier {
    pub fn new(
        fingerprinter: Box<dyn FingerprintSource>,
        lookup: Box<dyn LookupService>,
        throttle: LookupThrottle,
    ) -> Self {
        Self {
            fingerprinter,
            lookup,
            throttle,
        }
    }

    /// Fingerprint the file and look it up, respecting the rate limit
    pub async fn identify(&self, file: &SourceFile, tags: &PartialTags, threshold: f64) -> LookupOutcome {
        let fingerprint = match self.fingerprinter.fingerprint(&file.path).await {
            Ok(fp) => fp,
            Err(e) => return LookupOutcome::TransientError(e.to_string()),
        };

        self.throttle.acquire().await;

        let candidates = match self.lookup.lookup(&fingerprint).await {
            Ok(candidates) => candidates,
            Err(e) => return LookupOutcome::TransientError(e.to_string()),
        };

        let Some(top) = candidates.first() else {
            return LookupOutcome::Rejected("no match".to_string());
        };

        if top.score < threshold {
            return LookupOutcome::Rejected(format!(
                "best score {:.2} below threshold {:.2}",
                top.score, threshold
            ));
        }

        let merged = tags.overlaid_with(&top.tags);
        match TrackMetadata::from_fingerprint(&merged, top.score) {
            Some(metadata) => LookupOutcome::Accepted(metadata, top.score),
            None => LookupOutcome::Rejected(format!(
                "match with score {:.2} lacks artist, album or title",
                top.score
            )),
        }
    }
}

/// Turns an audio file into `TrackMetadata`
pub struct MetadataResolver {
    tag_reader: Box<dyn TagReader>,
    identifier: Option<Identifier>,
    acceptance_threshold: f64,
}

impl MetadataResolver {
    pub fn new(tag_reader: Box<dyn TagReader>, acceptance_threshold: f64) -> Self {
        Self {
            tag_reader,
            identifier: None,
            acceptance_threshold,
        }
    }

    /// Enable fingerprint fallback
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn has_identifier(&self) -> bool {
        self.identifier.is_some()
    }

    /// Resolve metadata for one audio file
    pub async fn resolve(&self, file: &SourceFile, stats: &mut RunStats) -> TrackMetadata {
        let tags = match self.tag_reader.read_tags(&file.path) {
            Ok(tags) => tags,
            Err(e) => {
                warn!("Error reading metadata from {}: {}", file.path.display(), e);
                PartialTags::default()
            }
        };

        if let Some(metadata) = TrackMetadata::from_tags(&tags) {
            return metadata;
        }

        let Some(identifier) = &self.identifier else {
            debug!(
                file = %file.path.display(),
                partial = ?tags,
                "Insufficient tags and no AcoustID key, skipping acoustic fingerprinting"
            );
            return TrackMetadata::unresolved();
        };

        info!("Insufficient metadata in {}, trying AcoustID...", file.file_name());

        match identifier.identify(file, &tags, self.acceptance_threshold).await {
            LookupOutcome::Accepted(metadata, confidence) => {
                info!(
                    "Match found with {:.0}% confidence: {} - {}",
                    confidence * 100.0,
                    metadata.artist,
                    metadata.title
                );
                stats.record_fingerprint_match();
                metadata
            }
            LookupOutcome::Rejected(reason) => {
                debug!(file = %file.path.display(), reason = %reason, "No confident match found");
                stats.record_lookup_failure();
                TrackMetadata::unresolved()
            }
            LookupOutcome::TransientError(error) => {
                debug!(file = %file.path.display(), error = %error, "AcoustID identification failed");
                stats.record_lookup_failure();
                TrackMetadata::unresolved()
            }
        }
    }
}
