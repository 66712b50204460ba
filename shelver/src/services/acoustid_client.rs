//! AcoustID API client
//!
//! Looks up a Chromaprint fingerprint and returns scored candidates carrying
//! artist, title, album and track position. The album comes from the first
//! release attached to the recording, falling back to its release group.

use crate::models::PartialTags;
use crate::services::fingerprinter::AudioFingerprint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const ACOUSTID_BASE_URL: &str = "https://api.acoustid.org/v2/lookup";
const USER_AGENT: &str = concat!("shelver/", env!("CARGO_PKG_VERSION"));
const LOOKUP_META: &str = "recordings releasegroups releases tracks";

/// AcoustID client errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// AcoustID lookup response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<AcoustIdResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdResult {
    pub id: String,
    /// Match confidence (0.0 to 1.0)
    pub score: f64,
    pub recordings: Option<Vec<AcoustIdRecording>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdRecording {
    /// MusicBrainz Recording MBID
    pub id: String,
    pub title: Option<String>,
    pub artists: Option<Vec<AcoustIdArtist>>,
    pub releases: Option<Vec<AcoustIdRelease>>,
    pub releasegroups: Option<Vec<AcoustIdReleaseGroup>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdArtist {
    pub id: String,
    pub name: String,
    pub joinphrase: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdRelease {
    pub id: String,
    pub title: Option<String>,
    pub mediums: Option<Vec<AcoustIdMedium>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdMedium {
    pub position: Option<u32>,
    pub tracks: Option<Vec<AcoustIdTrack>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdTrack {
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcoustIdReleaseGroup {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
}

/// One scored identification
#[derive(Debug, Clone, PartialEq)]
pub struct LookupCandidate {
    pub score: f64,
    pub recording_id: Option<String>,
    pub tags: PartialTags,
}

/// Capability: identify a fingerprint
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Candidates ordered by descending score; empty when nothing matched
    async fn lookup(&self, fingerprint: &AudioFingerprint) -> Result<Vec<LookupCandidate>, LookupError>;
}

/// AcoustID API client
pub struct AcoustIdClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AcoustIdClient {
    pub fn new(api_key: String) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: ACOUSTID_BASE_URL.to_string(),
        })
    }

    /// Point the client at another endpoint (mirrors, local test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LookupService for AcoustIdClient {
    async fn lookup(&self, fingerprint: &AudioFingerprint) -> Result<Vec<LookupCandidate>, LookupError> {
        let duration = fingerprint.duration_seconds.to_string();
        let params = [
            ("client", self.api_key.as_str()),
            ("meta", LOOKUP_META),
            ("duration", duration.as_str()),
            ("fingerprint", fingerprint.fingerprint.as_str()),
        ];

        tracing::debug!(
            duration_seconds = fingerprint.duration_seconds,
            "Querying AcoustID API"
        );

        let response = self
            .http_client
            .post(&self.base_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(LookupError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError(status.as_u16(), error_text));
        }

        let acoustid_response: AcoustIdResponse = response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(e.to_string()))?;

        if acoustid_response.status != "ok" {
            return Err(LookupError::ApiError(
                status.as_u16(),
                format!("status {}", acoustid_response.status),
            ));
        }

        let candidates = candidates_from_response(&acoustid_response);

        if let Some(top) = candidates.first() {
            tracing::debug!(
                score = top.score,
                recording = ?top.recording_id,
                candidates = candidates.len(),
                "AcoustID lookup returned candidates"
            );
        }

        Ok(candidates)
    }
}

/// Flatten a lookup response into scored candidates, best first
///
/// Each result contributes its first recording that carries a title.
pub fn candidates_from_response(response: &AcoustIdResponse) -> Vec<LookupCandidate> {
    let mut candidates: Vec<LookupCandidate> = response
        .results
        .iter()
        .filter_map(|result| {
            let recording = result
                .recordings
                .as_deref()?
                .iter()
                .find(|r| r.title.as_deref().is_some_and(|t| !t.trim().is_empty()))?;

            Some(LookupCandidate {
                score: result.score,
                recording_id: Some(recording.id.clone()),
                tags: tags_from_recording(recording),
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

fn tags_from_recording(recording: &AcoustIdRecording) -> PartialTags {
    let artist = recording.artists.as_deref().and_then(credit_name);

    let first_release = recording
        .releases
        .as_deref()
        .and_then(|releases| releases.iter().find(|r| r.title.is_some()));

    let album = first_release.and_then(|r| r.title.clone()).or_else(|| {
        let groups = recording.releasegroups.as_deref()?;
        groups
            .iter()
            .find(|g| g.group_type.as_deref() == Some("Album"))
            .or_else(|| groups.first())
            .and_then(|g| g.title.clone())
    });

    let track_number = first_release
        .and_then(|r| r.mediums.as_deref())
        .and_then(|mediums| mediums.first())
        .and_then(|m| m.tracks.as_deref())
        .and_then(|tracks| tracks.first())
        .and_then(|t| t.position);

    PartialTags {
        artist,
        album_artist: None,
        album,
        title: recording.title.clone(),
        track_number,
    }
}

/// Join artist credits the way MusicBrainz displays them
fn credit_name(artists: &[AcoustIdArtist]) -> Option<String> {
    if artists.is_empty() {
        return None;
    }
    let mut name = String::new();
    for (i, artist) in artists.iter().enumerate() {
        name.push_str(&artist.name);
        match &artist.joinphrase {
            Some(join) => name.push_str(join),
            None if i + 1 < artists.len() => name.push_str(" & "),
            None => {}
        }
    }
    Some(name.trim().to_string())
}
