//! Test Helper Utilities
//!
//! Fake capabilities plus temp tree builders, so whole runs can be exercised
//! without real audio or network access.
//!
//! Test "audio" files contain their original file name as a label. The fakes
//! key on that label, so tags follow a file when it is moved or copied.

#![allow(dead_code)]

use async_trait::async_trait;
use shelver::models::{Action, PartialTags, PlaceMode};
use shelver::services::acoustid_client::{LookupCandidate, LookupError, LookupService};
use shelver::services::fingerprinter::{AudioFingerprint, FingerprintError, FingerprintSource};
use shelver::services::metadata_resolver::{Identifier, MetadataResolver};
use shelver::services::plan_executor::{DryRunSimulator, FsExecutor, PlanApplier};
use shelver::services::rate_limiter::LookupThrottle;
use shelver::services::tag_reader::{TagError, TagReader};
use shelver::workflow::{OrganizeOptions, Organizer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use walkdir::WalkDir;

/// Tags looked up by file label; unknown labels have no tags
#[derive(Clone, Default)]
pub struct FilenameTags {
    tags: HashMap<String, PartialTags>,
    corrupt: Vec<String>,
}

impl FilenameTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, tags: PartialTags) -> Self {
        self.tags.insert(file_name.to_string(), tags);
        self
    }

    /// Reading this file fails as if the container were damaged
    pub fn with_corrupt(mut self, file_name: &str) -> Self {
        self.corrupt.push(file_name.to_string());
        self
    }
}

impl TagReader for FilenameTags {
    fn read_tags(&self, path: &Path) -> Result<PartialTags, TagError> {
        let name = label(path);
        if self.corrupt.contains(&name) {
            return Err(TagError::ReadError("invalid frame header".to_string()));
        }
        Ok(self.tags.get(&name).cloned().unwrap_or_default())
    }
}

/// Fingerprint is the file label, so lookups can be scripted per file
pub struct NameFingerprint;

#[async_trait]
impl FingerprintSource for NameFingerprint {
    async fn fingerprint(&self, path: &Path) -> Result<AudioFingerprint, FingerprintError> {
        Ok(AudioFingerprint {
            fingerprint: label(path),
            duration_seconds: 180,
        })
    }
}

/// Lookup answers keyed by fingerprint, recording when each call arrived
#[derive(Clone, Default)]
pub struct ScriptedLookup {
    answers: HashMap<String, Vec<LookupCandidate>>,
    calls: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, file_name: &str, score: f64, tags: PartialTags) -> Self {
        self.answers.insert(
            file_name.to_string(),
            vec![LookupCandidate {
                score,
                recording_id: Some(format!("mbid-{}", file_name)),
                tags,
            }],
        );
        self
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupService for ScriptedLookup {
    async fn lookup(&self, fingerprint: &AudioFingerprint) -> Result<Vec<LookupCandidate>, LookupError> {
        self.calls.lock().unwrap().push(Instant::now());
        Ok(self
            .answers
            .get(&fingerprint.fingerprint)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn tags(artist: &str, album: &str, title: &str, track: Option<u32>) -> PartialTags {
    PartialTags {
        artist: Some(artist.to_string()),
        album_artist: None,
        album: Some(album.to_string()),
        title: Some(title.to_string()),
        track_number: track,
    }
}

/// Builder for an organizer wired with fakes
pub struct TestRun {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub mode: PlaceMode,
    pub dry_run: bool,
    pub tags: FilenameTags,
    pub lookup: Option<ScriptedLookup>,
    pub threshold: f64,
}

impl TestRun {
    pub fn new(source: &Path, dest: &Path, tags: FilenameTags) -> Self {
        Self {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            mode: PlaceMode::Copy,
            dry_run: false,
            tags,
            lookup: None,
            threshold: 0.5,
        }
    }

    pub fn moving(mut self) -> Self {
        self.mode = PlaceMode::Move;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn with_lookup(mut self, lookup: ScriptedLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn organizer(&self) -> Organizer {
        let mut resolver = MetadataResolver::new(Box::new(self.tags.clone()), self.threshold);
        if let Some(lookup) = &self.lookup {
            resolver = resolver.with_identifier(Identifier::new(
                Box::new(NameFingerprint),
                Box::new(lookup.clone()),
                LookupThrottle::default(),
            ));
        }

        let applier: Box<dyn PlanApplier> = if self.dry_run {
            Box::new(DryRunSimulator::new(self.dest.clone()))
        } else {
            Box::new(FsExecutor::new(self.dest.clone()))
        };

        Organizer::new(
            OrganizeOptions {
                source_root: self.source.clone(),
                dest_root: self.dest.clone(),
                mode: self.mode,
                dry_run: self.dry_run,
            },
            resolver,
            applier,
        )
    }
}

/// Write a file (creating parents) labelled with its file name
pub fn write_file(root: &Path, relative: &str) -> PathBuf {
    let name = file_name(Path::new(relative));
    write_file_with(root, relative, name.as_bytes())
}

pub fn write_file_with(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// All regular files under `root`, relative and sorted
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

/// Actions that write something
pub fn placements(actions: &[Action]) -> Vec<&Action> {
    actions
        .iter()
        .filter(|a| matches!(a, Action::Place { .. } | Action::Unorganized { .. }))
        .collect()
}

/// Label written by `write_file`; falls back to the current file name
fn label(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|_| file_name(path))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
