//! Organization run loop
//!
//! Scan → resolve → plan → apply → record. Metadata for every audio file is
//! resolved before the first file is placed, so in move mode a source that is
//! about to leave never forces another track onto a ` (2)` name. All mutable
//! run state lives in a `RunContext` created per run and threaded through the
//! loop explicitly.

use crate::error::OrganizeResult;
use crate::models::{Action, ArtOutcome, Outcome, PlaceMode, SkipReason, SourceDirectory, SourceFile, TrackMetadata};
use crate::services::album_art::AlbumArtCollector;
use crate::services::file_scanner::FileScanner;
use crate::services::metadata_resolver::MetadataResolver;
use crate::services::path_builder::DestinationAllocator;
use crate::services::placement_planner::PlacementPlanner;
use crate::services::plan_executor::PlanApplier;
use crate::workflow::statistics::RunStats;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What to organize and how
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub mode: PlaceMode,
    pub dry_run: bool,
}

/// Mutable state of one run
#[derive(Debug, Default)]
pub struct RunContext {
    pub stats: RunStats,
    pub allocator: DestinationAllocator,
    pub art: AlbumArtCollector,
    /// Actions in the order they were applied
    pub actions: Vec<Action>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update destination bookkeeping once an outcome is final
    fn settle(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Placed { source, dest, mode, .. } => {
                if *mode == PlaceMode::Move {
                    self.allocator.vacate(source.clone());
                }
                self.allocator.assign(dest.clone());
            }
            Outcome::Skipped { path, .. } => self.allocator.assign(path.clone()),
            Outcome::Failed { .. } => {}
        }
    }
}

/// Audio file with its resolved metadata, waiting to be placed
struct QueuedFile<'a> {
    file: &'a SourceFile,
    directory: &'a SourceDirectory,
    metadata: TrackMetadata,
}

/// Placement queue of one run
struct PlacementQueue<'a> {
    files: Vec<QueuedFile<'a>>,
    by_source: HashMap<&'a Path, usize>,
    started: Vec<bool>,
}

impl<'a> PlacementQueue<'a> {
    fn new(files: Vec<QueuedFile<'a>>) -> Self {
        let by_source = files
            .iter()
            .enumerate()
            .map(|(index, queued)| (queued.file.path.as_path(), index))
            .collect();
        let started = vec![false; files.len()];
        Self {
            files,
            by_source,
            started,
        }
    }

    /// Queued source sitting at `path` that has not been placed yet
    fn waiting_at(&self, path: &Path) -> Option<usize> {
        self.by_source
            .get(path)
            .copied()
            .filter(|&index| !self.started[index])
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStats,
    pub actions: Vec<Action>,
}

/// Drives one organization run
pub struct Organizer {
    options: OrganizeOptions,
    scanner: FileScanner,
    resolver: MetadataResolver,
    planner: PlacementPlanner,
    applier: Box<dyn PlanApplier>,
}

impl Organizer {
    pub fn new(options: OrganizeOptions, resolver: MetadataResolver, applier: Box<dyn PlanApplier>) -> Self {
        let planner = PlacementPlanner::new(options.dest_root.clone(), options.mode);
        Self {
            options,
            scanner: FileScanner::new(),
            resolver,
            planner,
            applier,
        }
    }

    /// Organize the whole source tree
    ///
    /// Only a scan failure of the source root is returned as an error; every
    /// per-file problem is logged and counted.
    pub async fn run(&self) -> OrganizeResult<RunReport> {
        info!("Starting music organization...");
        info!("Source: {}", self.options.source_root.display());
        info!("Destination: {}", self.options.dest_root.display());
        info!("Mode: {}", self.options.mode);
        info!("Dry run: {}", self.options.dry_run);

        if !self.resolver.has_identifier() {
            info!("No AcoustID API key configured, files with incomplete tags go to unorganized/");
        }

        let scan = self.scanner.scan(&self.options.source_root)?;
        info!("Found {} audio files", scan.audio_count());

        for scan_error in &scan.errors {
            warn!("Scan problem: {}", scan_error);
        }

        let mut ctx = RunContext::new();
        let mut queued = Vec::with_capacity(scan.audio_count());

        for directory in &scan.directories {
            for other in &directory.others {
                self.skip_non_audio(other, &mut ctx);
            }

            for file in &directory.audio {
                let metadata = self.resolve(file, &mut ctx).await;
                queued.push(QueuedFile {
                    file,
                    directory,
                    metadata,
                });
            }
        }

        let mut queue = PlacementQueue::new(queued);
        if self.options.mode == PlaceMode::Move {
            for entry in &queue.files {
                ctx.allocator.hold(entry.file.path.clone());
            }
        }

        for index in 0..queue.files.len() {
            self.place(index, &mut queue, &mut ctx);
        }

        info!(
            processed = ctx.stats.processed,
            errors = ctx.stats.errors,
            lookup_failures = ctx.stats.lookup_failures,
            "Organization complete"
        );

        Ok(RunReport {
            stats: ctx.stats,
            actions: ctx.actions,
        })
    }

    fn skip_non_audio(&self, file: &SourceFile, ctx: &mut RunContext) {
        let action = Action::Skip {
            path: file.path.clone(),
            reason: SkipReason::NotAudio,
        };
        let outcome = self.applier.apply(&action);
        debug!(file = %file.path.display(), "Skipping non-audio file");

        ctx.stats.record(&outcome);
        ctx.actions.push(action);
    }

    async fn resolve(&self, file: &SourceFile, ctx: &mut RunContext) -> TrackMetadata {
        let metadata = self.resolver.resolve(file, &mut ctx.stats).await;
        debug!(
            file = %file.path.display(),
            source = %metadata.source,
            artist = %metadata.artist,
            album = %metadata.album,
            title = %metadata.title,
            "Metadata resolved"
        );
        metadata
    }

    /// Plan and apply one queued file
    ///
    /// When the chosen destination is still held by a queued source, that
    /// source is placed first and the file is planned again. A source whose
    /// own planning is in progress blocks its path, which ends swap cycles.
    fn place(&self, index: usize, queue: &mut PlacementQueue<'_>, ctx: &mut RunContext) {
        if queue.started[index] {
            return;
        }
        queue.started[index] = true;

        let file = queue.files[index].file;
        let directory = queue.files[index].directory;
        ctx.allocator.release(&file.path);

        let action = loop {
            let action = self.planner.plan(file, &queue.files[index].metadata, &ctx.allocator);
            let waiting = action.dest().and_then(|dest| queue.waiting_at(dest));
            match waiting {
                Some(occupant) => {
                    debug!(
                        file = %file.path.display(),
                        occupant = %queue.files[occupant].file.path.display(),
                        "Destination held by a pending move, placing it first"
                    );
                    self.place(occupant, queue, ctx);
                }
                None => break action,
            }
        };

        let outcome = self.applier.apply(&action);
        self.log_outcome(&outcome);

        ctx.settle(&outcome);
        ctx.stats.record(&outcome);
        ctx.actions.push(action);

        if let Outcome::Placed {
            dest,
            unorganized: false,
            ..
        } = &outcome
        {
            if let Some(album_folder) = dest.parent() {
                if let Some(art) = ctx.art.plan_copy(directory, album_folder) {
                    let art_outcome = self.applier.apply_art(&art);
                    self.log_art(&art_outcome);
                    ctx.art.record(&art_outcome);
                    ctx.stats.record_art(&art_outcome);
                }
            }
        }
    }

    fn log_outcome(&self, outcome: &Outcome) {
        let dry_run = self.applier.is_dry_run();
        match outcome {
            Outcome::Placed {
                source,
                dest,
                mode,
                unorganized,
            } => {
                let target = if *unorganized { " to unorganized" } else { "" };
                if dry_run {
                    info!(
                        "[DRY RUN] Would {}{}: {} -> {}",
                        mode.verb(),
                        target,
                        source.display(),
                        dest.display()
                    );
                } else {
                    let done = match mode {
                        PlaceMode::Move => "Moved",
                        PlaceMode::Copy => "Copied",
                    };
                    info!("{}{}: {} -> {}", done, target, source.display(), dest.display());
                }
            }
            Outcome::Skipped { path, reason } => {
                info!("Skipping {} ({})", path.display(), reason);
            }
            Outcome::Failed { path, error } => {
                error!("Error processing {}: {}", path.display(), error);
            }
        }
    }

    fn log_art(&self, outcome: &ArtOutcome) {
        match outcome {
            ArtOutcome::Copied {
                source_image,
                dest_image,
            } => {
                if self.applier.is_dry_run() {
                    info!(
                        "[DRY RUN] Would copy album art: {} -> {}",
                        source_image.display(),
                        dest_image.display()
                    );
                } else {
                    info!("Copied album art: {} -> {}", source_image.display(), dest_image.display());
                }
            }
            ArtOutcome::AlreadyPresent { dest_image } => {
                debug!(dest = %dest_image.display(), "Album art already present");
            }
            ArtOutcome::Failed { source_image, error } => {
                error!("Error copying album art {}: {}", source_image.display(), error);
            }
        }
    }
}
