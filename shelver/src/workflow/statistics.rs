//! Run statistics
//!
//! Counters are created at run start, bumped as each outcome is finalized and
//! rendered once when the run ends. Nothing is persisted.

use crate::models::{ArtOutcome, Outcome, SkipReason};
use serde::{Deserialize, Serialize};

const RULE_WIDTH: usize = 60;

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Audio files that reached a final outcome
    pub processed: usize,
    /// Placed under Artist/Album
    pub organized: usize,
    /// Placed under unorganized/
    pub unorganized: usize,
    /// Already where they belong (or identical copy already there)
    pub skipped_already_correct: usize,
    pub art_copied: usize,
    /// Files whose metadata came from an accepted AcoustID match
    pub fingerprint_matches: usize,
    /// Failed file operations
    pub errors: usize,
    /// Lookups that did not produce usable metadata; not counted as errors
    pub lookup_failures: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a finalized audio outcome
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Placed { unorganized, .. } => {
                if *unorganized {
                    self.unorganized += 1;
                } else {
                    self.organized += 1;
                }
            }
            Outcome::Skipped { reason, .. } => match reason {
                SkipReason::AlreadyCorrectLocation | SkipReason::AlreadyAtDestination => {
                    self.skipped_already_correct += 1;
                }
                SkipReason::NotAudio => return,
            },
            Outcome::Failed { .. } => self.errors += 1,
        }
        self.processed += 1;
    }

    pub fn record_art(&mut self, outcome: &ArtOutcome) {
        match outcome {
            ArtOutcome::Copied { .. } => self.art_copied += 1,
            ArtOutcome::AlreadyPresent { .. } => {}
            ArtOutcome::Failed { .. } => self.errors += 1,
        }
    }

    pub fn record_fingerprint_match(&mut self) {
        self.fingerprint_matches += 1;
    }

    pub fn record_lookup_failure(&mut self) {
        self.lookup_failures += 1;
    }

    /// End-of-run summary block
    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        [
            rule.clone(),
            "ORGANIZATION SUMMARY".to_string(),
            rule.clone(),
            format!("Total files processed: {}", self.processed),
            format!("Successfully organized: {}", self.organized),
            format!("Moved to unorganized/: {}", self.unorganized),
            format!("Already in correct location (skipped): {}", self.skipped_already_correct),
            format!("Album art copied: {}", self.art_copied),
            format!("Metadata found via AcoustID: {}", self.fingerprint_matches),
            format!("Errors: {}", self.errors),
            rule,
        ]
        .join("\n")
    }
}

/// Trailing note printed after the summary
pub fn render_mode_note(dry_run: bool, move_files: bool) -> String {
    if dry_run {
        "This was a dry run. No files were actually moved or copied.\n\
         Run without --dryrun to perform the actual organization."
            .to_string()
    } else if move_files {
        "Files were MOVED from source to destination.".to_string()
    } else {
        "Files were COPIED to destination (originals preserved).".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceMode;
    use std::path::PathBuf;

    fn placed(unorganized: bool) -> Outcome {
        Outcome::Placed {
            source: PathBuf::from("/in/a.mp3"),
            dest: PathBuf::from("/out/a.mp3"),
            mode: PlaceMode::Copy,
            unorganized,
        }
    }

    #[test]
    fn test_record_outcomes() {
        let mut stats = RunStats::new();
        stats.record(&placed(false));
        stats.record(&placed(false));
        stats.record(&placed(true));
        stats.record(&Outcome::Skipped {
            path: PathBuf::from("/out/b.mp3"),
            reason: SkipReason::AlreadyCorrectLocation,
        });
        stats.record(&Outcome::Skipped {
            path: PathBuf::from("/in/notes.txt"),
            reason: SkipReason::NotAudio,
        });
        stats.record(&Outcome::Failed {
            path: PathBuf::from("/in/c.mp3"),
            error: "permission denied".to_string(),
        });

        assert_eq!(stats.processed, 5);
        assert_eq!(stats.organized, 2);
        assert_eq!(stats.unorganized, 1);
        assert_eq!(stats.skipped_already_correct, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_record_art() {
        let mut stats = RunStats::new();
        stats.record_art(&ArtOutcome::Copied {
            source_image: PathBuf::from("/in/cover.jpg"),
            dest_image: PathBuf::from("/out/A/B/cover.jpg"),
        });
        stats.record_art(&ArtOutcome::AlreadyPresent {
            dest_image: PathBuf::from("/out/A/B/cover.jpg"),
        });
        stats.record_art(&ArtOutcome::Failed {
            source_image: PathBuf::from("/in/folder.png"),
            error: "disk full".to_string(),
        });

        assert_eq!(stats.art_copied, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.processed, 0);
    }

    #[test]
    fn test_render_summary_block() {
        let stats = RunStats {
            processed: 10,
            organized: 6,
            unorganized: 2,
            skipped_already_correct: 1,
            art_copied: 3,
            fingerprint_matches: 4,
            errors: 1,
            lookup_failures: 2,
        };

        let rule = "=".repeat(60);
        let expected = format!(
            "{rule}\nORGANIZATION SUMMARY\n{rule}\n\
             Total files processed: 10\n\
             Successfully organized: 6\n\
             Moved to unorganized/: 2\n\
             Already in correct location (skipped): 1\n\
             Album art copied: 3\n\
             Metadata found via AcoustID: 4\n\
             Errors: 1\n{rule}"
        );
        assert_eq!(stats.render(), expected);
    }

    #[test]
    fn test_mode_note() {
        assert!(render_mode_note(true, true).contains("dry run"));
        assert!(render_mode_note(false, true).contains("MOVED"));
        assert!(render_mode_note(false, false).contains("COPIED"));
    }
}
