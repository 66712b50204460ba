//! Planned file actions and their outcomes
//!
//! Both the real executor and the dry-run simulator consume `Action` and
//! report `Outcome`, so a dry run previews exactly what a real run does.

use std::fmt;
use std::path::PathBuf;

/// How a file reaches its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceMode {
    Move,
    Copy,
}

impl PlaceMode {
    pub fn from_move_flag(move_files: bool) -> Self {
        if move_files {
            PlaceMode::Move
        } else {
            PlaceMode::Copy
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            PlaceMode::Move => "move",
            PlaceMode::Copy => "copy",
        }
    }
}

impl fmt::Display for PlaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceMode::Move => write!(f, "MOVE"),
            PlaceMode::Copy => write!(f, "COPY"),
        }
    }
}

/// Why a file is left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// File already sits at its computed destination
    AlreadyCorrectLocation,
    /// Copy mode: destination already holds an identical copy
    AlreadyAtDestination,
    /// Not a supported audio file
    NotAudio,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyCorrectLocation => write!(f, "already in correct location"),
            SkipReason::AlreadyAtDestination => write!(f, "identical file already at destination"),
            SkipReason::NotAudio => write!(f, "not an audio file"),
        }
    }
}

/// One planned step for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Place {
        source: PathBuf,
        dest: PathBuf,
        mode: PlaceMode,
    },
    Skip {
        path: PathBuf,
        reason: SkipReason,
    },
    /// Placement under the reserved `unorganized/` root
    Unorganized {
        source: PathBuf,
        dest: PathBuf,
        mode: PlaceMode,
    },
}

impl Action {
    /// Source path the action concerns
    pub fn source(&self) -> &PathBuf {
        match self {
            Action::Place { source, .. } | Action::Unorganized { source, .. } => source,
            Action::Skip { path, .. } => path,
        }
    }

    /// Destination, if the action writes one
    pub fn dest(&self) -> Option<&PathBuf> {
        match self {
            Action::Place { dest, .. } | Action::Unorganized { dest, .. } => Some(dest),
            Action::Skip { .. } => None,
        }
    }
}

/// Result of applying an `Action`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Placed {
        source: PathBuf,
        dest: PathBuf,
        mode: PlaceMode,
        unorganized: bool,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Album art copy into an album folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtCopy {
    pub source_image: PathBuf,
    pub dest_image: PathBuf,
}

/// Result of applying an `ArtCopy`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtOutcome {
    Copied { source_image: PathBuf, dest_image: PathBuf },
    /// Folder already had a cover when the copy was attempted
    AlreadyPresent { dest_image: PathBuf },
    Failed { source_image: PathBuf, error: String },
}
