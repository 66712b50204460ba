//! Service modules for the organization pipeline
//!
//! Capability traits (`TagReader`, `FingerprintSource`, `LookupService`,
//! `PlanApplier`) sit at the seams so tests can swap in fakes.

pub mod acoustid_client;
pub mod album_art;
pub mod file_scanner;
pub mod fingerprinter;
pub mod metadata_resolver;
pub mod path_builder;
pub mod placement_planner;
pub mod plan_executor;
pub mod rate_limiter;
pub mod tag_reader;

pub use acoustid_client::{AcoustIdClient, LookupCandidate, LookupError, LookupService};
pub use album_art::{select_cover, AlbumArtCollector};
pub use file_scanner::{FileScanner, ScanError, ScanResult};
pub use fingerprinter::{AudioFingerprint, FingerprintError, FingerprintSource, FpcalcFingerprinter};
pub use metadata_resolver::{Identifier, LookupOutcome, MetadataResolver};
pub use path_builder::{build_path, sanitize_segment, DestinationAllocator};
pub use placement_planner::PlacementPlanner;
pub use plan_executor::{DryRunSimulator, FsExecutor, PlanApplier};
pub use rate_limiter::LookupThrottle;
pub use tag_reader::{LoftyTagReader, TagError, TagReader};
