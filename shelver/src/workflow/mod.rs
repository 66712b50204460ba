//! Run orchestration and per-run bookkeeping

pub mod organizer;
pub mod statistics;

pub use organizer::{Organizer, OrganizeOptions, RunContext, RunReport};
pub use statistics::{render_mode_note, RunStats};
