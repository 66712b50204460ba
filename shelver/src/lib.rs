//! shelver library interface
//!
//! Exposes the organization engine for the binary and for integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{OrganizeError, OrganizeResult};
pub use crate::workflow::{Organizer, RunReport, RunStats};
