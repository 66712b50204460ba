//! # Shelver Common Library
//!
//! Shared code for the shelver workspace:
//! - Error types
//! - TOML configuration schema and loading
//! - AcoustID API key resolution
//! - Logging setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
