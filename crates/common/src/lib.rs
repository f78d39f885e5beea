//! Slidecast Common Utilities
//!
//! Shared infrastructure for all Slidecast crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading (input/audio/output roots, encoder settings)

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
