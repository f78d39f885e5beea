pub mod check;
pub mod config;
pub mod finalize;
pub mod list;
pub mod render;
pub mod validate;

use std::path::PathBuf;

use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_segment_model::registry::SegmentRegistry;

/// The manifest's registry when one is given, otherwise the built-in one.
pub fn load_registry(manifest: Option<PathBuf>) -> SlidecastResult<SegmentRegistry> {
    match manifest {
        Some(path) => SegmentRegistry::load(&path)
            .map_err(|e| SlidecastError::registry(format!("Failed to load manifest: {e}"))),
        None => Ok(SegmentRegistry::builtin()),
    }
}
