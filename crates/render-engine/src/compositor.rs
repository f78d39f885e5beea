//! The compositing seam: still image + audio → time-bounded clip.
//!
//! The renderer only talks to a [`Compositor`]; the ffmpeg implementation
//! lives in [`crate::ffmpeg`] and tests substitute their own.

use std::path::{Path, PathBuf};

use slidecast_common::error::SlidecastResult;

/// Inputs for one compositing call. Paths are already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRequest {
    /// Slide still, looped as video.
    pub image: PathBuf,

    /// Narration track.
    pub audio: PathBuf,

    /// Upper bound on the clip length. The clip also ends with the audio.
    pub duration_cap_secs: f64,

    /// File to create or overwrite.
    pub output: PathBuf,
}

/// Trait for compositing backends.
#[async_trait::async_trait]
pub trait Compositor: Send + Sync {
    /// Produce `request.output`. Returning `Ok` does not guarantee the file
    /// exists; callers verify that separately.
    async fn compose(&self, request: &CompositeRequest) -> SlidecastResult<()>;

    /// Length of a rendered clip in seconds, if this backend can measure it.
    async fn probe_duration(&self, _path: &Path) -> Option<f64> {
        None
    }

    /// Check if this backend is usable on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}
