//! The segment renderer: one descriptor in, one [`SegmentResult`] out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use slidecast_common::config::AppConfig;
use slidecast_segment_model::segment::{SegmentDescriptor, SegmentResult};

use crate::compositor::{CompositeRequest, Compositor};

/// Directories a run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRoots {
    /// Base for relative slide image paths.
    pub input_root: PathBuf,
    /// Base for relative narration audio paths.
    pub audio_root: PathBuf,
    /// Where clips are written.
    pub output_root: PathBuf,
}

impl RenderRoots {
    pub fn resolve_image(&self, path: &Path) -> PathBuf {
        self.input_root.join(path)
    }

    pub fn resolve_audio(&self, path: &Path) -> PathBuf {
        self.audio_root.join(path)
    }

    pub fn output_path(&self, descriptor: &SegmentDescriptor) -> PathBuf {
        self.output_root.join(descriptor.output_file_name())
    }
}

impl From<&AppConfig> for RenderRoots {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_root: config.input_root.clone(),
            audio_root: config.audio_root.clone(),
            output_root: config.output_root.clone(),
        }
    }
}

/// Renders single segments through a [`Compositor`].
///
/// `render` never returns an error: every failure is folded into the
/// result's status. Cloning is cheap and shares the compositor.
#[derive(Clone)]
pub struct SegmentRenderer {
    compositor: Arc<dyn Compositor>,
    roots: RenderRoots,
}

impl SegmentRenderer {
    pub fn new(compositor: Arc<dyn Compositor>, roots: RenderRoots) -> Self {
        Self { compositor, roots }
    }

    pub fn roots(&self) -> &RenderRoots {
        &self.roots
    }

    pub fn compositor(&self) -> &dyn Compositor {
        self.compositor.as_ref()
    }

    /// Render one segment.
    ///
    /// Audio is checked before the image, and a missing input returns before
    /// anything touches the filesystem or the compositor. A compositor that
    /// reports success without leaving a file at the output path yields
    /// `RenderFailed`. Failed renders leave whatever the compositor wrote.
    pub async fn render(&self, descriptor: &SegmentDescriptor) -> SegmentResult {
        let audio = self.roots.resolve_audio(&descriptor.audio_path);
        if !is_file(&audio).await {
            tracing::warn!(
                ordinal = descriptor.ordinal,
                title = %descriptor.title,
                path = %audio.display(),
                "Audio input missing"
            );
            return SegmentResult::missing_input(descriptor.clone(), &audio);
        }

        let image = self.roots.resolve_image(&descriptor.image_path);
        if !is_file(&image).await {
            tracing::warn!(
                ordinal = descriptor.ordinal,
                title = %descriptor.title,
                path = %image.display(),
                "Image input missing"
            );
            return SegmentResult::missing_input(descriptor.clone(), &image);
        }

        if let Err(err) = tokio::fs::create_dir_all(&self.roots.output_root).await {
            let reason = format!(
                "Failed to create output directory {}: {err}",
                self.roots.output_root.display()
            );
            tracing::error!(ordinal = descriptor.ordinal, "{reason}");
            return SegmentResult::render_failed(descriptor.clone(), reason);
        }

        let request = CompositeRequest {
            image,
            audio,
            duration_cap_secs: descriptor.target_duration_secs,
            output: self.roots.output_path(descriptor),
        };

        let started = std::time::Instant::now();
        if let Err(err) = self.compositor.compose(&request).await {
            tracing::error!(
                ordinal = descriptor.ordinal,
                title = %descriptor.title,
                backend = self.compositor.name(),
                error = %err,
                "Composite failed"
            );
            return SegmentResult::render_failed(descriptor.clone(), err.to_string());
        }

        let size_bytes = match tokio::fs::metadata(&request.output).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => {
                tracing::error!(
                    ordinal = descriptor.ordinal,
                    output = %request.output.display(),
                    "Compositor reported success but no output file exists"
                );
                return SegmentResult::render_failed(
                    descriptor.clone(),
                    format!("no output produced at {}", request.output.display()),
                );
            }
        };

        let duration_secs = self.compositor.probe_duration(&request.output).await;
        tracing::debug!(
            ordinal = descriptor.ordinal,
            output = %request.output.display(),
            size_bytes,
            duration_secs = ?duration_secs,
            elapsed_ms = started.elapsed().as_millis(),
            "Segment rendered"
        );

        SegmentResult::success(descriptor.clone(), request.output, size_bytes, duration_secs)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_resolve_relative_and_keep_absolute() {
        let roots = RenderRoots {
            input_root: PathBuf::from("/work/slides"),
            audio_root: PathBuf::from("/work/audio"),
            output_root: PathBuf::from("/work/out"),
        };

        assert_eq!(
            roots.resolve_image(Path::new("01_intro.png")),
            PathBuf::from("/work/slides/01_intro.png")
        );
        assert_eq!(
            roots.resolve_audio(Path::new("/elsewhere/narration.wav")),
            PathBuf::from("/elsewhere/narration.wav")
        );

        let d = SegmentDescriptor::new(1, "Intro", "a.png", "a.wav", 10.0);
        assert_eq!(roots.output_path(&d), PathBuf::from("/work/out/01_intro.mp4"));
    }

    #[test]
    fn test_roots_from_config() {
        let config = AppConfig::default();
        let roots = RenderRoots::from(&config);
        assert_eq!(roots.output_root, config.output_root);
        assert_eq!(roots.audio_root, config.audio_root);
    }
}
