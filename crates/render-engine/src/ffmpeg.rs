//! ffmpeg/ffprobe process plumbing and the ffmpeg [`Compositor`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use slidecast_common::config::RenderSettings;
use slidecast_common::error::{SlidecastError, SlidecastResult};

use crate::compositor::{CompositeRequest, Compositor};

/// Locations of the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegTool {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegTool {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn ffmpeg_available(&self) -> bool {
        command_exists(&self.ffmpeg)
    }

    pub fn ffprobe_available(&self) -> bool {
        command_exists(&self.ffprobe)
    }

    /// Run ffmpeg to completion. A non-zero exit becomes a render error
    /// carrying ffmpeg's stderr.
    pub async fn run_ffmpeg<I, S>(&self, args: I) -> SlidecastResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        tracing::debug!(args = ?args, "Running ffmpeg");

        let output = tokio::process::Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SlidecastError::render(format!("Failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlidecastError::render(format!(
                "ffmpeg failed (status {}): {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// Run ffprobe and return its stdout.
    pub async fn run_ffprobe<I, S>(&self, args: I) -> SlidecastResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = tokio::process::Command::new(&self.ffprobe)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SlidecastError::probe(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(SlidecastError::probe(format!(
                "ffprobe failed (status {}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| SlidecastError::probe(format!("ffprobe wrote non-UTF-8 output: {e}")))
    }

    /// Container duration in seconds.
    pub async fn probe_duration(&self, path: &Path) -> SlidecastResult<f64> {
        let raw = self
            .run_ffprobe([
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-show_entries"),
                OsStr::new("format=duration"),
                OsStr::new("-of"),
                OsStr::new("default=noprint_wrappers=1:nokey=1"),
                path.as_os_str(),
            ])
            .await?;
        parse_duration_output(&raw).ok_or_else(|| {
            SlidecastError::probe(format!(
                "No duration reported for {}: {:?}",
                path.display(),
                raw.trim()
            ))
        })
    }
}

/// Composites with `ffmpeg -loop 1 -i image -i audio ... -shortest`.
#[derive(Debug, Clone)]
pub struct FfmpegCompositor {
    tool: FfmpegTool,
    settings: RenderSettings,
}

impl FfmpegCompositor {
    pub fn new(tool: FfmpegTool, settings: RenderSettings) -> Self {
        Self { tool, settings }
    }

    pub fn tool(&self) -> &FfmpegTool {
        &self.tool
    }

    /// Full ffmpeg argument list for one request.
    pub fn build_args(&self, request: &CompositeRequest) -> Vec<String> {
        let s = &self.settings;
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            s.fps.to_string(),
            "-i".to_string(),
            request.image.display().to_string(),
            "-i".to_string(),
            request.audio.display().to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-tune".to_string(),
            "stillimage".to_string(),
            "-preset".to_string(),
            s.preset.clone(),
            "-crf".to_string(),
            s.crf.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            // Odd-sized slides are rejected by libx264 with yuv420p.
            "-vf".to_string(),
            "scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", s.audio_bitrate_kbps.max(64)),
            "-t".to_string(),
            format!("{:.3}", request.duration_cap_secs),
            "-shortest".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            request.output.display().to_string(),
        ]
    }
}

#[async_trait::async_trait]
impl Compositor for FfmpegCompositor {
    async fn compose(&self, request: &CompositeRequest) -> SlidecastResult<()> {
        let started = std::time::Instant::now();
        self.tool.run_ffmpeg(self.build_args(request)).await?;
        tracing::debug!(
            output = %request.output.display(),
            elapsed_ms = started.elapsed().as_millis(),
            "ffmpeg composite finished"
        );
        Ok(())
    }

    async fn probe_duration(&self, path: &Path) -> Option<f64> {
        match self.tool.probe_duration(path).await {
            Ok(secs) => Some(secs),
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "Failed to probe clip duration");
                None
            }
        }
    }

    fn is_available(&self) -> bool {
        self.tool.ffmpeg_available()
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

fn command_exists(binary: &Path) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn parse_duration_output(raw: &str) -> Option<f64> {
    let secs = raw.lines().next()?.trim().parse::<f64>().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(secs)
    } else {
        None
    }
}
