//! Concatenate rendered clips into one video with ffmpeg's concat demuxer.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_segment_model::segment::is_segment_clip_name;

use crate::ffmpeg::FfmpegTool;
use crate::report::OutputFileStat;

/// Segment clips from an output directory scan, excluding `output` itself.
///
/// Earlier final videos and other stray files are skipped so a repeated
/// finalize never feeds its own result back in.
pub fn select_segment_clips(files: &[OutputFileStat], output: &Path) -> Vec<PathBuf> {
    let output = std::fs::canonicalize(output).ok();
    files
        .iter()
        .filter(|f| is_segment_clip_name(&f.name))
        .filter(|f| output.is_none() || std::fs::canonicalize(&f.path).ok() != output)
        .map(|f| f.path.clone())
        .collect()
}

/// Concat demuxer list: one `file '<path>'` line per clip.
pub fn build_concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| {
            let escaped = clip.display().to_string().replace('\'', "'\\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}

/// Join `clips` (in the given order) into `output` without re-encoding.
/// Returns the size of the final file in bytes.
///
/// All clips come from the same encoder settings, so stream copy is safe.
pub async fn finalize(tool: &FfmpegTool, clips: &[PathBuf], output: &Path) -> SlidecastResult<u64> {
    if clips.is_empty() {
        return Err(SlidecastError::render("No rendered clips to concatenate"));
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // List entries resolve relative to the list file, so make them absolute.
    let cwd = std::env::current_dir()?;
    let absolute: Vec<PathBuf> = clips.iter().map(|clip| cwd.join(clip)).collect();

    let list_path = output.with_extension("concat.txt");
    tokio::fs::write(&list_path, build_concat_list(&absolute)).await?;

    tracing::info!(
        clips = clips.len(),
        output = %output.display(),
        "Concatenating clips"
    );

    let concatenated = tool
        .run_ffmpeg([
            OsStr::new("-y"),
            OsStr::new("-hide_banner"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            OsStr::new("-f"),
            OsStr::new("concat"),
            OsStr::new("-safe"),
            OsStr::new("0"),
            OsStr::new("-i"),
            list_path.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("+faststart"),
            output.as_os_str(),
        ])
        .await;

    if let Err(err) = tokio::fs::remove_file(&list_path).await {
        tracing::warn!(error = %err, path = %list_path.display(), "Failed to remove concat list");
    }
    concatenated?;

    let size_bytes = match tokio::fs::metadata(output).await {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => {
            return Err(SlidecastError::render(format!(
                "ffmpeg reported success but {} was not created",
                output.display()
            )))
        }
    };

    tracing::info!(output = %output.display(), size_bytes, "Final video written");
    Ok(size_bytes)
}
