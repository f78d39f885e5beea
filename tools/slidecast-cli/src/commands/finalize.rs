//! Concatenate the clips already rendered into the output directory.

use std::path::PathBuf;

use slidecast_common::config::AppConfig;
use slidecast_render_engine::ffmpeg::FfmpegTool;
use slidecast_render_engine::finalize::{finalize, select_segment_clips};
use slidecast_render_engine::scan_output_dir;

pub async fn run(config: &AppConfig, output: PathBuf) -> anyhow::Result<()> {
    let files = scan_output_dir(&config.output_root).await;
    let clips = select_segment_clips(&files, &output);
    if clips.is_empty() {
        anyhow::bail!("No segment clips found in {}", config.output_root.display());
    }

    println!("Concatenating {} clip(s):", clips.len());
    for clip in &clips {
        println!("  {}", clip.display());
    }
    let skipped = files.len() - clips.len();
    if skipped > 0 {
        println!("  (skipped {skipped} non-segment file(s))");
    }

    let size = finalize(&FfmpegTool::default(), &clips, &output).await?;

    println!(
        "\nFinal video: {} ({:.2} MB)",
        output.display(),
        size as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}
