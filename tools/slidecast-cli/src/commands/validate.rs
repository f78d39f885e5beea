//! Score a video's QuickTime compatibility.

use std::path::PathBuf;

use slidecast_render_engine::compat::{probe_file, score_compatibility};
use slidecast_render_engine::ffmpeg::FfmpegTool;

pub async fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let probe = probe_file(&FfmpegTool::default(), &path).await?;
    let report = score_compatibility(&probe);

    if json {
        let doc = serde_json::json!({
            "path": path.display().to_string(),
            "duration_secs": probe.duration_secs(),
            "size_bytes": probe.size_bytes(),
            "dimensions": probe.video_dimensions(),
            "compatibility": report,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Validating: {}", path.display());
    if let Some((w, h)) = probe.video_dimensions() {
        println!("  Dimensions: {w}x{h}");
    }
    if let Some(secs) = probe.duration_secs() {
        println!("  Duration:   {secs:.2}s");
    }
    for check in &report.checks {
        let mark = if check.passed { "[OK]  " } else { "[FAIL]" };
        println!("  {mark} {} ({} pts)", check.name, check.points);
    }
    println!(
        "\nScore: {}/{} - {}",
        report.score,
        report.max,
        if report.compatible {
            "QuickTime compatible"
        } else {
            "NOT QuickTime compatible"
        }
    );
    for issue in &report.issues {
        println!("  - {issue}");
    }

    Ok(())
}
