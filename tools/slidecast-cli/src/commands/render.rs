//! Render every segment and report the outcome.

use std::path::PathBuf;
use std::sync::Arc;

use slidecast_common::config::AppConfig;
use slidecast_render_engine::ffmpeg::{FfmpegCompositor, FfmpegTool};
use slidecast_render_engine::{
    captions, finalize, format_console_lines, run_all, write_json_report, Compositor,
    ExecutionStrategy, RenderRoots, RunStatus, SegmentRenderer,
};

pub struct RenderOptions {
    pub manifest: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub captions: Option<PathBuf>,
    pub finalize: Option<PathBuf>,
    pub strict: bool,
}

pub async fn run(config: AppConfig, opts: RenderOptions) -> anyhow::Result<()> {
    config.validate()?;

    let registry = super::load_registry(opts.manifest)?;
    for issue in registry.ordinal_issues() {
        tracing::warn!(%issue, "Segment ordinal issue");
        println!("[WARN] {issue}");
    }

    std::fs::create_dir_all(&config.output_root).map_err(|e| {
        anyhow::anyhow!(
            "Cannot create output directory {}: {e}",
            config.output_root.display()
        )
    })?;

    let tool = FfmpegTool::default();
    let compositor = FfmpegCompositor::new(tool.clone(), config.render.clone());
    if !compositor.is_available() {
        anyhow::bail!("No supported render backend found (expected ffmpeg in PATH)");
    }

    println!(
        "Rendering {} segment(s) with {} into {}",
        registry.len(),
        compositor.name(),
        config.output_root.display()
    );

    let renderer = SegmentRenderer::new(Arc::new(compositor), RenderRoots::from(&config));
    let strategy = ExecutionStrategy::from_concurrency(config.concurrency);
    let summary = run_all(&renderer, registry.descriptors(), strategy).await;

    println!();
    for line in format_console_lines(&summary) {
        println!("{line}");
    }

    if let Some(path) = &opts.report {
        write_json_report(&summary, path)?;
        println!("Report: {}", path.display());
    }

    if let Some(path) = &opts.captions {
        let cues = captions::write_captions(&summary.results, path)?;
        println!("Captions: {} ({cues} cue(s))", path.display());
    }

    if let Some(path) = &opts.finalize {
        let clips = summary.rendered_clips();
        if clips.is_empty() {
            println!("[WARN] Nothing to finalize: no segment rendered");
        } else {
            let size = finalize::finalize(&tool, &clips, path).await?;
            println!(
                "Final video: {} ({:.2} MB)",
                path.display(),
                size as f64 / (1024.0 * 1024.0)
            );
        }
    }

    if opts.strict && summary.status() != RunStatus::Complete {
        anyhow::bail!(
            "{} of {} segment(s) did not render",
            summary.missing() + summary.failed(),
            summary.results.len()
        );
    }

    Ok(())
}
