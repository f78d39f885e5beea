//! Run summary, JSON report, and console lines.

use std::path::{Path, PathBuf};

use serde::Serialize;

use slidecast_common::error::SlidecastResult;
use slidecast_segment_model::segment::{SegmentResult, SegmentStatus};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One clip found in the output directory after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFileStat {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl OutputFileStat {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every segment rendered.
    Complete,
    /// Some segments rendered.
    Partial,
    /// No segment rendered.
    Failed,
}

/// Everything a run produced: per-segment results in registry order and a
/// post-run scan of the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// RFC 3339 timestamp of when the summary was built.
    pub generated_at: String,
    pub output_dir: PathBuf,
    pub results: Vec<SegmentResult>,
    /// Clips on disk after the run, including leftovers from earlier runs.
    pub output_files: Vec<OutputFileStat>,
}

impl RunSummary {
    pub fn new(
        output_dir: PathBuf,
        results: Vec<SegmentResult>,
        output_files: Vec<OutputFileStat>,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            output_dir,
            results,
            output_files,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.count(SegmentStatus::Success)
    }

    pub fn missing(&self) -> usize {
        self.count(SegmentStatus::MissingInput)
    }

    pub fn failed(&self) -> usize {
        self.count(SegmentStatus::RenderFailed)
    }

    pub fn total_output_bytes(&self) -> u64 {
        self.output_files.iter().map(|f| f.size_bytes).sum()
    }

    pub fn status(&self) -> RunStatus {
        match self.succeeded() {
            n if n == self.results.len() => RunStatus::Complete,
            0 => RunStatus::Failed,
            _ => RunStatus::Partial,
        }
    }

    /// Paths of successful clips, in result order.
    pub fn rendered_clips(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter_map(|r| r.output_path().map(Path::to_path_buf))
            .collect()
    }

    fn count(&self, status: SegmentStatus) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }
}

/// Build the JSON report document.
pub fn json_report(summary: &RunSummary) -> serde_json::Value {
    let segments: Vec<_> = summary
        .results
        .iter()
        .map(|r| {
            let d = r.descriptor();
            serde_json::json!({
                "ordinal": d.ordinal,
                "title": d.title,
                "status": r.status(),
                "output": r.output_path(),
                "size_bytes": r.output_size_bytes(),
                "duration_secs": r.duration_secs(),
                "detail": r.detail(),
            })
        })
        .collect();

    let files: Vec<_> = summary
        .output_files
        .iter()
        .map(|f| {
            serde_json::json!({
                "name": f.name,
                "size_bytes": f.size_bytes,
                "size_mb": round2(f.size_mb()),
            })
        })
        .collect();

    let total_bytes = summary.total_output_bytes();
    serde_json::json!({
        "generated_at": summary.generated_at,
        "output_dir": summary.output_dir,
        "status": summary.status(),
        "totals": {
            "segments": summary.results.len(),
            "succeeded": summary.succeeded(),
            "missing_input": summary.missing(),
            "render_failed": summary.failed(),
            "output_files": summary.output_files.len(),
            "total_bytes": total_bytes,
            "total_mb": round2(total_bytes as f64 / BYTES_PER_MB),
        },
        "segments": segments,
        "files": files,
    })
}

/// Write the JSON report, creating parent directories as needed.
pub fn write_json_report(summary: &RunSummary, path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&json_report(summary))?)?;
    tracing::info!(report = %path.display(), "Wrote run report");
    Ok(())
}

/// One line per segment with a severity marker, then a totals line.
pub fn format_console_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::with_capacity(summary.results.len() + 1);
    for r in &summary.results {
        let d = r.descriptor();
        let line = match r.status() {
            SegmentStatus::Success => format!(
                "[OK]   {:02} {} -> {} ({:.2} MB)",
                d.ordinal,
                d.title,
                d.output_file_name(),
                r.output_size_bytes().unwrap_or(0) as f64 / BYTES_PER_MB
            ),
            SegmentStatus::MissingInput => format!(
                "[WARN] {:02} {}: {}",
                d.ordinal,
                d.title,
                r.detail().unwrap_or("missing input")
            ),
            SegmentStatus::RenderFailed => format!(
                "[FAIL] {:02} {}: {}",
                d.ordinal,
                d.title,
                r.detail().unwrap_or("render failed")
            ),
        };
        lines.push(line);
    }
    lines.push(format!(
        "Rendered {}/{} segment(s); {} clip(s) in {} ({:.2} MB)",
        summary.succeeded(),
        summary.results.len(),
        summary.output_files.len(),
        summary.output_dir.display(),
        summary.total_output_bytes() as f64 / BYTES_PER_MB
    ));
    lines
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
