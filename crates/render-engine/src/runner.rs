//! Batch driver: renders every descriptor and builds the run summary.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use slidecast_segment_model::segment::{SegmentDescriptor, SegmentResult, OUTPUT_EXTENSION};

use crate::renderer::SegmentRenderer;
use crate::report::{OutputFileStat, RunSummary};

/// How renders are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// One render completes before the next begins.
    #[default]
    Sequential,
    /// Up to `n` renders in flight at once.
    Bounded(usize),
}

impl ExecutionStrategy {
    /// `Sequential` for a limit of 0 or 1, `Bounded` above that.
    pub fn from_concurrency(limit: usize) -> Self {
        if limit <= 1 {
            Self::Sequential
        } else {
            Self::Bounded(limit)
        }
    }
}

/// Render every descriptor and summarize.
///
/// Results come back in registry order regardless of strategy, one per
/// descriptor; a failing segment never stops the run. After rendering, the
/// output directory is rescanned so the summary also reflects clips left by
/// earlier runs.
pub async fn run_all(
    renderer: &SegmentRenderer,
    descriptors: &[SegmentDescriptor],
    strategy: ExecutionStrategy,
) -> RunSummary {
    tracing::info!(
        segments = descriptors.len(),
        strategy = ?strategy,
        output_dir = %renderer.roots().output_root.display(),
        "Starting run"
    );

    let results = match strategy {
        ExecutionStrategy::Sequential => run_sequential(renderer, descriptors).await,
        ExecutionStrategy::Bounded(limit) => run_bounded(renderer, descriptors, limit).await,
    };

    let output_dir = renderer.roots().output_root.clone();
    let output_files = scan_output_dir(&output_dir).await;
    let summary = RunSummary::new(output_dir, results, output_files);

    tracing::info!(
        succeeded = summary.succeeded(),
        missing_input = summary.missing(),
        render_failed = summary.failed(),
        output_files = summary.output_files.len(),
        total_bytes = summary.total_output_bytes(),
        "Run finished"
    );
    summary
}

async fn run_sequential(
    renderer: &SegmentRenderer,
    descriptors: &[SegmentDescriptor],
) -> Vec<SegmentResult> {
    let mut results = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let result = renderer.render(descriptor).await;
        log_result(&result);
        results.push(result);
    }
    results
}

async fn run_bounded(
    renderer: &SegmentRenderer,
    descriptors: &[SegmentDescriptor],
    limit: usize,
) -> Vec<SegmentResult> {
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();

    for (index, descriptor) in descriptors.iter().cloned().enumerate() {
        // Only fails on a closed semaphore; unfilled slots are reported below.
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let renderer = renderer.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let result = renderer.render(&descriptor).await;
            (index, result)
        });
    }

    let mut slots: Vec<Option<SegmentResult>> = vec![None; descriptors.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                log_result(&result);
                slots[index] = Some(result);
            }
            Err(err) => tracing::error!(error = %err, "Render task aborted"),
        }
    }

    slots
        .into_iter()
        .zip(descriptors)
        .map(|(slot, descriptor)| {
            slot.unwrap_or_else(|| {
                let result =
                    SegmentResult::render_failed(descriptor.clone(), "render task did not complete");
                log_result(&result);
                result
            })
        })
        .collect()
}

fn log_result(result: &SegmentResult) {
    let d = result.descriptor();
    tracing::info!(
        ordinal = d.ordinal,
        title = %d.title,
        status = result.status().as_str(),
        output = ?result.output_path(),
        size_bytes = ?result.output_size_bytes(),
        detail = ?result.detail(),
        "Segment processed"
    );
}

/// List rendered clips in `dir`, sorted by name. A missing directory yields
/// an empty list.
pub async fn scan_output_dir(dir: &Path) -> Vec<OutputFileStat> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %err, dir = %dir.display(), "Failed to scan output directory");
            }
            return vec![];
        }
    };

    let mut files = vec![];
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, dir = %dir.display(), "Failed reading directory entry");
                break;
            }
        };
        let path = entry.path();
        let is_clip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(OUTPUT_EXTENSION));
        if !is_clip {
            continue;
        }
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        files.push(OutputFileStat {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            size_bytes: meta.len(),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_concurrency() {
        assert_eq!(ExecutionStrategy::from_concurrency(0), ExecutionStrategy::Sequential);
        assert_eq!(ExecutionStrategy::from_concurrency(1), ExecutionStrategy::Sequential);
        assert_eq!(ExecutionStrategy::from_concurrency(4), ExecutionStrategy::Bounded(4));
        assert_eq!(ExecutionStrategy::default(), ExecutionStrategy::Sequential);
    }

    #[tokio::test]
    async fn test_scan_missing_dir_is_empty() {
        let files = scan_output_dir(Path::new("/no/such/slidecast/output")).await;
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_scan_filters_and_sorts_clips() {
        let dir = std::env::temp_dir().join("slidecast_test_scan_output");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("nested.mp4")).unwrap();
        std::fs::write(dir.join("02_b.mp4"), b"bb").unwrap();
        std::fs::write(dir.join("01_a.mp4"), b"a").unwrap();
        std::fs::write(dir.join("report.json"), b"{}").unwrap();

        let files = scan_output_dir(&dir).await;
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["01_a.mp4", "02_b.mp4"]);
        assert_eq!(files[1].size_bytes, 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
