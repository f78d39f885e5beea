use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_render_engine::captions::caption_cues;
use slidecast_render_engine::{
    run_all, CompositeRequest, Compositor, ExecutionStrategy, RenderRoots, RunStatus,
    SegmentRenderer,
};
use slidecast_segment_model::segment::{SegmentDescriptor, SegmentStatus};

#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Write a small fake clip to the requested output.
    WriteOutput,
    /// Return Ok without writing anything.
    SilentNoOutput,
    /// Return a render error.
    Fail,
    /// Panic for the clip with this file name, write output otherwise.
    PanicFor(&'static str),
}

struct MockCompositor {
    behavior: Behavior,
    calls: Mutex<Vec<CompositeRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay_for_ordinal: fn(&Path) -> Duration,
}

impl MockCompositor {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(vec![]),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay_for_ordinal: |_| Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: fn(&Path) -> Duration) -> Self {
        self.delay_for_ordinal = delay;
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Compositor for MockCompositor {
    async fn compose(&self, request: &CompositeRequest) -> SlidecastResult<()> {
        self.calls.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = (self.delay_for_ordinal)(&request.output);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = match self.behavior {
            Behavior::WriteOutput => {
                tokio::fs::write(&request.output, b"fake mp4 payload").await?;
                Ok(())
            }
            Behavior::SilentNoOutput => Ok(()),
            Behavior::Fail => Err(SlidecastError::render("ffmpeg failed (status 1): bad input")),
            Behavior::PanicFor(name) => {
                if request.output.file_name().is_some_and(|f| f == name) {
                    panic!("compositor crashed on {name}");
                }
                tokio::fs::write(&request.output, b"fake mp4 payload").await?;
                Ok(())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn probe_duration(&self, _path: &Path) -> Option<f64> {
        Some(4.0)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Fresh workspace with `slides/`, `audio/`, and a not-yet-created `out/`.
fn workspace(name: &str) -> (PathBuf, RenderRoots) {
    let root = std::env::temp_dir().join(format!(
        "slidecast_it_{name}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(root.join("slides")).unwrap();
    std::fs::create_dir_all(root.join("audio")).unwrap();
    let roots = RenderRoots {
        input_root: root.join("slides"),
        audio_root: root.join("audio"),
        output_root: root.join("out"),
    };
    (root, roots)
}

fn touch_inputs(roots: &RenderRoots, stem: &str, image: bool, audio: bool) {
    if image {
        std::fs::write(roots.input_root.join(format!("{stem}.png")), b"png").unwrap();
    }
    if audio {
        std::fs::write(roots.audio_root.join(format!("{stem}.wav")), b"wav").unwrap();
    }
}

fn descriptor(ordinal: u32, title: &str, stem: &str) -> SegmentDescriptor {
    SegmentDescriptor::new(
        ordinal,
        title,
        format!("{stem}.png"),
        format!("{stem}.wav"),
        10.0,
    )
}

fn renderer(mock: &Arc<MockCompositor>, roots: &RenderRoots) -> SegmentRenderer {
    let compositor: Arc<dyn Compositor> = mock.clone();
    SegmentRenderer::new(compositor, roots.clone())
}

#[tokio::test]
async fn intro_segment_renders_to_padded_filename() {
    let (root, roots) = workspace("intro");
    touch_inputs(&roots, "a", true, true);
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput));

    let result = renderer(&mock, &roots).render(&descriptor(1, "Intro", "a")).await;

    assert_eq!(result.status(), SegmentStatus::Success);
    assert_eq!(result.output_path(), Some(roots.output_root.join("01_intro.mp4").as_path()));
    assert!(result.output_size_bytes().unwrap() > 0);
    assert_eq!(result.duration_secs(), Some(4.0));

    let calls = mock.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].image, roots.input_root.join("a.png"));
    assert_eq!(calls[0].audio, roots.audio_root.join("a.wav"));
    assert_eq!(calls[0].duration_cap_secs, 10.0);
    drop(calls);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn missing_audio_skips_without_side_effects() {
    let (root, roots) = workspace("missing_audio");
    touch_inputs(&roots, "a", true, false);
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput));

    let result = renderer(&mock, &roots).render(&descriptor(1, "Intro", "a")).await;

    assert_eq!(result.status(), SegmentStatus::MissingInput);
    assert!(result.output_path().is_none());
    assert!(result.output_size_bytes().is_none());
    assert_eq!(mock.call_count(), 0);
    assert!(!roots.output_root.exists(), "no directory should be created");

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn audio_is_checked_before_image() {
    let (root, roots) = workspace("check_order");
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput));
    let renderer = renderer(&mock, &roots);

    // Both missing: the audio path is the one reported.
    let both = renderer.render(&descriptor(1, "Intro", "a")).await;
    assert_eq!(both.status(), SegmentStatus::MissingInput);
    assert!(both.detail().unwrap().ends_with("a.wav"));

    // Audio present, image missing.
    touch_inputs(&roots, "a", false, true);
    let image_missing = renderer.render(&descriptor(1, "Intro", "a")).await;
    assert_eq!(image_missing.status(), SegmentStatus::MissingInput);
    assert!(image_missing.detail().unwrap().ends_with("a.png"));

    assert_eq!(mock.call_count(), 0);
    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn success_without_output_file_is_render_failed() {
    let (root, roots) = workspace("silent");
    touch_inputs(&roots, "a", true, true);
    let mock = Arc::new(MockCompositor::new(Behavior::SilentNoOutput));

    let result = renderer(&mock, &roots).render(&descriptor(1, "Intro", "a")).await;

    assert_eq!(result.status(), SegmentStatus::RenderFailed);
    assert!(result.output_path().is_none());
    assert!(result.detail().unwrap().contains("no output produced"));
    assert_eq!(mock.call_count(), 1);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn compositor_error_is_preserved_not_raised() {
    let (root, roots) = workspace("fail");
    touch_inputs(&roots, "a", true, true);
    let mock = Arc::new(MockCompositor::new(Behavior::Fail));

    let result = renderer(&mock, &roots).render(&descriptor(1, "Intro", "a")).await;

    assert_eq!(result.status(), SegmentStatus::RenderFailed);
    assert!(result.detail().unwrap().contains("bad input"));

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn rendering_twice_overwrites_the_same_file() {
    let (root, roots) = workspace("idempotent");
    touch_inputs(&roots, "a", true, true);
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput));
    let renderer = renderer(&mock, &roots);
    let d = descriptor(1, "Intro", "a");

    let first = renderer.render(&d).await;
    let second = renderer.render(&d).await;

    assert_eq!(first.status(), second.status());
    assert_eq!(first.output_path(), second.output_path());
    assert_eq!(first.output_size_bytes(), second.output_size_bytes());
    let entries = std::fs::read_dir(&roots.output_root).unwrap().count();
    assert_eq!(entries, 1);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn run_all_reports_success_then_missing_image() {
    let (root, roots) = workspace("two_segments");
    touch_inputs(&roots, "a", true, true);
    touch_inputs(&roots, "b", false, true);
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput));

    let summary = run_all(
        &renderer(&mock, &roots),
        &[descriptor(1, "Intro", "a"), descriptor(2, "Outro", "b")],
        ExecutionStrategy::Sequential,
    )
    .await;

    let statuses: Vec<_> = summary.results.iter().map(|r| r.status()).collect();
    assert_eq!(statuses, vec![SegmentStatus::Success, SegmentStatus::MissingInput]);
    assert_eq!(summary.output_files.len(), 1);
    assert_eq!(summary.output_files[0].name, "01_intro.mp4");
    assert_eq!(summary.status(), RunStatus::Partial);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn run_all_keeps_registry_order_under_bounded_concurrency() {
    let (root, roots) = workspace("bounded");
    for stem in ["a", "b", "c", "d", "e"] {
        touch_inputs(&roots, stem, true, true);
    }
    // Earlier registry entries take longer so completion order is reversed.
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput).with_delay(|output| {
        let name = output.file_name().unwrap().to_string_lossy().to_string();
        let ordinal: u64 = name[..2].parse().unwrap();
        Duration::from_millis(60 / ordinal)
    }));

    // Deliberately not ordinal-sorted.
    let descriptors = vec![
        descriptor(3, "Three", "c"),
        descriptor(1, "One", "a"),
        descriptor(5, "Five", "e"),
        descriptor(2, "Two", "b"),
        descriptor(4, "Four", "d"),
    ];

    let summary = run_all(
        &renderer(&mock, &roots),
        &descriptors,
        ExecutionStrategy::Bounded(2),
    )
    .await;

    let ordinals: Vec<u32> = summary.results.iter().map(|r| r.descriptor().ordinal).collect();
    assert_eq!(ordinals, vec![3, 1, 5, 2, 4]);
    assert!(summary.results.iter().all(|r| r.is_success()));
    assert!(mock.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(summary.output_files.len(), 5);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn sequential_run_never_overlaps_renders() {
    let (root, roots) = workspace("sequential");
    for stem in ["a", "b", "c"] {
        touch_inputs(&roots, stem, true, true);
    }
    let mock = Arc::new(
        MockCompositor::new(Behavior::WriteOutput).with_delay(|_| Duration::from_millis(5)),
    );

    let summary = run_all(
        &renderer(&mock, &roots),
        &[
            descriptor(1, "One", "a"),
            descriptor(2, "Two", "b"),
            descriptor(3, "Three", "c"),
        ],
        ExecutionStrategy::Sequential,
    )
    .await;

    assert_eq!(summary.succeeded(), 3);
    assert_eq!(mock.max_in_flight.load(Ordering::SeqCst), 1);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn every_descriptor_yields_a_result_even_when_all_fail() {
    let (root, roots) = workspace("all_fail");
    touch_inputs(&roots, "a", true, true);
    touch_inputs(&roots, "b", true, true);
    let mock = Arc::new(MockCompositor::new(Behavior::Fail));

    let descriptors = vec![
        descriptor(1, "One", "a"),
        descriptor(2, "Two", "b"),
        descriptor(3, "Three", "missing"),
    ];
    let summary = run_all(&renderer(&mock, &roots), &descriptors, ExecutionStrategy::Bounded(3)).await;

    assert_eq!(summary.results.len(), 3);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.missing(), 1);
    assert_eq!(summary.status(), RunStatus::Failed);
    assert!(summary.output_files.is_empty());

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn panicking_render_task_becomes_render_failed() {
    let (root, roots) = workspace("panic");
    for stem in ["a", "b", "c"] {
        touch_inputs(&roots, stem, true, true);
    }
    let mock = Arc::new(MockCompositor::new(Behavior::PanicFor("02_two.mp4")));

    let descriptors = vec![
        descriptor(1, "One", "a"),
        descriptor(2, "Two", "b"),
        descriptor(3, "Three", "c"),
    ];
    let summary = run_all(&renderer(&mock, &roots), &descriptors, ExecutionStrategy::Bounded(2)).await;

    let ordinals: Vec<u32> = summary.results.iter().map(|r| r.descriptor().ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);
    assert_eq!(summary.results[1].status(), SegmentStatus::RenderFailed);
    assert_eq!(summary.results[1].detail(), Some("render task did not complete"));
    assert!(summary.results[0].is_success());
    assert!(summary.results[2].is_success());
    assert_eq!(summary.status(), RunStatus::Partial);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn rescan_counts_clips_left_by_earlier_runs() {
    let (root, roots) = workspace("stale");
    std::fs::create_dir_all(&roots.output_root).unwrap();
    std::fs::write(roots.output_root.join("09_old_segment.mp4"), b"stale").unwrap();
    touch_inputs(&roots, "a", true, true);
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput));

    let summary = run_all(
        &renderer(&mock, &roots),
        &[descriptor(1, "Intro", "a")],
        ExecutionStrategy::Sequential,
    )
    .await;

    assert_eq!(summary.results.len(), 1);
    let names: Vec<_> = summary.output_files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["01_intro.mp4", "09_old_segment.mp4"]);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn captions_follow_probed_durations() {
    let (root, roots) = workspace("captions");
    touch_inputs(&roots, "a", true, true);
    touch_inputs(&roots, "b", true, true);
    let mock = Arc::new(MockCompositor::new(Behavior::WriteOutput));

    let summary = run_all(
        &renderer(&mock, &roots),
        &[
            descriptor(1, "Intro", "a").with_narration("Hello"),
            descriptor(2, "Outro", "b").with_narration("Goodbye"),
        ],
        ExecutionStrategy::Sequential,
    )
    .await;

    let cues = caption_cues(&summary.results);
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[1].start_secs, 4.0);
    assert_eq!(cues[1].end_secs, 8.0);

    std::fs::remove_dir_all(&root).ok();
}
