//! Segment descriptors and per-segment render results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extension of rendered clips.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// One slide + narration pair to be rendered into a clip.
///
/// Descriptors are built once (compiled in or loaded from a manifest) and
/// never mutated during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    /// Position number; sets the zero-padded filename prefix.
    pub ordinal: u32,

    /// Human-readable label, sanitized into the output filename.
    pub title: String,

    /// Slide still. Relative paths resolve against the input root.
    #[serde(alias = "image")]
    pub image_path: PathBuf,

    /// Narration track. Relative paths resolve against the audio root.
    #[serde(alias = "audio")]
    pub audio_path: PathBuf,

    /// Upper bound on clip length; the clip also stops when the audio ends.
    #[serde(alias = "duration")]
    pub target_duration_secs: f64,

    /// Caption text for this segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
}

impl SegmentDescriptor {
    pub fn new(
        ordinal: u32,
        title: impl Into<String>,
        image_path: impl Into<PathBuf>,
        audio_path: impl Into<PathBuf>,
        target_duration_secs: f64,
    ) -> Self {
        Self {
            ordinal,
            title: title.into(),
            image_path: image_path.into(),
            audio_path: audio_path.into(),
            target_duration_secs,
            narration: None,
        }
    }

    /// Attach caption text.
    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }

    /// Output filename for this segment.
    pub fn output_file_name(&self) -> String {
        output_file_name(self.ordinal, &self.title)
    }
}

/// Outcome category of rendering one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    /// Clip rendered and present on disk.
    Success,
    /// A required input file was absent; nothing was rendered.
    MissingInput,
    /// The compositor failed or produced no output file.
    RenderFailed,
}

impl SegmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentStatus::Success => "success",
            SegmentStatus::MissingInput => "missing_input",
            SegmentStatus::RenderFailed => "render_failed",
        }
    }
}

/// Result of rendering one descriptor. Created exactly once per descriptor
/// per run.
///
/// `output_path` and `output_size_bytes` are set iff the status is
/// [`SegmentStatus::Success`]; the constructors are the only way to build a
/// result, which keeps that invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentResult {
    descriptor: SegmentDescriptor,
    status: SegmentStatus,
    output_path: Option<PathBuf>,
    output_size_bytes: Option<u64>,
    duration_secs: Option<f64>,
    detail: Option<String>,
}

impl SegmentResult {
    /// A rendered clip of `size_bytes` at `output_path`.
    pub fn success(
        descriptor: SegmentDescriptor,
        output_path: PathBuf,
        size_bytes: u64,
        duration_secs: Option<f64>,
    ) -> Self {
        Self {
            descriptor,
            status: SegmentStatus::Success,
            output_path: Some(output_path),
            output_size_bytes: Some(size_bytes),
            duration_secs,
            detail: None,
        }
    }

    /// A required input at `missing` was absent.
    pub fn missing_input(descriptor: SegmentDescriptor, missing: &Path) -> Self {
        Self {
            descriptor,
            status: SegmentStatus::MissingInput,
            output_path: None,
            output_size_bytes: None,
            duration_secs: None,
            detail: Some(format!("missing input: {}", missing.display())),
        }
    }

    /// The render did not produce a clip.
    pub fn render_failed(descriptor: SegmentDescriptor, reason: impl Into<String>) -> Self {
        Self {
            descriptor,
            status: SegmentStatus::RenderFailed,
            output_path: None,
            output_size_bytes: None,
            duration_secs: None,
            detail: Some(reason.into()),
        }
    }

    pub fn descriptor(&self) -> &SegmentDescriptor {
        &self.descriptor
    }

    pub fn status(&self) -> SegmentStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == SegmentStatus::Success
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn output_size_bytes(&self) -> Option<u64> {
        self.output_size_bytes
    }

    /// Probed clip length, when the compositor can probe.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Missing path or compositor error text for failed segments.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// Lower-case `title` and collapse every run of non-alphanumeric characters
/// into a single `_`, trimming underscores at both ends.
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_sep = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        "segment".to_string()
    } else {
        out
    }
}

/// `{ordinal:02}_{sanitized_title}.mp4`
pub fn output_file_name(ordinal: u32, title: &str) -> String {
    format!("{ordinal:02}_{}.{OUTPUT_EXTENSION}", sanitize_title(title))
}

/// Whether `name` has the shape of a file produced by [`output_file_name`].
pub fn is_segment_clip_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(OUTPUT_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
    else {
        return false;
    };
    let Some((ordinal, title)) = stem.split_once('_') else {
        return false;
    };
    ordinal.len() >= 2
        && ordinal.chars().all(|c| c.is_ascii_digit())
        && !title.is_empty()
        && title
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
