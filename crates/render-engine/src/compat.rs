//! QuickTime compatibility scoring for rendered videos.
//!
//! A file is probed with ffprobe and scored against fixed checks; 80 of 100
//! points are needed to call it compatible.

use std::ffi::OsStr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use slidecast_common::error::{SlidecastError, SlidecastResult};

use crate::ffmpeg::FfmpegTool;

/// Minimum score for a file to count as compatible.
pub const COMPATIBLE_THRESHOLD: u32 = 80;

const H264_PROFILES: &[&str] = &["Baseline", "Constrained Baseline", "Main", "High"];

/// Subset of `ffprobe -show_streams -show_format -of json` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: Option<ProbeFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub profile: Option<String>,
    pub pix_fmt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    pub format_name: Option<String>,
    /// ffprobe reports numbers in this section as strings.
    pub duration: Option<String>,
    pub size: Option<String>,
}

impl ProbeReport {
    fn first_stream(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.format.as_ref()?.duration.as_deref()?.parse().ok()
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.format.as_ref()?.size.as_deref()?.parse().ok()
    }

    pub fn video_dimensions(&self) -> Option<(u32, u32)> {
        let video = self.first_stream("video")?;
        Some((video.width?, video.height?))
    }
}

/// One scored check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatCheck {
    pub name: &'static str,
    pub points: u32,
    pub passed: bool,
}

/// Result of scoring a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub score: u32,
    pub max: u32,
    pub compatible: bool,
    pub checks: Vec<CompatCheck>,
    pub issues: Vec<String>,
}

/// Score a probe against the QuickTime checks.
pub fn score_compatibility(probe: &ProbeReport) -> CompatibilityReport {
    let video = probe.first_stream("video");
    let audio = probe.first_stream("audio");
    let mut issues = vec![];

    let video_codec = video.and_then(|v| v.codec_name.as_deref());
    let codec_ok = video_codec == Some("h264");
    if !codec_ok {
        issues.push(format!(
            "video codec is {}, expected h264",
            video_codec.unwrap_or("missing")
        ));
    }

    let profile = video.and_then(|v| v.profile.as_deref());
    let profile_ok = codec_ok && profile.is_some_and(|p| H264_PROFILES.contains(&p));
    if codec_ok && !profile_ok {
        issues.push(format!(
            "H.264 profile {} is not Baseline/Main/High",
            profile.unwrap_or("unknown")
        ));
    }

    let pix_fmt = video.and_then(|v| v.pix_fmt.as_deref());
    let pix_fmt_ok = pix_fmt == Some("yuv420p");
    if video.is_some() && !pix_fmt_ok {
        issues.push(format!(
            "pixel format is {}, expected yuv420p",
            pix_fmt.unwrap_or("unknown")
        ));
    }

    let audio_codec = audio.and_then(|a| a.codec_name.as_deref());
    let audio_ok = audio.is_none() || audio_codec == Some("aac");
    if !audio_ok {
        issues.push(format!(
            "audio codec is {}, expected aac",
            audio_codec.unwrap_or("unknown")
        ));
    }

    let format_name = probe
        .format
        .as_ref()
        .and_then(|f| f.format_name.as_deref())
        .unwrap_or("");
    let container_ok = format_name.split(',').any(|n| n == "mp4" || n == "mov");
    if !container_ok {
        issues.push(format!("container {format_name:?} is not mp4/mov"));
    }

    let checks = vec![
        CompatCheck {
            name: "video_codec_h264",
            points: 30,
            passed: codec_ok,
        },
        CompatCheck {
            name: "h264_profile",
            points: 20,
            passed: profile_ok,
        },
        CompatCheck {
            name: "pixel_format_yuv420p",
            points: 20,
            passed: pix_fmt_ok,
        },
        CompatCheck {
            name: "audio_codec_aac",
            points: 20,
            passed: audio_ok,
        },
        CompatCheck {
            name: "container_mp4",
            points: 10,
            passed: container_ok,
        },
    ];

    let max: u32 = checks.iter().map(|c| c.points).sum();
    let score: u32 = checks.iter().filter(|c| c.passed).map(|c| c.points).sum();

    CompatibilityReport {
        score,
        max,
        compatible: score >= COMPATIBLE_THRESHOLD,
        checks,
        issues,
    }
}

/// Run ffprobe on `path` and parse its JSON output.
pub async fn probe_file(tool: &FfmpegTool, path: &Path) -> SlidecastResult<ProbeReport> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(SlidecastError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let raw = tool
        .run_ffprobe([
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-show_streams"),
            OsStr::new("-show_format"),
            OsStr::new("-of"),
            OsStr::new("json"),
            path.as_os_str(),
        ])
        .await?;
    Ok(serde_json::from_str(&raw)?)
}
