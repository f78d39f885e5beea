//! Caption tracks (WebVTT and SRT) for the assembled video.
//!
//! Cues are laid end to end in result order: each successful segment
//! occupies its probed clip length (or its target duration when probing was
//! unavailable). Segments without narration still advance the clock.

use std::path::Path;

use slidecast_common::error::SlidecastResult;
use slidecast_segment_model::segment::SegmentResult;

/// A single caption cue.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCue {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// Compute cues for the successful segments of a run.
pub fn caption_cues(results: &[SegmentResult]) -> Vec<CaptionCue> {
    let mut cues = vec![];
    let mut offset = 0.0;

    for result in results.iter().filter(|r| r.is_success()) {
        let d = result.descriptor();
        let length = result
            .duration_secs()
            .unwrap_or(d.target_duration_secs)
            .max(0.0);

        if let Some(text) = d.narration.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            cues.push(CaptionCue {
                start_secs: offset,
                end_secs: offset + length,
                text: text.to_string(),
            });
        }
        offset += length;
    }

    cues
}

/// Generate WebVTT caption content.
pub fn generate_vtt(cues: &[CaptionCue]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for cue in cues {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(cue.start_secs),
            format_vtt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Generate SRT caption content.
pub fn generate_srt(cues: &[CaptionCue]) -> String {
    let mut output = String::new();

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_secs),
            format_srt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Write captions for `results`; `.srt` selects SRT, anything else WebVTT.
pub fn write_captions(results: &[SegmentResult], path: &Path) -> SlidecastResult<usize> {
    let cues = caption_cues(results);
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("srt") => generate_srt(&cues),
        _ => generate_vtt(&cues),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), cues = cues.len(), "Wrote captions");
    Ok(cues.len())
}

/// HH:MM:SS.mmm
fn format_vtt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_time(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// HH:MM:SS,mmm
fn format_srt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_time(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

fn split_time(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}
