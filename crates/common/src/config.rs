//! Application configuration.
//!
//! Every directory and encoder setting the pipeline needs is carried in
//! [`AppConfig`] and passed explicitly to the renderer; nothing is read from
//! process-global state once the config is built.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SlidecastError, SlidecastResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root that relative slide image paths resolve against.
    pub input_root: PathBuf,

    /// Root that relative narration audio paths resolve against.
    pub audio_root: PathBuf,

    /// Directory rendered clips and reports are written to.
    pub output_root: PathBuf,

    /// Maximum number of renders in flight. `1` renders strictly in sequence.
    pub concurrency: usize,

    /// Encoder settings for the compositing step.
    pub render: RenderSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Encoder parameters handed to ffmpeg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Frame rate of the looped still image.
    pub fps: u32,

    /// x264 constant rate factor (lower = higher quality).
    pub crf: u8,

    /// x264 preset name.
    pub preset: String,

    /// AAC bitrate in kbps.
    pub audio_bitrate_kbps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "slidecast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("assets/slides"),
            audio_root: PathBuf::from("assets/audio"),
            output_root: PathBuf::from("output/segments"),
            concurrency: 1,
            render: RenderSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            crf: 23,
            preset: "medium".to_string(),
            audio_bitrate_kbps: 192,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit file. Unlike [`AppConfig::load`], errors
    /// are returned rather than swallowed.
    pub fn load_from(path: &Path) -> SlidecastResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SlidecastError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SlidecastError::config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject settings ffmpeg would choke on.
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.concurrency == 0 {
            return Err(SlidecastError::config("concurrency must be at least 1"));
        }
        if self.render.fps == 0 {
            return Err(SlidecastError::config("render.fps must be positive"));
        }
        if self.render.crf > 51 {
            return Err(SlidecastError::config(format!(
                "render.crf must be in 0..=51, got {}",
                self.render.crf
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("slidecast").join("config.json")
}
