//! Slidecast CLI: render narrated slide segments into demo video clips.
//!
//! Usage:
//!   slidecast render [OPTIONS]     Render every segment of the registry
//!   slidecast list                 Show the segment registry
//!   slidecast finalize [OPTIONS]   Concatenate rendered clips
//!   slidecast validate <FILE>      Score a video's QuickTime compatibility
//!   slidecast check                Check for ffmpeg/ffprobe
//!   slidecast config               Show (or save) the resolved configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use slidecast_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "slidecast",
    about = "Assemble narrated slide segments into demo videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/slidecast/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every segment into its own clip
    Render {
        /// Segment manifest (JSON); the built-in registry is used otherwise
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Directory slide images are resolved against
        #[arg(long)]
        input_root: Option<PathBuf>,

        /// Directory narration audio is resolved against
        #[arg(long)]
        audio_root: Option<PathBuf>,

        /// Directory clips are written to
        #[arg(short, long)]
        output_root: Option<PathBuf>,

        /// Maximum renders in flight (1 = sequential)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write captions (.vtt or .srt) for the rendered segments
        #[arg(long)]
        captions: Option<PathBuf>,

        /// Concatenate the rendered clips into this file
        #[arg(long)]
        finalize: Option<PathBuf>,

        /// Exit with an error if any segment did not render
        #[arg(long)]
        strict: bool,
    },

    /// Show the segment registry and ordinal diagnostics
    List {
        /// Segment manifest (JSON); the built-in registry is used otherwise
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Concatenate the clips already in the output directory
    Finalize {
        /// Directory holding the rendered clips
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// Final video path
        #[arg(short, long, default_value = "output/final.mp4")]
        output: PathBuf,
    },

    /// Score a video's QuickTime compatibility
    Validate {
        /// Video file to probe
        path: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check system capabilities
    Check,

    /// Show the resolved configuration
    Config {
        /// Save it to the standard config location
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    slidecast_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Render {
            manifest,
            input_root,
            audio_root,
            output_root,
            jobs,
            report,
            captions,
            finalize,
            strict,
        } => {
            if let Some(dir) = input_root {
                config.input_root = dir;
            }
            if let Some(dir) = audio_root {
                config.audio_root = dir;
            }
            if let Some(dir) = output_root {
                config.output_root = dir;
            }
            if let Some(jobs) = jobs {
                config.concurrency = jobs;
            }
            commands::render::run(
                config,
                commands::render::RenderOptions {
                    manifest,
                    report,
                    captions,
                    finalize,
                    strict,
                },
            )
            .await
        }
        Commands::List { manifest } => commands::list::run(&config, manifest),
        Commands::Finalize {
            output_root,
            output,
        } => {
            if let Some(dir) = output_root {
                config.output_root = dir;
            }
            commands::finalize::run(&config, output).await
        }
        Commands::Validate { path, json } => commands::validate::run(path, json).await,
        Commands::Check => commands::check::run(),
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
