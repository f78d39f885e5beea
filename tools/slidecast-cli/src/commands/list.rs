//! Show the segment registry.

use std::path::PathBuf;

use slidecast_common::config::AppConfig;

pub fn run(config: &AppConfig, manifest: Option<PathBuf>) -> anyhow::Result<()> {
    let registry = super::load_registry(manifest)?;

    println!("Segments: {}", registry.len());
    println!("  Slides: {}", config.input_root.display());
    println!("  Audio:  {}", config.audio_root.display());
    println!("  Output: {}", config.output_root.display());
    println!();

    let mut total_secs = 0.0;
    for d in registry.descriptors() {
        let audio = config.audio_root.join(&d.audio_path);
        let image = config.input_root.join(&d.image_path);
        let inputs = match (audio.exists(), image.exists()) {
            (true, true) => "inputs ok",
            (false, _) => "audio missing",
            (true, false) => "image missing",
        };
        println!(
            "  {:02} {:<28} {:>6.1}s  -> {}  [{}]",
            d.ordinal,
            d.title,
            d.target_duration_secs,
            d.output_file_name(),
            inputs
        );
        total_secs += d.target_duration_secs;
    }
    println!();
    println!("Maximum runtime: {total_secs:.1}s");

    let issues = registry.ordinal_issues();
    if !issues.is_empty() {
        println!("\nOrdinal issues (segments still render in listed order):");
        for issue in &issues {
            println!("  - {issue}");
        }
    }

    Ok(())
}
