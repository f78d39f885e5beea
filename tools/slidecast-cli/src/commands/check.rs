//! Check system capabilities.

use slidecast_render_engine::ffmpeg::FfmpegTool;

pub fn run() -> anyhow::Result<()> {
    println!("Slidecast System Check");
    println!("{}", "=".repeat(50));

    let tool = FfmpegTool::default();
    let ffmpeg = tool.ffmpeg_available();
    let ffprobe = tool.ffprobe_available();

    if ffmpeg {
        println!("[OK] ffmpeg found");
    } else {
        println!("[FAIL] ffmpeg not found in PATH (required for render/finalize)");
    }
    if ffprobe {
        println!("[OK] ffprobe found");
    } else {
        println!("[WARN] ffprobe not found in PATH (clip durations and validate unavailable)");
    }

    println!();
    if ffmpeg {
        println!("All required capabilities are available. Slidecast is ready.");
    } else {
        println!("Some required capabilities are missing. Install ffmpeg and retry.");
    }

    Ok(())
}
