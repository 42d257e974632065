//! Check the media pipeline.

use reelcut_common::config::{config_file_path, AppConfig};
use reelcut_render_engine::FfmpegEngine;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Reelcut System Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[OK] Config: defaults ({} not found)", config_path.display());
    }

    let ready = match FfmpegEngine::load(&config.pipeline).await {
        Ok(engine) => {
            println!(
                "[OK] Transcoder: {} ({})",
                config.pipeline.ffmpeg_binary,
                engine.version()
            );
            println!("[OK] Scratch directory: {}", engine.root().display());
            engine.unload().await?;
            true
        }
        Err(e) => {
            println!("[FAIL] Transcoder: {e}");
            println!(
                "       Install ffmpeg or set pipeline.ffmpeg_binary in {}",
                config_path.display()
            );
            false
        }
    };

    println!(
        "[OK] Audio: {} Hz mono, {} kbps",
        config.pipeline.audio_sample_rate, config.pipeline.audio_bitrate_kbps
    );

    println!();
    if ready {
        println!("The media pipeline is ready.");
    } else {
        println!("The media pipeline is unavailable. See above for fixes.");
    }

    Ok(())
}
