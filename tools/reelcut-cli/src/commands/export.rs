//! Cut the trim window out of the source media and write sidecars.

use std::io::Write;
use std::path::PathBuf;

use reelcut_common::config::AppConfig;
use reelcut_editor_core::reframe::{ReframeConfig, Reframer};
use reelcut_editor_core::subtitles::{render_subtitles, SubtitleFormat};
use reelcut_render_engine::collab::{CreditGate, FixedCreditGate};
use reelcut_render_engine::compositor::{compute_compositions, OutputSize, OverlayPlan};
use reelcut_render_engine::{
    export_reel, ExportOptions, ExportProgress, MediaPipeline, ProgressCallback, SourceMedia,
};

pub async fn run(
    path: PathBuf,
    media: PathBuf,
    output_dir: PathBuf,
    url_base: Option<String>,
    credits: Option<f64>,
    fps: Option<u32>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let (input, session) = super::open_session(&path, config)?;
    println!("Exporting {} from {}", input.clip_id, media.display());

    let bytes = tokio::fs::read(&media)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read media {}: {e}", media.display()))?;
    let extension = super::extension_of(&media, "mp4");

    let pipeline = MediaPipeline::load(config.pipeline.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load transcoding engine: {e}"))?;

    let gate = credits.map(|remaining_secs| FixedCreditGate { remaining_secs });
    let options = ExportOptions {
        video_url_base: url_base,
        user_id: input.user_id().map(str::to_string).or_else(|| {
            gate.as_ref().map(|_| "local".to_string())
        }),
    };

    let progress_cb: ProgressCallback = Box::new(|p: ExportProgress| {
        print!("\r  Progress: {:>5.1}% ({:?})  ", p.progress * 100.0, p.stage);
        std::io::stdout().flush().ok();
    });

    let result = export_reel(
        &session,
        SourceMedia::new(&bytes, extension),
        &pipeline,
        gate.as_ref().map(|g| g as &dyn CreditGate),
        &options,
        Some(progress_cb),
    )
    .await;
    println!();

    if let Err(e) = pipeline.into_engine().unload().await {
        tracing::warn!(error = %e, "Failed to remove engine scratch directory");
    }
    let result = result.map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;

    std::fs::create_dir_all(&output_dir)?;
    let media_path = output_dir.join(&result.media.file_name);
    std::fs::write(&media_path, &result.media.bytes)?;

    let stem = media_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("reel")
        .to_string();

    let srt_path = output_dir.join(format!("{stem}.{}", SubtitleFormat::Srt.extension()));
    std::fs::write(
        &srt_path,
        render_subtitles(session.captions(), session.trim(), SubtitleFormat::Srt),
    )?;

    let fps = fps.unwrap_or(config.editor.preview_fps);
    let reframer = Reframer::new(input.reframing_hints(), ReframeConfig::default());
    let output = OutputSize::default();
    let plan = OverlayPlan {
        clip_id: result.clip_id.clone(),
        fps,
        output,
        frames: compute_compositions(session.captions(), &reframer, session.trim(), output, fps),
    };
    let plan_path = output_dir.join(format!("{stem}.overlay.json"));
    std::fs::write(&plan_path, serde_json::to_string_pretty(&plan)?)?;

    let result_path = output_dir.join(format!("{stem}.export.json"));
    std::fs::write(&result_path, serde_json::to_string_pretty(&result)?)?;

    println!("Export complete: {}", result.summary());
    println!("  Media: {}", media_path.display());
    println!("  URL: {}", result.video_url);
    println!("  Subtitles: {}", srt_path.display());
    println!("  Overlay plan: {}", plan_path.display());
    println!("  Result: {}", result_path.display());

    Ok(())
}
