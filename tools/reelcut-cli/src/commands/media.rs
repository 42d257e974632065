//! Single-job media commands: thumbnail and audio extraction.

use std::path::{Path, PathBuf};

use reelcut_common::config::AppConfig;
use reelcut_render_engine::{FfmpegEngine, MediaAsset, MediaPipeline, SourceMedia};

pub async fn thumbnail(
    media: PathBuf,
    at: String,
    output: PathBuf,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let timestamp = super::parse_time(&at)?;
    let bytes = read_media(&media).await?;
    let extension = super::extension_of(&media, "mp4");

    let pipeline = load_pipeline(config).await?;
    let result = pipeline
        .extract_thumbnail(SourceMedia::new(&bytes, extension), timestamp)
        .await;
    finish(pipeline, result.map_err(Into::into), &output).await
}

pub async fn audio(media: PathBuf, output: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    let bytes = read_media(&media).await?;
    let extension = super::extension_of(&media, "mp4");

    let pipeline = load_pipeline(config).await?;
    let result = pipeline
        .extract_audio(SourceMedia::new(&bytes, extension))
        .await;
    finish(pipeline, result.map_err(Into::into), &output).await
}

async fn read_media(media: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(media)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read media {}: {e}", media.display()))
}

async fn load_pipeline(config: &AppConfig) -> anyhow::Result<MediaPipeline<FfmpegEngine>> {
    MediaPipeline::load(config.pipeline.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load transcoding engine: {e}"))
}

async fn finish(
    pipeline: MediaPipeline<FfmpegEngine>,
    result: anyhow::Result<MediaAsset>,
    output: &Path,
) -> anyhow::Result<()> {
    if let Err(e) = pipeline.into_engine().unload().await {
        tracing::warn!(error = %e, "Failed to remove engine scratch directory");
    }
    let asset = result?;

    std::fs::write(output, &asset.bytes)?;
    println!(
        "Wrote {} ({} bytes, {}) to {}",
        asset.job,
        asset.bytes.len(),
        asset.mime_type,
        output.display()
    );
    if !asset.cleanup.is_clean() {
        println!(
            "  Warning: {} scratch file(s) could not be removed",
            asset.cleanup.failed.len()
        );
    }
    Ok(())
}
