//! Subcommand implementations.

pub mod check;
pub mod export;
pub mod inspect;
pub mod media;
pub mod preview;
pub mod subtitles;

use std::path::Path;

use reelcut_clip_model::{CaptionStyle, NormalizedPoint, ReelClipInput};
use reelcut_common::config::AppConfig;
use reelcut_editor_core::session::ReelSession;

/// Load a clip input and open a session anchored at the configured caption position.
pub fn open_session(path: &Path, config: &AppConfig) -> anyhow::Result<(ReelClipInput, ReelSession)> {
    let input = ReelClipInput::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load clip input: {e}"))?;

    let (x, y) = config.editor.caption_anchor;
    let session = ReelSession::from_input_with_style(
        &input,
        CaptionStyle::default(),
        NormalizedPoint::new(x, y),
    )
    .map_err(|e| anyhow::anyhow!("Invalid clip input: {e}"))?;

    Ok((input, session))
}

/// Parse seconds or a `HH:MM:SS.mmm` timecode.
pub fn parse_time(value: &str) -> anyhow::Result<f64> {
    reelcut_common::timecode::timecode_to_seconds(value)
        .map_err(|e| anyhow::anyhow!("Invalid time '{value}': {e}"))
}

/// File extension, or `fallback` when there is none.
pub fn extension_of<'a>(path: &'a Path, fallback: &'a str) -> &'a str {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or(fallback)
}
