//! Write subtitles for the trim window.

use std::path::PathBuf;

use reelcut_common::config::AppConfig;
use reelcut_editor_core::subtitles::{build_cues, render_subtitles, SubtitleFormat};

pub fn run(path: PathBuf, output: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<()> {
    let (input, session) = super::open_session(&path, config)?;

    let output_path = output.unwrap_or_else(|| PathBuf::from(format!("{}.srt", input.clip_id)));
    let format = SubtitleFormat::from_path(&output_path);

    let cues = build_cues(session.captions(), session.trim()).len();
    let content = render_subtitles(session.captions(), session.trim(), format);
    std::fs::write(&output_path, content)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output_path.display()))?;

    println!("Wrote {cues} cue(s) to {}", output_path.display());
    Ok(())
}
