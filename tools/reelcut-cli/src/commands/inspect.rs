//! Show clip input and caption summary.

use std::path::PathBuf;

use reelcut_common::config::AppConfig;
use reelcut_common::timecode::{format_duration, seconds_to_timecode};

pub fn run(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    let (input, session) = super::open_session(&path, config)?;
    let trim = session.trim();

    println!("Clip: {}", input.clip_id);
    println!("  Source: {}", input.video_source_url);
    println!(
        "  Source duration: {}",
        format_duration(input.source_video_duration)
    );
    if let Some(meta) = &input.metadata {
        if let Some(title) = &meta.title {
            println!("  Title: {title}");
        }
        if let Some(user) = &meta.user_id {
            println!("  User: {user}");
        }
        if !meta.extra.is_empty() {
            let keys: Vec<&str> = meta.extra.keys().map(String::as_str).collect();
            println!("  Extra metadata: {}", keys.join(", "));
        }
    }
    println!();

    println!("Trim:");
    println!(
        "  {} -> {} ({})",
        seconds_to_timecode(trim.start_time),
        seconds_to_timecode(trim.end_time),
        format_duration(trim.duration())
    );
    println!();

    let language = input
        .transcription
        .as_ref()
        .and_then(|t| t.language.as_deref())
        .unwrap_or("unknown");
    let karaoke = session
        .captions()
        .iter()
        .filter(|c| c.style.is_karaoke())
        .count();
    println!("Captions:");
    println!("  Segments: {} ({language})", input.segments().len());
    println!("  Captions: {}", session.captions().len());
    println!("  Visible in trim: {}", session.visible_captions().count());
    println!("  Karaoke: {karaoke}");
    println!();

    println!("Reframing:");
    println!("  Hints: {}", input.reframing_hints().len());

    Ok(())
}
