//! Print the caption timeline and the composed frame at a point in time.

use std::path::PathBuf;

use reelcut_common::config::AppConfig;
use reelcut_common::timecode::seconds_to_timecode;
use reelcut_editor_core::presentation::{playhead_percent, visible_rows, TimelineViewport};
use reelcut_editor_core::reframe::{ReframeConfig, Reframer};
use reelcut_render_engine::compositor::{
    compose_frame, compute_compositions, OutputSize, OverlayPlan,
};

pub fn run(
    path: PathBuf,
    at: Option<String>,
    height: f64,
    plan: Option<PathBuf>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let (input, mut session) = super::open_session(&path, config)?;
    if let Some(at) = at {
        session.set_playhead(super::parse_time(&at)?);
    }
    let playhead = session.playhead();
    let trim = *session.trim();

    println!(
        "Playhead: {} ({:.1}%)",
        seconds_to_timecode(playhead),
        playhead_percent(playhead, &trim)
    );
    println!();

    let count = session.captions().len();
    let mut viewport = TimelineViewport::from_config(&config.editor, height);
    if let Some(index) = session
        .captions()
        .iter()
        .position(|c| c.end_time > playhead)
    {
        viewport.scroll_to(index, count);
    }

    println!("Timeline ({count} captions):");
    for row in visible_rows(session.captions(), &trim, &viewport, session.selection()) {
        let marker = if row.caption.is_active_at(playhead) {
            '>'
        } else if row.is_visible {
            ' '
        } else {
            '-'
        };
        println!(
            " {marker} {:>7} {} [{:6.1}% +{:5.1}%] {}",
            row.id.to_string(),
            seconds_to_timecode(row.caption.start_time),
            row.bar.left_percent,
            row.bar.width_percent,
            row.caption.text
        );
    }
    println!();

    let reframer = Reframer::new(input.reframing_hints(), ReframeConfig::default());
    let output = OutputSize::default();
    let frame_index = ((playhead - trim.start_time) * config.editor.preview_fps as f64) as u64;
    let frame = compose_frame(
        session.captions(),
        &reframer,
        &trim,
        output,
        frame_index,
        playhead,
    );

    println!("Frame {}:", frame.frame_index);
    println!(
        "  Crop: x={:.3} y={:.3} w={:.3} h={:.3}",
        frame.crop.x, frame.crop.y, frame.crop.w, frame.crop.h
    );
    for overlay in &frame.captions {
        println!(
            "  {} \"{}\" at ({:.0}, {:.0}) opacity {:.2} scale {:.2}{}",
            overlay.caption_id,
            overlay.text,
            overlay.x,
            overlay.y,
            overlay.opacity,
            overlay.scale,
            overlay
                .active_word
                .map(|w| format!(" word {w}"))
                .unwrap_or_default()
        );
    }

    if let Some(plan_path) = plan {
        let fps = config.editor.preview_fps;
        let plan = OverlayPlan {
            clip_id: session.clip_id().to_string(),
            fps,
            output,
            frames: compute_compositions(session.captions(), &reframer, &trim, output, fps),
        };
        std::fs::write(&plan_path, serde_json::to_string_pretty(&plan)?)?;
        println!();
        println!(
            "Wrote overlay plan ({} frames) to {}",
            plan.frames.len(),
            plan_path.display()
        );
    }

    Ok(())
}
