//! Frame compositor: combines the vertical crop with animated captions.
//!
//! Defines the per-frame drawing instructions shared by the preview and the
//! burned-in export path. Caption styles are authored against a 1080 px wide
//! output and scaled to the actual output width here.

use reelcut_clip_model::{Caption, CaptionId, CropRect, TrimWindow};
use reelcut_editor_core::animation::{self, frame_time, visible_text};
use reelcut_editor_core::reframe::Reframer;
use serde::Serialize;

/// Output width caption sizes are authored against.
pub const REFERENCE_WIDTH: f64 = 1080.0;

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl Default for OutputSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl OutputSize {
    fn scale(&self) -> f64 {
        self.width as f64 / REFERENCE_WIDTH
    }
}

/// A single frame's composition instructions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameComposition {
    /// Frame number within the clip.
    pub frame_index: u64,

    /// Time in seconds since the clip start.
    pub time_secs: f64,

    /// Time in the source video.
    pub source_time_secs: f64,

    /// The crop to take from the source video.
    pub crop: CropRect,

    /// Captions on screen, in timeline order.
    pub captions: Vec<CaptionOverlay>,
}

/// Caption rendering instruction for a single frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionOverlay {
    pub caption_id: CaptionId,
    /// Text to draw; shorter than the caption text while a typewriter runs.
    pub text: String,
    /// Anchor in output pixels, animation offset applied.
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub stroke_width: f64,
    pub opacity: f64,
    pub scale: f64,
    pub color: String,
    pub stroke_color: String,
    pub background_color: Option<String>,
    /// Karaoke word being spoken, with its highlight color.
    pub active_word: Option<usize>,
    pub highlight_color: String,
}

/// Compose the frame at `source_time`.
pub fn compose_frame(
    captions: &[Caption],
    reframer: &Reframer,
    trim: &TrimWindow,
    output: OutputSize,
    frame_index: u64,
    source_time: f64,
) -> FrameComposition {
    let scale = output.scale();
    let overlays = captions
        .iter()
        .filter(|c| c.is_visible && c.is_active_at(source_time))
        .map(|caption| {
            let frame = animation::evaluate(caption, source_time);
            let text = match frame.visible_chars {
                Some(count) => visible_text(&caption.text, count).to_string(),
                None => caption.text.clone(),
            };
            let style = &caption.style;
            CaptionOverlay {
                caption_id: caption.id,
                text,
                x: caption.position.x * output.width as f64 + frame.transform.translate_x * scale,
                y: caption.position.y * output.height as f64 + frame.transform.translate_y * scale,
                font_size: style.font_size * scale * frame.transform.scale,
                stroke_width: style.stroke_width * scale * frame.transform.scale,
                opacity: frame.transform.opacity,
                scale: frame.transform.scale,
                color: style.color.clone(),
                stroke_color: style.stroke_color.clone(),
                background_color: style.background_color.clone(),
                active_word: frame.active_word,
                highlight_color: style.highlight_color.clone(),
            }
        })
        .collect();

    FrameComposition {
        frame_index,
        time_secs: trim.to_clip_time(source_time),
        source_time_secs: source_time,
        crop: reframer.crop_at(source_time),
        captions: overlays,
    }
}

/// Compute the composition for each frame of the trimmed clip.
pub fn compute_compositions(
    captions: &[Caption],
    reframer: &Reframer,
    trim: &TrimWindow,
    output: OutputSize,
    fps: u32,
) -> Vec<FrameComposition> {
    if fps == 0 {
        return vec![];
    }
    let total_frames = (trim.duration() * fps as f64).ceil() as u64;
    (0..total_frames)
        .map(|frame| {
            let source_time = trim.start_time + frame_time(frame, fps);
            compose_frame(captions, reframer, trim, output, frame, source_time)
        })
        .collect()
}

/// Overlay plan written next to an export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPlan {
    pub clip_id: String,
    pub fps: u32,
    pub output: OutputSize,
    pub frames: Vec<FrameComposition>,
}
