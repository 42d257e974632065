//! Caption and caption style types.
//!
//! Caption times are seconds relative to the full source video, not to the
//! trim window.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::NormalizedPoint;
use crate::input::WordTiming;
use crate::trim::TrimWindow;

/// Shortest interval any caption may span, in seconds.
pub const MIN_DURATION: f64 = 0.1;

/// Session-scoped caption identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionId(pub u64);

impl fmt::Display for CaptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cap-{}", self.0)
    }
}

/// A contiguous unit of on-screen text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub id: CaptionId,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Anchor of the caption block in the output frame.
    #[serde(default)]
    pub position: NormalizedPoint,
    #[serde(default)]
    pub style: CaptionStyle,
    /// Derived: whether the caption intersects the trim window.
    #[serde(default)]
    pub is_visible: bool,
}

impl Caption {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether the caption is on screen at `t` (`start ≤ t < end`).
    pub fn is_active_at(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time
    }

    /// Whitespace-delimited tokens of the caption text.
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    /// Recompute `is_visible` with the overlap test.
    pub fn refresh_visibility(&mut self, trim: &TrimWindow) {
        self.is_visible = trim.overlaps(self.start_time, self.end_time);
    }
}

/// Visual style of a caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionStyle {
    pub font_family: String,
    /// Font size in reference pixels (1080-wide output).
    pub font_size: f64,
    pub font_weight: u16,
    /// Text color as hex string (for example `#ffffff`).
    pub color: String,
    pub stroke_color: String,
    /// Stroke width in reference pixels; 0 disables the outline.
    pub stroke_width: f64,
    pub background_color: Option<String>,
    /// Color of the currently spoken word in karaoke mode.
    pub highlight_color: String,
    pub animation: AnimationDescriptor,
    /// Per-word timestamps; present enables karaoke highlighting.
    pub words: Option<Vec<WordTiming>>,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 64.0,
            font_weight: 800,
            color: "#ffffff".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 4.0,
            background_color: None,
            highlight_color: "#ffd400".to_string(),
            animation: AnimationDescriptor::default(),
            words: None,
        }
    }
}

impl CaptionStyle {
    /// Whether per-word highlighting is available.
    pub fn is_karaoke(&self) -> bool {
        self.words.as_ref().is_some_and(|w| !w.is_empty())
    }

    /// Copy of this style without per-word timing, for applying to other captions.
    pub fn without_words(&self) -> Self {
        Self {
            words: None,
            ..self.clone()
        }
    }
}

/// Entry animation of a caption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationDescriptor {
    pub kind: AnimationKind,
    /// Animation length in seconds.
    pub duration: f64,
    /// Delay after caption start before the animation begins, in seconds.
    pub delay: f64,
    pub easing: Easing,
}

impl Default for AnimationDescriptor {
    fn default() -> Self {
        Self {
            kind: AnimationKind::Fade,
            duration: 0.3,
            delay: 0.0,
            easing: Easing::EaseOut,
        }
    }
}

impl AnimationDescriptor {
    /// A descriptor that renders the caption fully from its first frame.
    pub fn none() -> Self {
        Self {
            kind: AnimationKind::None,
            duration: 0.0,
            delay: 0.0,
            easing: Easing::Linear,
        }
    }
}

/// Animation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    None,
    #[default]
    Fade,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    Scale,
    Typewriter,
}

/// Easing curve applied to animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption(start: f64, end: f64) -> Caption {
        Caption {
            id: CaptionId(1),
            text: "hello  reel world".to_string(),
            start_time: start,
            end_time: end,
            position: NormalizedPoint::default(),
            style: CaptionStyle::default(),
            is_visible: false,
        }
    }

    #[test]
    fn test_tokens_split_on_any_whitespace() {
        assert_eq!(caption(0.0, 1.0).tokens(), vec!["hello", "reel", "world"]);
    }

    #[test]
    fn test_visibility_uses_overlap() {
        let trim = TrimWindow::new(10.0, 40.0, 60.0).unwrap();
        let mut partial = caption(5.0, 12.0);
        partial.refresh_visibility(&trim);
        assert!(partial.is_visible);

        let mut outside = caption(41.0, 50.0);
        outside.refresh_visibility(&trim);
        assert!(!outside.is_visible);
    }

    #[test]
    fn test_active_interval_is_half_open() {
        let c = caption(1.0, 2.0);
        assert!(c.is_active_at(1.0));
        assert!(c.is_active_at(1.999));
        assert!(!c.is_active_at(2.0));
    }

    #[test]
    fn test_style_json_uses_camel_case() {
        let json = serde_json::to_value(CaptionStyle::default()).unwrap();
        assert!(json.get("fontFamily").is_some());
        assert_eq!(json["animation"]["kind"], "fade");
        assert_eq!(json["animation"]["easing"], "easeOut");
    }

    #[test]
    fn test_partial_style_json_fills_defaults() {
        let style: CaptionStyle =
            serde_json::from_str(r##"{"color":"#ff0000","animation":{"kind":"slideUp"}}"##)
                .unwrap();
        assert_eq!(style.color, "#ff0000");
        assert_eq!(style.animation.kind, AnimationKind::SlideUp);
        assert!((style.animation.duration - 0.3).abs() < 1e-9);
        assert_eq!(style.font_family, "Inter");
    }

    #[test]
    fn test_caption_id_display() {
        assert_eq!(CaptionId(7).to_string(), "cap-7");
    }
}
