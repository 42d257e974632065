//! Caption animation timing.
//!
//! Everything here is a pure function of a caption and a time in source
//! seconds, so the preview and the burned-in export sample the same values.

use reelcut_clip_model::{AnimationDescriptor, AnimationKind, Caption, Easing};
use serde::Serialize;

/// Distance a sliding caption travels, in reference pixels.
pub const SLIDE_DISTANCE: f64 = 48.0;

/// Visual transform applied to a caption block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTransform {
    pub opacity: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl CaptionTransform {
    pub const IDENTITY: CaptionTransform = CaptionTransform {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };
}

impl Default for CaptionTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Everything a renderer needs to draw one caption at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionFrame {
    pub progress: f64,
    pub transform: CaptionTransform,
    /// Characters revealed so far; `None` unless the animation is a typewriter.
    pub visible_chars: Option<usize>,
    /// Index into the karaoke words of the word being spoken.
    pub active_word: Option<usize>,
}

/// Apply an easing curve to `p ∈ [0, 1]`.
pub fn ease(easing: Easing, p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    match easing {
        Easing::Linear => p,
        Easing::EaseIn => p * p,
        Easing::EaseOut => p * (2.0 - p),
        Easing::EaseInOut => {
            if p < 0.5 {
                2.0 * p * p
            } else {
                -1.0 + (4.0 - 2.0 * p) * p
            }
        }
    }
}

/// Animation progress of `caption` at time `t`, in `[0, 1]`.
pub fn progress(caption: &Caption, t: f64) -> f64 {
    descriptor_progress(&caption.style.animation, caption.start_time, t)
}

/// Progress of an animation that starts with a caption at `start_time`.
pub fn descriptor_progress(animation: &AnimationDescriptor, start_time: f64, t: f64) -> f64 {
    if animation.kind == AnimationKind::None {
        return 1.0;
    }
    if t.is_nan() {
        return 0.0;
    }

    let elapsed = t - start_time;
    if elapsed < animation.delay {
        return 0.0;
    }
    let anim_elapsed = elapsed - animation.delay;
    if anim_elapsed >= animation.duration {
        return 1.0;
    }

    ease(animation.easing, anim_elapsed / animation.duration).clamp(0.0, 1.0)
}

/// Transform for an animation kind at progress `p`.
pub fn transform(kind: AnimationKind, p: f64) -> CaptionTransform {
    let p = p.clamp(0.0, 1.0);
    let remaining = SLIDE_DISTANCE * (1.0 - p);
    match kind {
        AnimationKind::None | AnimationKind::Typewriter => CaptionTransform::IDENTITY,
        AnimationKind::Fade => CaptionTransform {
            opacity: p,
            ..CaptionTransform::IDENTITY
        },
        // Slide-up enters from below, so it starts with a positive y offset.
        AnimationKind::SlideUp => CaptionTransform {
            opacity: p,
            translate_y: remaining,
            ..CaptionTransform::IDENTITY
        },
        AnimationKind::SlideDown => CaptionTransform {
            opacity: p,
            translate_y: -remaining,
            ..CaptionTransform::IDENTITY
        },
        AnimationKind::SlideLeft => CaptionTransform {
            opacity: p,
            translate_x: remaining,
            ..CaptionTransform::IDENTITY
        },
        AnimationKind::SlideRight => CaptionTransform {
            opacity: p,
            translate_x: -remaining,
            ..CaptionTransform::IDENTITY
        },
        AnimationKind::Scale => CaptionTransform {
            opacity: p,
            scale: 0.5 + 0.5 * p,
            ..CaptionTransform::IDENTITY
        },
    }
}

/// Number of characters a typewriter animation shows at progress `p`.
pub fn visible_char_count(text: &str, p: f64) -> usize {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    (text.chars().count() as f64 * p).floor() as usize
}

/// Index of the karaoke word being spoken at `t`.
///
/// The last word with `start ≤ t < end`; `None` between words or without
/// per-word timing.
pub fn active_word_index(caption: &Caption, t: f64) -> Option<usize> {
    caption
        .style
        .words
        .as_ref()?
        .iter()
        .rposition(|w| w.start <= t && t < w.end)
}

/// Time of frame `frame` at `fps` frames per second.
pub fn frame_time(frame: u64, fps: u32) -> f64 {
    if fps == 0 {
        return 0.0;
    }
    frame as f64 / fps as f64
}

/// Evaluate every animated property of a caption at `t`.
pub fn evaluate(caption: &Caption, t: f64) -> CaptionFrame {
    let p = progress(caption, t);
    let kind = caption.style.animation.kind;
    CaptionFrame {
        progress: p,
        transform: transform(kind, p),
        visible_chars: (kind == AnimationKind::Typewriter)
            .then(|| visible_char_count(&caption.text, p)),
        active_word: active_word_index(caption, t),
    }
}

/// The visible prefix of `text` after `count` characters.
pub fn visible_text(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcut_clip_model::{CaptionId, CaptionStyle, NormalizedPoint, WordTiming};

    fn caption(animation: AnimationDescriptor) -> Caption {
        Caption {
            id: CaptionId(1),
            text: "Hello reels".to_string(),
            start_time: 10.0,
            end_time: 12.0,
            position: NormalizedPoint::default(),
            style: CaptionStyle {
                animation,
                ..CaptionStyle::default()
            },
            is_visible: true,
        }
    }

    fn anim(kind: AnimationKind, duration: f64, delay: f64, easing: Easing) -> AnimationDescriptor {
        AnimationDescriptor {
            kind,
            duration,
            delay,
            easing,
        }
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(ease(easing, 0.0), 0.0);
            assert!((ease(easing, 1.0) - 1.0).abs() < 1e-12);
        }
        assert!((ease(Easing::EaseIn, 0.5) - 0.25).abs() < 1e-12);
        assert!((ease(Easing::EaseOut, 0.5) - 0.75).abs() < 1e-12);
        assert!((ease(Easing::EaseInOut, 0.5) - 0.5).abs() < 1e-12);
        assert!((ease(Easing::EaseInOut, 0.25) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_progress_respects_delay_and_duration() {
        let c = caption(anim(AnimationKind::Fade, 0.5, 0.2, Easing::Linear));
        assert_eq!(progress(&c, 9.0), 0.0);
        assert_eq!(progress(&c, 10.1), 0.0);
        assert_eq!(progress(&c, 10.2), 0.0);
        assert!((progress(&c, 10.45) - 0.5).abs() < 1e-9);
        assert_eq!(progress(&c, 10.75), 1.0);
        assert_eq!(progress(&c, 11.5), 1.0);
    }

    #[test]
    fn test_none_animation_is_complete() {
        let c = caption(AnimationDescriptor::none());
        assert_eq!(progress(&c, 0.0), 1.0);
        assert_eq!(transform(AnimationKind::None, 0.0), CaptionTransform::IDENTITY);
    }

    #[test]
    fn test_zero_duration_completes_at_start() {
        let c = caption(anim(AnimationKind::Fade, 0.0, 0.0, Easing::Linear));
        assert_eq!(progress(&c, 10.0), 1.0);
        assert_eq!(progress(&c, 9.99), 0.0);
    }

    #[test]
    fn test_slide_and_scale_transforms() {
        let start = transform(AnimationKind::SlideUp, 0.0);
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.translate_y, SLIDE_DISTANCE);

        let half = transform(AnimationKind::SlideLeft, 0.5);
        assert_eq!(half.translate_x, SLIDE_DISTANCE / 2.0);
        assert_eq!(half.translate_y, 0.0);

        assert_eq!(transform(AnimationKind::SlideDown, 0.0).translate_y, -SLIDE_DISTANCE);
        assert_eq!(transform(AnimationKind::SlideRight, 0.0).translate_x, -SLIDE_DISTANCE);

        let scale = transform(AnimationKind::Scale, 0.0);
        assert_eq!(scale.scale, 0.5);
        assert_eq!(transform(AnimationKind::Scale, 1.0).scale, 1.0);

        assert_eq!(
            transform(AnimationKind::SlideUp, 1.0),
            CaptionTransform::IDENTITY
        );
    }

    #[test]
    fn test_typewriter_reveals_characters() {
        assert_eq!(visible_char_count("héllo", 0.0), 0);
        assert_eq!(visible_char_count("héllo", 0.5), 2);
        assert_eq!(visible_char_count("héllo", 1.0), 5);
        assert_eq!(visible_text("héllo", 2), "hé");
        assert_eq!(visible_text("héllo", 10), "héllo");

        let c = caption(anim(AnimationKind::Typewriter, 1.0, 0.0, Easing::Linear));
        let frame = evaluate(&c, 10.5);
        assert_eq!(frame.transform, CaptionTransform::IDENTITY);
        assert_eq!(frame.visible_chars, Some(5));
    }

    #[test]
    fn test_active_word_index() {
        let mut c = caption(AnimationDescriptor::none());
        assert_eq!(active_word_index(&c, 10.5), None);

        c.style.words = Some(vec![
            WordTiming {
                text: "Hello".into(),
                start: 10.0,
                end: 10.6,
            },
            WordTiming {
                text: "reels".into(),
                start: 10.8,
                end: 11.5,
            },
        ]);
        assert_eq!(active_word_index(&c, 10.0), Some(0));
        assert_eq!(active_word_index(&c, 10.7), None);
        assert_eq!(active_word_index(&c, 11.0), Some(1));
        assert_eq!(active_word_index(&c, 11.5), None);
    }

    #[test]
    fn test_frame_time() {
        assert_eq!(frame_time(0, 30), 0.0);
        assert_eq!(frame_time(45, 30), 1.5);
        assert_eq!(frame_time(10, 0), 0.0);
    }
}
