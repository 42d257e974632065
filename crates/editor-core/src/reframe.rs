//! Vertical (9:16) reframing.
//!
//! Places a vertical crop over a landscape source by following subject
//! centers computed upstream. Between hints the crop eases from one center
//! to the next; before the first and after the last hint it holds.

use reelcut_clip_model::{CropRect, Easing, NormalizedPoint, ReframeHint, TrimWindow};
use serde::{Deserialize, Serialize};

use crate::animation::ease;

/// Configuration for vertical reframing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReframeConfig {
    /// Source width / height.
    pub source_aspect: f64,

    /// Curve used to move the crop between hints.
    pub easing: Easing,

    /// Spacing of generated keyframes in seconds.
    pub sample_interval_secs: f64,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            source_aspect: 16.0 / 9.0,
            easing: Easing::EaseInOut,
            // ~2 Hz
            sample_interval_secs: 0.5,
        }
    }
}

/// A crop viewport at a point in source time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropKeyframe {
    pub time_secs: f64,
    pub crop: CropRect,
}

/// Crop follower built from reframing hints.
#[derive(Debug, Clone)]
pub struct Reframer {
    hints: Vec<ReframeHint>,
    config: ReframeConfig,
}

impl Reframer {
    /// Build a follower. Hints with non-finite values are dropped.
    pub fn new(hints: &[ReframeHint], config: ReframeConfig) -> Self {
        let mut hints: Vec<ReframeHint> = hints
            .iter()
            .copied()
            .filter(|h| h.time.is_finite() && h.center_x.is_finite() && h.center_y.is_finite())
            .collect();
        hints.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { hints, config }
    }

    pub fn has_hints(&self) -> bool {
        !self.hints.is_empty()
    }

    /// Subject center at `t`.
    pub fn center_at(&self, t: f64) -> NormalizedPoint {
        let (first, last) = match (self.hints.first(), self.hints.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return NormalizedPoint::new(0.5, 0.5),
        };
        if t <= first.time {
            return hint_point(first);
        }
        if t >= last.time {
            return hint_point(last);
        }

        // t is strictly inside the hint span, so a following hint exists.
        let next = self.hints.partition_point(|h| h.time <= t);
        let a = &self.hints[next - 1];
        let b = &self.hints[next];
        let span = b.time - a.time;
        if span <= 0.0 {
            return hint_point(b);
        }
        let p = ease(self.config.easing, (t - a.time) / span);
        NormalizedPoint::lerp(&hint_point(a), &hint_point(b), p)
    }

    /// 9:16 crop at `t`, kept inside the source frame.
    pub fn crop_at(&self, t: f64) -> CropRect {
        CropRect::vertical(self.center_at(t), self.config.source_aspect)
    }

    /// Sample crop keyframes across the trim window, both ends included.
    pub fn keyframes(&self, trim: &TrimWindow) -> Vec<CropKeyframe> {
        let interval = if self.config.sample_interval_secs > 0.0 {
            self.config.sample_interval_secs
        } else {
            trim.duration()
        };

        let mut keyframes = vec![];
        let mut t = trim.start_time;
        while t < trim.end_time {
            keyframes.push(CropKeyframe {
                time_secs: t,
                crop: self.crop_at(t),
            });
            t += interval;
        }
        keyframes.push(CropKeyframe {
            time_secs: trim.end_time,
            crop: self.crop_at(trim.end_time),
        });
        keyframes
    }
}

fn hint_point(hint: &ReframeHint) -> NormalizedPoint {
    NormalizedPoint::new(hint.center_x, hint.center_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(time: f64, x: f64, y: f64) -> ReframeHint {
        ReframeHint {
            time,
            center_x: x,
            center_y: y,
        }
    }

    #[test]
    fn test_no_hints_gives_centered_crop() {
        let reframer = Reframer::new(&[], ReframeConfig::default());
        let crop = reframer.crop_at(5.0);
        let center = crop.center();
        assert!((center.x - 0.5).abs() < 1e-9);
        assert!((crop.h - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_crop_is_vertical_for_landscape_source() {
        let reframer = Reframer::new(&[hint(0.0, 0.3, 0.5)], ReframeConfig::default());
        let crop = reframer.crop_at(0.0);
        let pixel_ratio = (crop.w * 16.0) / (crop.h * 9.0);
        assert!(
            (pixel_ratio - 9.0 / 16.0).abs() < 1e-6,
            "Aspect ratio {pixel_ratio} not 9:16"
        );
    }

    #[test]
    fn test_eases_between_hints_and_holds_outside() {
        let reframer = Reframer::new(
            &[hint(10.0, 0.8, 0.5), hint(0.0, 0.2, 0.5)],
            ReframeConfig::default(),
        );
        assert!((reframer.center_at(-1.0).x - 0.2).abs() < 1e-9);
        assert!((reframer.center_at(5.0).x - 0.5).abs() < 1e-9);
        assert!((reframer.center_at(2.5).x - 0.275).abs() < 1e-9);
        assert!((reframer.center_at(20.0).x - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_crop_stays_inside_frame() {
        let reframer = Reframer::new(&[hint(0.0, 0.99, 0.5)], ReframeConfig::default());
        let crop = reframer.crop_at(0.0);
        assert!(crop.x >= 0.0);
        assert!(crop.x + crop.w <= 1.0 + 1e-9);
    }

    #[test]
    fn test_keyframes_cover_trim() {
        let reframer = Reframer::new(&[hint(0.0, 0.4, 0.5)], ReframeConfig::default());
        let trim = TrimWindow::new(10.0, 12.0, 60.0).unwrap();
        let keyframes = reframer.keyframes(&trim);
        assert_eq!(keyframes.len(), 5);
        assert_eq!(keyframes[0].time_secs, 10.0);
        assert_eq!(keyframes[4].time_secs, 12.0);
    }

    #[test]
    fn test_non_finite_hints_are_dropped() {
        let reframer = Reframer::new(&[hint(f64::NAN, 0.1, 0.1)], ReframeConfig::default());
        assert!(!reframer.has_hints());
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let config: ReframeConfig = serde_json::from_str(r#"{"sourceAspect": 1.5}"#).unwrap();
        assert_eq!(config.source_aspect, 1.5);
        assert_eq!(config.easing, Easing::EaseInOut);
        assert_eq!(config.sample_interval_secs, 0.5);
    }
}
