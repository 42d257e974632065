//! Normalized frame geometry.
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the source
//! frame, so positions survive resolution changes between preview and export.

use serde::{Deserialize, Serialize};

/// Output aspect ratio of a reel (width / height).
pub const VERTICAL_ASPECT: f64 = 9.0 / 16.0;

/// A 2D normalized point, used for caption anchors and subject centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Create a point, clamping both axes into `[0, 1]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &NormalizedPoint, b: &NormalizedPoint, t: f64) -> NormalizedPoint {
        let t = clamp_unit(t);
        NormalizedPoint {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}

impl Default for NormalizedPoint {
    /// Lower-third anchor, the usual spot for reel captions.
    fn default() -> Self {
        Self { x: 0.5, y: 0.8 }
    }
}

/// A crop rectangle within the source frame.
///
/// `(0.0, 0.0)` is top-left, `(1.0, 1.0)` bottom-right of the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl CropRect {
    /// The whole source frame.
    pub const FULL: CropRect = CropRect {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Crop of size `(w, h)` centered on `center`, shifted to stay inside the frame.
    pub fn centered(center: NormalizedPoint, w: f64, h: f64) -> Self {
        let w = w.clamp(0.01, 1.0);
        let h = h.clamp(0.01, 1.0);
        Self {
            x: (center.x - w / 2.0).clamp(0.0, 1.0 - w),
            y: (center.y - h / 2.0).clamp(0.0, 1.0 - h),
            w,
            h,
        }
    }

    /// Full-height 9:16 crop of a source with the given aspect (width / height).
    ///
    /// Sources narrower than 9:16 keep their full width and crop height instead.
    pub fn vertical(center: NormalizedPoint, source_aspect: f64) -> Self {
        let source_aspect = if source_aspect.is_finite() && source_aspect > 0.0 {
            source_aspect
        } else {
            VERTICAL_ASPECT
        };
        if source_aspect >= VERTICAL_ASPECT {
            Self::centered(center, VERTICAL_ASPECT / source_aspect, 1.0)
        } else {
            Self::centered(center, 1.0, source_aspect / VERTICAL_ASPECT)
        }
    }

    /// The center point of this crop.
    pub fn center(&self) -> NormalizedPoint {
        NormalizedPoint {
            x: self.x + self.w / 2.0,
            y: self.y + self.h / 2.0,
        }
    }

    /// Pixel rectangle `(x, y, w, h)` for a source of the given size, with even
    /// dimensions as required by yuv420p encoders.
    pub fn to_pixels(&self, source_width: u32, source_height: u32) -> (u32, u32, u32, u32) {
        let sw = source_width as f64;
        let sh = source_height as f64;
        let w = ((self.w * sw).round() as u32).max(2) & !1;
        let h = ((self.h * sh).round() as u32).max(2) & !1;
        let x = ((self.x * sw).round() as u32).min(source_width.saturating_sub(w));
        let y = ((self.y * sh).round() as u32).min(source_height.saturating_sub(h));
        (x, y, w, h)
    }
}

impl Default for CropRect {
    fn default() -> Self {
        Self::FULL
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
