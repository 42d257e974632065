//! Virtualized caption timeline.
//!
//! Rows have a fixed height, so the visible window is computed directly from
//! the scroll offset instead of measuring rows. Bars map the trim window onto
//! `[0, 100]` percent and are left unclamped; captions extending past the
//! trim produce negative offsets or widths beyond 100.

use reelcut_clip_model::{Caption, CaptionId, TrimWindow};
use reelcut_common::config::EditorDefaults;
use std::ops::Range;

/// Scroll state of the caption list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineViewport {
    /// Pixels scrolled from the top of the list.
    pub scroll_offset: f64,
    /// Visible height in pixels.
    pub height: f64,
    pub row_height: f64,
    /// Extra rows kept above and below the visible area.
    pub overscan: usize,
}

impl TimelineViewport {
    pub fn new(height: f64, row_height: f64, overscan: usize) -> Self {
        Self {
            scroll_offset: 0.0,
            height,
            row_height,
            overscan,
        }
    }

    pub fn from_config(config: &EditorDefaults, height: f64) -> Self {
        Self::new(height, config.row_height, config.overscan_rows)
    }

    /// Height of the whole list.
    pub fn total_height(&self, count: usize) -> f64 {
        count as f64 * self.row_height.max(0.0)
    }

    pub fn row_top(&self, index: usize) -> f64 {
        index as f64 * self.row_height
    }

    /// Indices of rows to render, overscan included.
    pub fn visible_range(&self, count: usize) -> Range<usize> {
        if count == 0 || !(self.row_height > 0.0) || !(self.height >= 0.0) {
            return 0..0;
        }
        let offset = self.scroll_offset.max(0.0);
        let first = (offset / self.row_height).floor() as usize;
        let last = ((offset + self.height) / self.row_height).ceil() as usize;

        let start = first.saturating_sub(self.overscan).min(count);
        let end = last.saturating_add(self.overscan).min(count);
        start..end.max(start)
    }

    fn max_scroll(&self, count: usize) -> f64 {
        (self.total_height(count) - self.height).max(0.0)
    }

    /// Scroll by `delta` pixels, staying within the list.
    pub fn scroll_by(&mut self, delta: f64, count: usize) {
        if !delta.is_finite() {
            return;
        }
        self.scroll_offset = (self.scroll_offset + delta).clamp(0.0, self.max_scroll(count));
    }

    /// Scroll the minimum amount that brings row `index` fully into view.
    pub fn scroll_to(&mut self, index: usize, count: usize) {
        if index >= count {
            return;
        }
        let top = self.row_top(index);
        let bottom = top + self.row_height;
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + self.height {
            self.scroll_offset = bottom - self.height;
        }
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll(count));
    }
}

/// Horizontal placement of a caption bar, in percent of the trim window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left_percent: f64,
    pub width_percent: f64,
}

impl BarGeometry {
    /// The same geometry clipped to `[0, 100]`, for renderers that cannot overflow.
    pub fn clamped(&self) -> BarGeometry {
        let left = self.left_percent.clamp(0.0, 100.0);
        let right = (self.left_percent + self.width_percent).clamp(0.0, 100.0);
        BarGeometry {
            left_percent: left,
            width_percent: (right - left).max(0.0),
        }
    }
}

/// Map a caption onto the trim window.
pub fn bar_geometry(caption: &Caption, trim: &TrimWindow) -> BarGeometry {
    let span = trim.duration();
    BarGeometry {
        left_percent: (caption.start_time - trim.start_time) / span * 100.0,
        width_percent: caption.duration() / span * 100.0,
    }
}

/// Inverse of the bar mapping: percent of the trim window to source seconds.
pub fn percent_to_time(percent: f64, trim: &TrimWindow) -> f64 {
    trim.start_time + percent / 100.0 * trim.duration()
}

/// Playhead position in percent of the trim window.
pub fn playhead_percent(playhead: f64, trim: &TrimWindow) -> f64 {
    (playhead - trim.start_time) / trim.duration() * 100.0
}

/// One rendered row of the caption list.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow<'a> {
    pub index: usize,
    pub id: CaptionId,
    pub top: f64,
    pub bar: BarGeometry,
    /// Renderers hide or dim rows outside the trim window.
    pub is_visible: bool,
    pub is_selected: bool,
    pub caption: &'a Caption,
}

/// Rows intersecting the viewport, in list order.
pub fn visible_rows<'a>(
    captions: &'a [Caption],
    trim: &TrimWindow,
    viewport: &TimelineViewport,
    selection: &[CaptionId],
) -> Vec<TimelineRow<'a>> {
    viewport
        .visible_range(captions.len())
        .map(|index| {
            let caption = &captions[index];
            TimelineRow {
                index,
                id: caption.id,
                top: viewport.row_top(index),
                bar: bar_geometry(caption, trim),
                is_visible: caption.is_visible,
                is_selected: selection.contains(&caption.id),
                caption,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcut_clip_model::{CaptionStyle, NormalizedPoint};

    fn caption(id: u64, start: f64, end: f64) -> Caption {
        Caption {
            id: CaptionId(id),
            text: format!("caption {id}"),
            start_time: start,
            end_time: end,
            position: NormalizedPoint::default(),
            style: CaptionStyle::default(),
            is_visible: true,
        }
    }

    #[test]
    fn test_visible_range_with_overscan() {
        let mut vp = TimelineViewport::new(200.0, 40.0, 2);
        assert_eq!(vp.visible_range(100), 0..7);

        vp.scroll_offset = 400.0;
        assert_eq!(vp.visible_range(100), 8..17);

        vp.scroll_offset = 3900.0;
        assert_eq!(vp.visible_range(100), 95..100);
        assert_eq!(vp.visible_range(0), 0..0);
    }

    #[test]
    fn test_visible_range_degenerate_row_height() {
        let vp = TimelineViewport::new(200.0, 0.0, 2);
        assert_eq!(vp.visible_range(10), 0..0);
    }

    #[test]
    fn test_total_height_and_row_top() {
        let vp = TimelineViewport::new(200.0, 44.0, 0);
        assert_eq!(vp.total_height(10), 440.0);
        assert_eq!(vp.row_top(3), 132.0);
    }

    #[test]
    fn test_scroll_to_keeps_row_in_view() {
        let mut vp = TimelineViewport::new(100.0, 20.0, 0);
        vp.scroll_to(9, 50);
        assert_eq!(vp.scroll_offset, 100.0);

        vp.scroll_to(2, 50);
        assert_eq!(vp.scroll_offset, 40.0);

        vp.scroll_to(3, 50);
        assert_eq!(vp.scroll_offset, 40.0);

        vp.scroll_by(10_000.0, 50);
        assert_eq!(vp.scroll_offset, 900.0);
    }

    #[test]
    fn test_bar_geometry_is_unclamped() {
        let trim = TrimWindow::new(10.0, 40.0, 60.0).unwrap();

        let inside = bar_geometry(&caption(1, 16.0, 19.0), &trim);
        assert!((inside.left_percent - 20.0).abs() < 1e-9);
        assert!((inside.width_percent - 10.0).abs() < 1e-9);

        let before = bar_geometry(&caption(2, 4.0, 13.0), &trim);
        assert!((before.left_percent + 20.0).abs() < 1e-9);
        assert!((before.width_percent - 30.0).abs() < 1e-9);

        let clamped = before.clamped();
        assert_eq!(clamped.left_percent, 0.0);
        assert!((clamped.width_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_round_trip() {
        let trim = TrimWindow::new(10.0, 40.0, 60.0).unwrap();
        assert!((percent_to_time(50.0, &trim) - 25.0).abs() < 1e-9);
        assert!((playhead_percent(25.0, &trim) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_visible_rows_carry_flags() {
        let trim = TrimWindow::new(0.0, 60.0, 60.0).unwrap();
        let mut captions: Vec<Caption> = (0..20)
            .map(|i| caption(i + 1, i as f64, i as f64 + 1.0))
            .collect();
        captions[1].is_visible = false;

        let vp = TimelineViewport::new(80.0, 40.0, 1);
        let rows = visible_rows(&captions, &trim, &vp, &[CaptionId(1)]);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_selected);
        assert!(!rows[1].is_visible);
        assert_eq!(rows[2].top, 80.0);
        assert_eq!(rows[2].id, CaptionId(3));
    }
}
