//! The editing session: captions, trim window, playhead, and selection.
//!
//! `ReelSession` is the single owner of editor state. Every operation either
//! applies fully or leaves the session untouched. Operations whose
//! preconditions are not met (unknown ids, a playhead outside the caption)
//! return `false` instead of failing; only malformed input surfaces as a
//! `ReelError::Validation`.

use reelcut_clip_model::{
    Caption, CaptionId, CaptionStyle, NormalizedPoint, ReelClipInput, TranscriptionSegment,
    TrimWindow, WordTiming, MIN_DURATION,
};
use reelcut_common::error::{ReelError, ReelResult};
use reelcut_common::timecode::clamp_time;

/// Clamp a caption interval into the trim window.
///
/// `start` lands in `[trim.start, min(end, trim.end) − MIN_DURATION]` with the
/// lower bound winning, then `end` lands in `[start + MIN_DURATION, trim.end]`.
/// The result is never inverted and never shorter than `MIN_DURATION`.
pub fn clamp_interval(start: f64, end: f64, trim: &TrimWindow) -> (f64, f64) {
    let start = clamp_time(
        start,
        trim.start_time,
        end.min(trim.end_time) - MIN_DURATION,
    );
    let end = clamp_time(end, start + MIN_DURATION, trim.end_time).max(start + MIN_DURATION);
    (start, end)
}

/// Turn transcription segments into captions.
///
/// Each non-empty segment becomes one caption with ids counting up from
/// `first_id`. Segments shorter than `MIN_DURATION` are stretched; times are
/// not clamped into the trim window. Per-word timings become karaoke words.
pub fn ingest(
    segments: &[TranscriptionSegment],
    trim: &TrimWindow,
    style: &CaptionStyle,
    position: NormalizedPoint,
    first_id: u64,
) -> Vec<Caption> {
    let mut next_id = first_id;
    let mut captions: Vec<Caption> = segments
        .iter()
        .filter_map(|segment| {
            let text = segment.text.trim();
            if text.is_empty() || !segment.start.is_finite() || !segment.end.is_finite() {
                return None;
            }
            let start_time = segment.start;
            let end_time = segment.end.max(start_time + MIN_DURATION);
            let words = segment.words.clone().filter(|w| !w.is_empty());

            let id = CaptionId(next_id);
            next_id += 1;

            let mut caption = Caption {
                id,
                text: text.to_string(),
                start_time,
                end_time,
                position,
                style: CaptionStyle {
                    words,
                    ..style.without_words()
                },
                is_visible: false,
            };
            caption.refresh_visibility(trim);
            Some(caption)
        })
        .collect();

    sort_captions(&mut captions);
    captions
}

fn sort_captions(captions: &mut [Caption]) {
    captions.sort_by(|a, b| {
        a.start_time
            .total_cmp(&b.start_time)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// What a split would produce, computed without mutating anything.
#[derive(Debug, Clone, PartialEq)]
struct SplitPlan {
    index: usize,
    at: f64,
    first_text: String,
    second_text: String,
    first_words: Option<Vec<WordTiming>>,
    second_words: Option<Vec<WordTiming>>,
}

/// Editor state for one reel.
#[derive(Debug, Clone)]
pub struct ReelSession {
    clip_id: String,
    source_duration: f64,
    trim: TrimWindow,
    playhead: f64,
    /// Sorted by `(start_time, id)`.
    captions: Vec<Caption>,
    /// Insertion-ordered, no duplicates.
    selection: Vec<CaptionId>,
    next_id: u64,
    revision: u64,
    default_style: CaptionStyle,
    default_position: NormalizedPoint,
}

impl ReelSession {
    /// Create an empty session over a validated trim window.
    pub fn new(clip_id: impl Into<String>, source_duration: f64, trim: TrimWindow) -> Self {
        Self {
            clip_id: clip_id.into(),
            source_duration,
            trim,
            playhead: trim.start_time,
            captions: Vec::new(),
            selection: Vec::new(),
            next_id: 1,
            revision: 0,
            default_style: CaptionStyle::default(),
            default_position: NormalizedPoint::default(),
        }
    }

    /// Validate a clip input and open a session with its transcription ingested.
    pub fn from_input(input: &ReelClipInput) -> ReelResult<Self> {
        Self::from_input_with_style(input, CaptionStyle::default(), NormalizedPoint::default())
    }

    /// Like [`ReelSession::from_input`], with the style and anchor new captions start from.
    pub fn from_input_with_style(
        input: &ReelClipInput,
        style: CaptionStyle,
        position: NormalizedPoint,
    ) -> ReelResult<Self> {
        let trim = input
            .validate()
            .map_err(|e| ReelError::validation(e.to_string()))?;

        let mut session = Self::new(input.clip_id.clone(), input.source_video_duration, trim);
        session.default_style = style.without_words();
        session.default_position = position;
        session.ingest(input.segments());

        tracing::debug!(
            clip_id = %session.clip_id,
            captions = session.captions.len(),
            trim_start = trim.start_time,
            trim_end = trim.end_time,
            "Opened reel session"
        );
        Ok(session)
    }

    /// Replace all captions with ones built from transcription segments.
    ///
    /// Returns the number of captions created.
    pub fn ingest(&mut self, segments: &[TranscriptionSegment]) -> usize {
        let captions = ingest(
            segments,
            &self.trim,
            &self.default_style,
            self.default_position,
            self.next_id,
        );
        self.next_id += captions.len() as u64;
        self.captions = captions;
        self.selection.clear();
        self.bump();
        self.captions.len()
    }

    pub fn clip_id(&self) -> &str {
        &self.clip_id
    }

    pub fn source_duration(&self) -> f64 {
        self.source_duration
    }

    pub fn trim(&self) -> &TrimWindow {
        &self.trim
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Incremented on every applied caption or trim edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All captions, sorted by start time then id.
    pub fn captions(&self) -> &[Caption] {
        &self.captions
    }

    /// Captions intersecting the trim window.
    pub fn visible_captions(&self) -> impl Iterator<Item = &Caption> {
        self.captions.iter().filter(|c| c.is_visible)
    }

    pub fn caption(&self, id: CaptionId) -> Option<&Caption> {
        self.captions.iter().find(|c| c.id == id)
    }

    /// Visible captions on screen at `t`.
    pub fn captions_at(&self, t: f64) -> Vec<&Caption> {
        self.captions
            .iter()
            .filter(|c| c.is_visible && c.is_active_at(t))
            .collect()
    }

    pub fn default_style(&self) -> &CaptionStyle {
        &self.default_style
    }

    /// Style used for captions added after this call.
    pub fn set_default_style(&mut self, style: CaptionStyle) {
        self.default_style = style.without_words();
    }

    // --- Trim & playhead ---

    /// Replace the trim window.
    ///
    /// Caption times are left as they are; visibility is recomputed and the
    /// playhead is pulled into the new window.
    pub fn set_trim_window(&mut self, start_time: f64, end_time: f64) -> ReelResult<()> {
        let trim = TrimWindow::new(start_time, end_time, self.source_duration)
            .map_err(|e| ReelError::validation(e.to_string()))?;

        self.trim = trim;
        for caption in &mut self.captions {
            caption.refresh_visibility(&trim);
        }
        self.playhead = trim.clamp(self.playhead);
        self.bump();

        tracing::debug!(start = start_time, end = end_time, "Trim window updated");
        Ok(())
    }

    /// Move the playhead, clamped into the trim window. Returns the new position.
    pub fn set_playhead(&mut self, t: f64) -> f64 {
        self.playhead = self.trim.clamp(t);
        self.playhead
    }

    /// Advance playback by `dt` seconds, stopping at the trim end.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if !dt.is_finite() {
            return self.playhead;
        }
        self.set_playhead(self.playhead + dt)
    }

    // --- Caption edits ---

    /// Move both edges of a caption, clamped with [`clamp_interval`].
    pub fn update_start_end(&mut self, id: CaptionId, new_start: f64, new_end: f64) -> bool {
        if !new_start.is_finite() || !new_end.is_finite() {
            return false;
        }
        let trim = self.trim;
        let Some(caption) = self.caption_mut(id) else {
            return false;
        };

        let (start, end) = clamp_interval(new_start, new_end, &trim);
        caption.start_time = start;
        caption.end_time = end;
        caption.refresh_visibility(&trim);
        self.resort();
        self.bump();
        true
    }

    /// Translate captions by `delta_ms` milliseconds.
    ///
    /// Each caption is re-clamped on its own, so captions may end up
    /// overlapping their neighbours. Karaoke words move with the caption.
    pub fn shift_captions(&mut self, ids: &[CaptionId], delta_ms: f64) -> bool {
        if !delta_ms.is_finite() {
            return false;
        }
        let delta = delta_ms / 1000.0;
        let trim = self.trim;
        let mut shifted = 0usize;

        for caption in self.captions.iter_mut().filter(|c| ids.contains(&c.id)) {
            let (start, end) =
                clamp_interval(caption.start_time + delta, caption.end_time + delta, &trim);
            let moved = start - caption.start_time;
            if let Some(words) = caption.style.words.as_mut() {
                for word in words.iter_mut() {
                    word.start += moved;
                    word.end += moved;
                }
            }
            caption.start_time = start;
            caption.end_time = end;
            caption.refresh_visibility(&trim);
            shifted += 1;
        }

        if shifted == 0 {
            return false;
        }
        self.resort();
        self.bump();
        tracing::debug!(count = shifted, delta_ms, "Shifted captions");
        true
    }

    /// Whether [`ReelSession::split_at_playhead`] would apply to `id` right now.
    pub fn split_eligible(&self, id: CaptionId) -> bool {
        self.split_plan(id).is_some()
    }

    /// Split a caption in two at the playhead.
    ///
    /// The first half keeps the id; the second half gets a fresh one and the
    /// same style. Returns `false` if the split is not possible.
    pub fn split_at_playhead(&mut self, id: CaptionId) -> bool {
        let Some(plan) = self.split_plan(id) else {
            return false;
        };

        let second_id = self.allocate_id();
        let trim = self.trim;
        let original = &mut self.captions[plan.index];

        let mut second = Caption {
            id: second_id,
            text: plan.second_text,
            start_time: plan.at,
            end_time: original.end_time,
            position: original.position,
            style: CaptionStyle {
                words: plan.second_words,
                ..original.style.without_words()
            },
            is_visible: false,
        };
        second.refresh_visibility(&trim);

        original.text = plan.first_text;
        original.end_time = plan.at;
        original.style.words = plan.first_words;
        original.refresh_visibility(&trim);

        self.captions.push(second);
        self.resort();
        self.bump();
        tracing::debug!(%id, second = %second_id, at = plan.at, "Split caption");
        true
    }

    fn split_plan(&self, id: CaptionId) -> Option<SplitPlan> {
        let index = self.captions.iter().position(|c| c.id == id)?;
        let caption = &self.captions[index];
        let at = self.playhead;

        if !(at > caption.start_time && at < caption.end_time) {
            return None;
        }
        if at - caption.start_time < MIN_DURATION || caption.end_time - at < MIN_DURATION {
            return None;
        }

        let tokens = caption.tokens();
        let n = tokens.len();
        if n < 2 {
            return None;
        }

        let p = (at - caption.start_time) / caption.duration();
        let k = ((p * n as f64).round() as usize).clamp(1, n - 1);

        let (first_words, second_words) = match &caption.style.words {
            Some(words) => {
                let (before, after): (Vec<WordTiming>, Vec<WordTiming>) =
                    words.iter().cloned().partition(|w| w.start < at);
                (non_empty(before), non_empty(after))
            }
            None => (None, None),
        };

        Some(SplitPlan {
            index,
            at,
            first_text: tokens[..k].join(" "),
            second_text: tokens[k..].join(" "),
            first_words,
            second_words,
        })
    }

    /// Merge captions into the chronologically earliest one.
    ///
    /// Needs at least two existing ids. The host keeps its id and style and
    /// spans every merged interval; the others are removed.
    pub fn merge_captions(&mut self, ids: &[CaptionId]) -> bool {
        let mut members: Vec<&Caption> = self
            .captions
            .iter()
            .filter(|c| ids.contains(&c.id))
            .collect();
        if members.len() < 2 {
            return false;
        }
        members.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        let host_id = members[0].id;
        let start = members
            .iter()
            .map(|c| c.start_time)
            .fold(f64::INFINITY, f64::min);
        let end = members
            .iter()
            .map(|c| c.end_time)
            .fold(f64::NEG_INFINITY, f64::max);
        let text = members
            .iter()
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let mut words: Vec<WordTiming> = members
            .iter()
            .filter_map(|c| c.style.words.as_ref())
            .flatten()
            .cloned()
            .collect();
        words.sort_by(|a, b| a.start.total_cmp(&b.start));
        let merged: Vec<CaptionId> = members.iter().map(|c| c.id).collect();

        let trim = self.trim;
        self.captions
            .retain(|c| c.id == host_id || !merged.contains(&c.id));
        if let Some(host) = self.caption_mut(host_id) {
            host.start_time = start;
            host.end_time = end;
            host.text = text;
            host.style.words = non_empty(words);
            host.refresh_visibility(&trim);
        }

        self.selection = vec![host_id];
        self.resort();
        self.bump();
        tracing::debug!(host = %host_id, merged = merged.len(), "Merged captions");
        true
    }

    /// Remove captions. Returns how many were deleted.
    pub fn delete_captions(&mut self, ids: &[CaptionId]) -> usize {
        let before = self.captions.len();
        self.captions.retain(|c| !ids.contains(&c.id));
        let removed = before - self.captions.len();
        if removed > 0 {
            self.selection.retain(|id| !ids.contains(id));
            self.bump();
        }
        removed
    }

    /// Replace a caption's text. Blank text is rejected.
    pub fn update_text(&mut self, id: CaptionId, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let Some(caption) = self.caption_mut(id) else {
            return false;
        };
        caption.text = text.to_string();
        self.bump();
        true
    }

    /// Apply a style to captions, keeping each caption's own karaoke words.
    pub fn update_style(&mut self, ids: &[CaptionId], style: &CaptionStyle) -> bool {
        let mut applied = false;
        for caption in self.captions.iter_mut().filter(|c| ids.contains(&c.id)) {
            let words = caption.style.words.take();
            caption.style = CaptionStyle {
                words,
                ..style.without_words()
            };
            applied = true;
        }
        if applied {
            self.bump();
        }
        applied
    }

    pub fn update_position(&mut self, id: CaptionId, position: NormalizedPoint) -> bool {
        let Some(caption) = self.caption_mut(id) else {
            return false;
        };
        caption.position = NormalizedPoint::new(position.x, position.y);
        self.bump();
        true
    }

    /// Insert a new caption with the default style, clamped into the trim window.
    pub fn add_caption(&mut self, text: &str, start: f64, end: f64) -> Option<CaptionId> {
        let text = text.trim();
        if text.is_empty() || !start.is_finite() || !end.is_finite() {
            return None;
        }
        let (start_time, end_time) = clamp_interval(start, end, &self.trim);
        let id = self.allocate_id();
        let mut caption = Caption {
            id,
            text: text.to_string(),
            start_time,
            end_time,
            position: self.default_position,
            style: self.default_style.clone(),
            is_visible: false,
        };
        caption.refresh_visibility(&self.trim);
        self.captions.push(caption);
        self.resort();
        self.bump();
        Some(id)
    }

    // --- Selection ---

    pub fn selection(&self) -> &[CaptionId] {
        &self.selection
    }

    pub fn is_selected(&self, id: CaptionId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection with a single caption.
    pub fn select(&mut self, id: CaptionId) -> bool {
        if self.caption(id).is_none() {
            return false;
        }
        self.selection = vec![id];
        true
    }

    pub fn add_to_selection(&mut self, id: CaptionId) -> bool {
        if self.caption(id).is_none() || self.selection.contains(&id) {
            return false;
        }
        self.selection.push(id);
        true
    }

    /// Add or remove a caption from the selection. Returns whether it is now selected.
    pub fn toggle_selection(&mut self, id: CaptionId) -> bool {
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
            false
        } else {
            self.add_to_selection(id)
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every caption in timeline order.
    pub fn select_all(&mut self) {
        self.selection = self.captions.iter().map(|c| c.id).collect();
    }

    pub fn merge_selected(&mut self) -> bool {
        let ids = self.selection.clone();
        self.merge_captions(&ids)
    }

    pub fn shift_selected(&mut self, delta_ms: f64) -> bool {
        let ids = self.selection.clone();
        self.shift_captions(&ids, delta_ms)
    }

    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.clone();
        self.delete_captions(&ids)
    }

    // --- internals ---

    fn caption_mut(&mut self, id: CaptionId) -> Option<&mut Caption> {
        self.captions.iter_mut().find(|c| c.id == id)
    }

    fn allocate_id(&mut self) -> CaptionId {
        let id = CaptionId(self.next_id);
        self.next_id += 1;
        id
    }

    fn resort(&mut self) {
        sort_captions(&mut self.captions);
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

fn non_empty(words: Vec<WordTiming>) -> Option<Vec<WordTiming>> {
    if words.is_empty() {
        None
    } else {
        Some(words)
    }
}
