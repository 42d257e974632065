//! Subtitle sidecars in SRT and WebVTT formats.
//!
//! Cues are built from visible captions, clipped to the trim window, and
//! re-based so the first frame of the exported clip is `00:00:00`.

use std::path::Path;

use reelcut_clip_model::{Caption, TrimWindow};
use reelcut_common::timecode::{format_srt_time, format_vtt_time};
use serde::{Deserialize, Serialize};

/// Sidecar format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// Pick a format from a file extension, defaulting to SRT.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("vtt") => Self::Vtt,
            _ => Self::Srt,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

/// A subtitle cue in clip-relative seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// Cues for the visible captions, clipped and re-based to the trim window.
pub fn build_cues(captions: &[Caption], trim: &TrimWindow) -> Vec<Cue> {
    let mut cues: Vec<Cue> = captions
        .iter()
        .filter(|c| c.is_visible)
        .filter_map(|c| {
            let start = c.start_time.max(trim.start_time);
            let end = c.end_time.min(trim.end_time);
            if end <= start {
                return None;
            }
            Some(Cue {
                start_secs: trim.to_clip_time(start),
                end_secs: trim.to_clip_time(end),
                text: c.text.clone(),
            })
        })
        .collect();
    cues.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));
    cues
}

/// Generate SRT subtitle content.
pub fn generate_srt(captions: &[Caption], trim: &TrimWindow) -> String {
    let mut output = String::new();

    for (i, cue) in build_cues(captions, trim).iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(cue.start_secs),
            format_srt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Generate WebVTT subtitle content.
pub fn generate_vtt(captions: &[Caption], trim: &TrimWindow) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for cue in build_cues(captions, trim) {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(cue.start_secs),
            format_vtt_time(cue.end_secs),
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output
}

/// Render captions in the requested format.
pub fn render_subtitles(captions: &[Caption], trim: &TrimWindow, format: SubtitleFormat) -> String {
    match format {
        SubtitleFormat::Srt => generate_srt(captions, trim),
        SubtitleFormat::Vtt => generate_vtt(captions, trim),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcut_clip_model::{CaptionId, CaptionStyle, NormalizedPoint};

    fn caption(id: u64, text: &str, start: f64, end: f64, trim: &TrimWindow) -> Caption {
        let mut c = Caption {
            id: CaptionId(id),
            text: text.to_string(),
            start_time: start,
            end_time: end,
            position: NormalizedPoint::default(),
            style: CaptionStyle::default(),
            is_visible: false,
        };
        c.refresh_visibility(trim);
        c
    }

    #[test]
    fn test_srt_is_rebased_to_trim_start() {
        let trim = TrimWindow::new(10.0, 40.0, 60.0).unwrap();
        let captions = vec![
            caption(1, "Hello world", 10.0, 12.5, &trim),
            caption(2, "This is a test", 13.0, 15.0, &trim),
        ];

        let srt = generate_srt(&captions, &trim);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nHello world"));
        assert!(srt.contains("2\n00:00:03,000 --> 00:00:05,000\nThis is a test"));
    }

    #[test]
    fn test_cues_are_clipped_and_hidden_captions_skipped() {
        let trim = TrimWindow::new(10.0, 40.0, 60.0).unwrap();
        let captions = vec![
            caption(1, "straddles start", 5.0, 12.0, &trim),
            caption(2, "outside", 41.0, 50.0, &trim),
            caption(3, "straddles end", 39.0, 45.0, &trim),
        ];

        let cues = build_cues(&captions, &trim);
        assert_eq!(cues.len(), 2);
        assert_eq!((cues[0].start_secs, cues[0].end_secs), (0.0, 2.0));
        assert_eq!((cues[1].start_secs, cues[1].end_secs), (29.0, 30.0));
    }

    #[test]
    fn test_vtt_generation() {
        let trim = TrimWindow::new(0.0, 120.0, 120.0).unwrap();
        let captions = vec![caption(1, "One minute in", 61.5, 63.0, &trim)];

        let vtt = render_subtitles(&captions, &trim, SubtitleFormat::Vtt);
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:01:01.500 --> 00:01:03.000"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SubtitleFormat::from_path(Path::new("out.VTT")), SubtitleFormat::Vtt);
        assert_eq!(SubtitleFormat::from_path(Path::new("out.srt")), SubtitleFormat::Srt);
        assert_eq!(SubtitleFormat::from_path(Path::new("out")), SubtitleFormat::Srt);
    }
}
