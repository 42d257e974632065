//! The `ReelClipInput` contract and its transcription payload.
//!
//! Transcription and reframing hints are computed upstream; this crate only
//! parses and validates them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::trim::TrimWindow;

/// Everything needed to open an editing session for one reel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelClipInput {
    pub clip_id: String,
    pub video_source_url: String,
    /// Length of the full source video in seconds. Must be positive.
    pub source_video_duration: f64,
    /// Initial trim start (source seconds).
    pub start_time: f64,
    /// Initial trim end (source seconds).
    pub end_time: f64,
    #[serde(default)]
    pub transcription: Option<Transcription>,
    #[serde(default)]
    pub metadata: Option<ClipMetadata>,
}

/// Transcription payload supplied by an external speech-to-text service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub segments: Vec<TranscriptionSegment>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A single transcribed segment with timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionSegment {
    pub text: String,
    /// Start time in source seconds.
    pub start: f64,
    /// End time in source seconds.
    pub end: f64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub words: Option<Vec<WordTiming>>,
}

/// Timing of a single spoken word, in source seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTiming {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Optional metadata attached to a clip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Subject centers computed upstream, used to place the vertical crop.
    #[serde(default)]
    pub reframing_hints: Vec<ReframeHint>,
    /// Keys this crate does not interpret, preserved for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Subject center at a point in source time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReframeHint {
    pub time: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl ReelClipInput {
    /// Parse an input from JSON text.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::ParseError {
            path: None,
            source: e,
        })
    }

    /// Load an input from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| InputError::IoError {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| InputError::ParseError {
            path: Some(path),
            source: e,
        })
    }

    /// Check required fields and the initial trim window.
    ///
    /// Returns the validated trim window on success.
    pub fn validate(&self) -> Result<TrimWindow, InputError> {
        if self.clip_id.trim().is_empty() {
            return Err(InputError::MissingField { field: "clipId" });
        }
        if self.video_source_url.trim().is_empty() {
            return Err(InputError::MissingField {
                field: "videoSourceUrl",
            });
        }
        if !self.source_video_duration.is_finite() || self.source_video_duration <= 0.0 {
            return Err(InputError::InvalidValue {
                field: "sourceVideoDuration",
                reason: format!("must be positive, got {}", self.source_video_duration),
            });
        }
        if let Some(transcription) = &self.transcription {
            for (i, segment) in transcription.segments.iter().enumerate() {
                if !segment.start.is_finite() || !segment.end.is_finite() {
                    return Err(InputError::InvalidValue {
                        field: "transcription.segments",
                        reason: format!("segment {i} has non-finite timing"),
                    });
                }
            }
        }
        TrimWindow::new(self.start_time, self.end_time, self.source_video_duration)
    }

    /// Transcription segments, empty when no transcription was supplied.
    pub fn segments(&self) -> &[TranscriptionSegment] {
        self.transcription
            .as_ref()
            .map(|t| t.segments.as_slice())
            .unwrap_or(&[])
    }

    /// Reframing hints from metadata, empty when none were supplied.
    pub fn reframing_hints(&self) -> &[ReframeHint] {
        self.metadata
            .as_ref()
            .map(|m| m.reframing_hints.as_slice())
            .unwrap_or(&[])
    }

    /// User the clip belongs to, if known.
    pub fn user_id(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.user_id.as_deref())
    }
}

/// Errors raised while reading or validating clip input.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error{}: {source}", path_suffix(.path))]
    ParseError {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid trim window: {reason}")]
    InvalidTrim { reason: String },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}
