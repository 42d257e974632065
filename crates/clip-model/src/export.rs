//! The `ReelExportResult` contract returned after an export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::caption::{CaptionId, CaptionStyle};
use crate::geometry::NormalizedPoint;

/// Result of exporting one reel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelExportResult {
    pub clip_id: String,
    /// Handle to the trimmed media produced by the pipeline.
    pub media: ExportedMedia,
    /// Where the media can be fetched from (local path or caller-provided base URL).
    pub video_url: String,
    /// Clip length in seconds (the trim window duration).
    pub duration: f64,
    /// Size of the exported media in bytes.
    pub file_size: u64,
    pub export_settings: ExportSettings,
    pub exported_at: DateTime<Utc>,
}

/// Exported media asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedMedia {
    pub file_name: String,
    pub mime_type: String,
    /// Raw bytes; not serialized, callers persist them separately.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Settings that produced an export, sufficient to re-render its captions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Trim start in source seconds.
    pub start_time: f64,
    /// Trim end in source seconds.
    pub end_time: f64,
    pub caption_styles: Vec<CaptionStyleSnapshot>,
}

/// One caption as it appears in the exported clip.
///
/// Times are relative to the exported clip, whose clock starts at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyleSnapshot {
    pub caption_id: CaptionId,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub position: NormalizedPoint,
    pub style: CaptionStyle,
}

impl ReelExportResult {
    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} -> {} ({:.2}s, {} bytes, {} captions)",
            self.clip_id,
            self.media.file_name,
            self.duration,
            self.file_size,
            self.export_settings.caption_styles.len()
        )
    }
}
