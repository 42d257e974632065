//! Reel export: cut the trim window out of the source and describe the result.

use reelcut_clip_model::{
    Caption, CaptionStyleSnapshot, ExportSettings, ExportedMedia, ReelExportResult, TrimWindow,
};
use reelcut_common::error::{ReelError, ReelResult};
use reelcut_editor_core::session::ReelSession;
use serde::Serialize;

use crate::collab::CreditGate;
use crate::engine::TranscodeEngine;
use crate::pipeline::{MediaPipeline, SourceMedia};

/// Progress callback for export.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    Preparing,
    Clipping,
    Finalizing,
    Complete,
    Failed,
}

/// Caller-side export settings.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Base URL the media will be served from. Without one, `video_url` is
    /// the bare file name.
    pub video_url_base: Option<String>,

    /// User charged by the credit check.
    pub user_id: Option<String>,
}

/// Export the session's trim window.
///
/// When a credit gate is given, the export is charged to
/// `options.user_id` before any media work starts.
pub async fn export_reel<E: TranscodeEngine>(
    session: &ReelSession,
    source: SourceMedia<'_>,
    pipeline: &MediaPipeline<E>,
    credits: Option<&dyn CreditGate>,
    options: &ExportOptions,
    progress: Option<ProgressCallback>,
) -> ReelResult<ReelExportResult> {
    let notify = |value: f64, stage: ExportStage| {
        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: value,
                stage,
            });
        }
    };

    match run_export(session, source, pipeline, credits, options, &notify).await {
        Ok(result) => {
            notify(1.0, ExportStage::Complete);
            tracing::info!(summary = %result.summary(), "Export complete");
            Ok(result)
        }
        Err(err) => {
            notify(0.0, ExportStage::Failed);
            tracing::error!(clip_id = %session.clip_id(), error = %err, "Export failed");
            Err(err)
        }
    }
}

async fn run_export<E: TranscodeEngine>(
    session: &ReelSession,
    source: SourceMedia<'_>,
    pipeline: &MediaPipeline<E>,
    credits: Option<&dyn CreditGate>,
    options: &ExportOptions,
    notify: &impl Fn(f64, ExportStage),
) -> ReelResult<ReelExportResult> {
    let trim = *session.trim();
    notify(0.0, ExportStage::Preparing);
    tracing::info!(
        clip_id = %session.clip_id(),
        start = trim.start_time,
        end = trim.end_time,
        captions = session.visible_captions().count(),
        "Starting export"
    );

    if let Some(gate) = credits {
        let user_id = options
            .user_id
            .as_deref()
            .ok_or_else(|| ReelError::validation("credit check needs a user id"))?;
        let decision = gate.check(user_id, trim.duration()).await?;
        if !decision.ok {
            return Err(ReelError::rejected(
                decision
                    .error
                    .unwrap_or_else(|| "insufficient credits".to_string()),
            ));
        }
    }

    notify(0.1, ExportStage::Clipping);
    let asset = pipeline
        .clip_segment(source, trim.start_time, trim.end_time)
        .await?;

    notify(0.9, ExportStage::Finalizing);
    let file_name = format!("{}.{}", file_stem(session.clip_id()), asset.extension);
    let video_url = match &options.video_url_base {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), file_name),
        None => file_name.clone(),
    };

    Ok(ReelExportResult {
        clip_id: session.clip_id().to_string(),
        file_size: asset.bytes.len() as u64,
        media: ExportedMedia {
            file_name,
            mime_type: asset.mime_type,
            bytes: asset.bytes,
        },
        video_url,
        duration: trim.duration(),
        export_settings: ExportSettings {
            start_time: trim.start_time,
            end_time: trim.end_time,
            caption_styles: caption_snapshots(session.captions(), &trim),
        },
        exported_at: chrono::Utc::now(),
    })
}

/// Visible captions in clip time, clipped to the trim window.
pub fn caption_snapshots(captions: &[Caption], trim: &TrimWindow) -> Vec<CaptionStyleSnapshot> {
    captions
        .iter()
        .filter(|c| c.is_visible)
        .map(|c| CaptionStyleSnapshot {
            caption_id: c.id,
            text: c.text.clone(),
            start_time: trim.to_clip_time(c.start_time.max(trim.start_time)),
            end_time: trim.to_clip_time(c.end_time.min(trim.end_time)),
            position: c.position,
            style: c.style.clone(),
        })
        .collect()
}

/// Clip id reduced to characters safe in a file name.
fn file_stem(clip_id: &str) -> String {
    let stem: String = clip_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "reel".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcut_clip_model::{CaptionId, CaptionStyle, NormalizedPoint};

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("episode 12/hook"), "episode_12_hook");
        assert_eq!(file_stem(""), "reel");
    }

    #[test]
    fn test_snapshots_are_clip_relative_and_clipped() {
        let trim = TrimWindow::new(10.0, 40.0, 60.0).unwrap();
        let mut captions = vec![];
        for (id, (start, end)) in [(5.0, 12.0), (20.0, 22.0), (41.0, 45.0)].into_iter().enumerate() {
            let mut c = Caption {
                id: CaptionId(id as u64 + 1),
                text: format!("c{id}"),
                start_time: start,
                end_time: end,
                position: NormalizedPoint::default(),
                style: CaptionStyle::default(),
                is_visible: false,
            };
            c.refresh_visibility(&trim);
            captions.push(c);
        }

        let snaps = caption_snapshots(&captions, &trim);
        assert_eq!(snaps.len(), 2);
        assert_eq!((snaps[0].start_time, snaps[0].end_time), (0.0, 2.0));
        assert_eq!((snaps[1].start_time, snaps[1].end_time), (10.0, 12.0));
    }
}
