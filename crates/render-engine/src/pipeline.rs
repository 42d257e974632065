//! Media pipeline orchestrator.
//!
//! Drives a single long-lived [`TranscodeEngine`] through short jobs. Every
//! job follows the same protocol:
//!
//! ```text
//! stage input ──► execute ──► read output ──► delete input + output
//!      │              │             │                  ▲
//!      └──────────────┴─────────────┴── on failure ────┘
//! ```
//!
//! Deletion always runs, whichever step failed. Deletion problems never
//! replace the original error; they are logged and reported in a
//! [`CleanupReport`].
//!
//! A job future that is dropped mid-flight skips cleanup, so its virtual
//! files stay behind until the engine is unloaded.

use std::fmt;

use reelcut_common::config::PipelineDefaults;
use reelcut_common::error::ReelError;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::engine::{EngineError, FfmpegEngine, TranscodeEngine};

/// Kind of pipeline job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    ExtractAudio,
    ClipSegment,
    ExtractThumbnail,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractAudio => "extract-audio",
            Self::ClipSegment => "clip-segment",
            Self::ExtractThumbnail => "extract-thumbnail",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of the job protocol that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    Stage,
    Execute,
    Read,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stage => "stage",
            Self::Execute => "execute",
            Self::Read => "read",
        })
    }
}

/// Errors from a pipeline job.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Arguments were rejected before anything was staged.
    #[error("{job}: invalid arguments: {reason}")]
    InvalidArguments { job: JobKind, reason: String },

    #[error("{job} failed at {stage}: {source}")]
    StageFailed {
        job: JobKind,
        stage: JobStage,
        #[source]
        source: EngineError,
    },
}

impl PipelineError {
    pub fn job(&self) -> JobKind {
        match self {
            Self::InvalidArguments { job, .. } | Self::StageFailed { job, .. } => *job,
        }
    }

    /// Failed stage, `None` when the job never started.
    pub fn stage(&self) -> Option<JobStage> {
        match self {
            Self::InvalidArguments { .. } => None,
            Self::StageFailed { stage, .. } => Some(*stage),
        }
    }
}

impl From<PipelineError> for ReelError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidArguments { .. } => ReelError::validation(err.to_string()),
            PipelineError::StageFailed { .. } => ReelError::pipeline(err.to_string()),
        }
    }
}

/// Outcome of deleting a job's virtual files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Files removed.
    pub deleted: Vec<String>,
    /// Files that were never created (expected when a job fails early).
    pub missing: Vec<String>,
    /// Files whose deletion failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Source media handed to a job.
#[derive(Debug, Clone, Copy)]
pub struct SourceMedia<'a> {
    pub bytes: &'a [u8],
    /// Container extension without the dot (`mp4`, `webm`, ...).
    pub extension: &'a str,
}

impl<'a> SourceMedia<'a> {
    pub fn new(bytes: &'a [u8], extension: &'a str) -> Self {
        Self { bytes, extension }
    }

    /// Extension safe to use in a virtual file name.
    fn safe_extension(&self) -> String {
        let ext: String = self
            .extension
            .trim_start_matches('.')
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if ext.is_empty() {
            "bin".to_string()
        } else {
            ext
        }
    }
}

/// Output of a successful job.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub job: JobKind,
    pub bytes: Vec<u8>,
    /// Extension of the produced file.
    pub extension: String,
    pub mime_type: String,
    pub cleanup: CleanupReport,
}

/// Orchestrates jobs on one engine. At most one job runs at a time.
pub struct MediaPipeline<E: TranscodeEngine> {
    engine: Mutex<E>,
    settings: PipelineDefaults,
}

impl MediaPipeline<FfmpegEngine> {
    /// Load the ffmpeg engine once and wrap it.
    pub async fn load(settings: PipelineDefaults) -> Result<Self, EngineError> {
        let engine = FfmpegEngine::load(&settings).await?;
        Ok(Self::new(engine, settings))
    }
}

impl<E: TranscodeEngine> MediaPipeline<E> {
    pub fn new(engine: E, settings: PipelineDefaults) -> Self {
        Self {
            engine: Mutex::new(engine),
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineDefaults {
        &self.settings
    }

    /// Files currently in the engine's namespace.
    pub async fn virtual_files(&self) -> Result<Vec<String>, EngineError> {
        self.engine.lock().await.files().await
    }

    /// Give the engine back, e.g. to unload it.
    pub fn into_engine(self) -> E {
        self.engine.into_inner()
    }

    /// Mono audio sized for a transcription upload.
    pub async fn extract_audio(&self, input: SourceMedia<'_>) -> Result<MediaAsset, PipelineError> {
        let job = JobKind::ExtractAudio;
        require_bytes(job, &input)?;

        let sample_rate = self.settings.audio_sample_rate;
        let bitrate = self.settings.audio_bitrate_kbps;
        self.run(job, input, "mp3", "audio/mpeg", |i, o| {
            audio_args(i, o, sample_rate, bitrate)
        })
        .await
    }

    /// Stream-copied segment `[start, end)` of the source, in its container.
    pub async fn clip_segment(
        &self,
        input: SourceMedia<'_>,
        start: f64,
        end: f64,
    ) -> Result<MediaAsset, PipelineError> {
        let job = JobKind::ClipSegment;
        require_bytes(job, &input)?;
        if !start.is_finite() || !end.is_finite() {
            return Err(invalid(job, "segment bounds must be finite"));
        }
        if start < 0.0 {
            return Err(invalid(job, format!("start {start:.3}s is negative")));
        }
        if end <= start {
            return Err(invalid(
                job,
                format!("end {end:.3}s is not after start {start:.3}s"),
            ));
        }

        let ext = input.safe_extension();
        let mime = video_mime_type(&ext);
        self.run(job, input, &ext, mime, |i, o| clip_args(i, o, start, end))
            .await
    }

    /// One JPEG frame at `timestamp` seconds.
    pub async fn extract_thumbnail(
        &self,
        input: SourceMedia<'_>,
        timestamp: f64,
    ) -> Result<MediaAsset, PipelineError> {
        let job = JobKind::ExtractThumbnail;
        require_bytes(job, &input)?;
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(invalid(
                job,
                format!("timestamp {timestamp} must be a non-negative number"),
            ));
        }

        let width = self.settings.thumbnail_width;
        let quality = self.settings.thumbnail_quality;
        self.run(job, input, "jpg", "image/jpeg", |i, o| {
            thumbnail_args(i, o, timestamp, width, quality)
        })
        .await
    }

    async fn run(
        &self,
        job: JobKind,
        input: SourceMedia<'_>,
        output_extension: &str,
        mime_type: &str,
        build_args: impl FnOnce(&str, &str) -> Vec<String>,
    ) -> Result<MediaAsset, PipelineError> {
        let mut engine = self.engine.lock().await;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let input_name = format!("{job}-{id}-in.{}", input.safe_extension());
        let output_name = format!("{job}-{id}-out.{output_extension}");
        let args = build_args(&input_name, &output_name);

        tracing::info!(
            %job,
            engine = engine.name(),
            input_bytes = input.bytes.len(),
            "Starting pipeline job"
        );
        let started = std::time::Instant::now();

        let result = run_stages(&mut *engine, job, &input_name, input.bytes, &args, &output_name).await;
        let cleanup = cleanup(&mut *engine, &[&input_name, &output_name]).await;

        match result {
            Ok(bytes) => {
                tracing::info!(
                    %job,
                    output_bytes = bytes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Pipeline job finished"
                );
                Ok(MediaAsset {
                    job,
                    bytes,
                    extension: output_extension.to_string(),
                    mime_type: mime_type.to_string(),
                    cleanup,
                })
            }
            Err(err) => {
                tracing::error!(%job, error = %err, "Pipeline job failed");
                Err(err)
            }
        }
    }
}

async fn run_stages<E: TranscodeEngine + ?Sized>(
    engine: &mut E,
    job: JobKind,
    input_name: &str,
    input: &[u8],
    args: &[String],
    output_name: &str,
) -> Result<Vec<u8>, PipelineError> {
    let failed = move |stage: JobStage| move |source: EngineError| PipelineError::StageFailed {
        job,
        stage,
        source,
    };

    engine
        .stage(input_name, input)
        .await
        .map_err(failed(JobStage::Stage))?;
    engine.execute(args).await.map_err(failed(JobStage::Execute))?;
    engine
        .read(output_name)
        .await
        .map_err(failed(JobStage::Read))
}

/// Delete every name, swallowing errors into the report.
async fn cleanup<E: TranscodeEngine + ?Sized>(engine: &mut E, names: &[&str]) -> CleanupReport {
    let mut report = CleanupReport::default();
    for name in names {
        match engine.delete(name).await {
            Ok(()) => report.deleted.push(name.to_string()),
            Err(err) if err.is_not_found() => report.missing.push(name.to_string()),
            Err(err) => {
                tracing::warn!(file = %name, error = %err, "Failed to delete virtual file");
                report.failed.push((name.to_string(), err.to_string()));
            }
        }
    }
    report
}

fn require_bytes(job: JobKind, input: &SourceMedia<'_>) -> Result<(), PipelineError> {
    if input.bytes.is_empty() {
        return Err(invalid(job, "input media is empty"));
    }
    Ok(())
}

fn invalid(job: JobKind, reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidArguments {
        job,
        reason: reason.into(),
    }
}

/// Seconds formatted for ffmpeg time options.
fn secs_arg(secs: f64) -> String {
    format!("{secs:.3}")
}

/// Arguments for mono, low-bitrate MP3 audio.
pub fn audio_args(input: &str, output: &str, sample_rate: u32, bitrate_kbps: u32) -> Vec<String> {
    vec![
        "-i".into(),
        input.into(),
        "-vn".into(),
        "-ac".into(),
        "1".into(),
        "-ar".into(),
        sample_rate.to_string(),
        "-c:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        format!("{bitrate_kbps}k"),
        output.into(),
    ]
}

/// Arguments for a stream-copied cut with input-side seek.
///
/// Timestamps are shifted to start at zero so players do not show a gap.
pub fn clip_args(input: &str, output: &str, start: f64, end: f64) -> Vec<String> {
    vec![
        "-ss".into(),
        secs_arg(start),
        "-i".into(),
        input.into(),
        "-t".into(),
        secs_arg(end - start),
        "-c".into(),
        "copy".into(),
        "-avoid_negative_ts".into(),
        "make_zero".into(),
        output.into(),
    ]
}

/// Arguments for a single scaled JPEG frame with input-side seek.
pub fn thumbnail_args(
    input: &str,
    output: &str,
    timestamp: f64,
    width: u32,
    quality: u32,
) -> Vec<String> {
    vec![
        "-ss".into(),
        secs_arg(timestamp),
        "-i".into(),
        input.into(),
        "-frames:v".into(),
        "1".into(),
        "-vf".into(),
        format!("scale={width}:-2"),
        "-q:v".into(),
        quality.clamp(2, 31).to_string(),
        output.into(),
    ]
}

/// MIME type for a video container extension.
pub fn video_mime_type(extension: &str) -> &'static str {
    match extension {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[String], flag: &str) -> usize {
        args.iter().position(|a| a == flag).unwrap()
    }

    #[test]
    fn test_audio_args_are_mono_16k_32k() {
        let args = audio_args("in.mp4", "out.mp3", 16_000, 32);
        assert_eq!(args[position(&args, "-ac") + 1], "1");
        assert_eq!(args[position(&args, "-ar") + 1], "16000");
        assert_eq!(args[position(&args, "-b:a") + 1], "32k");
        assert!(args.contains(&"-vn".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp3");
    }

    #[test]
    fn test_clip_args_seek_on_input_and_copy() {
        let args = clip_args("in.mp4", "out.mp4", 12.5, 42.25);
        assert!(position(&args, "-ss") < position(&args, "-i"));
        assert_eq!(args[position(&args, "-ss") + 1], "12.500");
        assert_eq!(args[position(&args, "-t") + 1], "29.750");
        assert_eq!(args[position(&args, "-c") + 1], "copy");
        assert_eq!(args[position(&args, "-avoid_negative_ts") + 1], "make_zero");
    }

    #[test]
    fn test_thumbnail_args() {
        let args = thumbnail_args("in.mp4", "out.jpg", 3.0, 320, 5);
        assert!(position(&args, "-ss") < position(&args, "-i"));
        assert_eq!(args[position(&args, "-frames:v") + 1], "1");
        assert_eq!(args[position(&args, "-vf") + 1], "scale=320:-2");
        assert_eq!(args[position(&args, "-q:v") + 1], "5");
    }

    #[test]
    fn test_safe_extension() {
        assert_eq!(SourceMedia::new(b"x", ".MP4").safe_extension(), "mp4");
        assert_eq!(SourceMedia::new(b"x", "../").safe_extension(), "bin");
    }

    #[test]
    fn test_pipeline_error_names_job_and_stage() {
        let err = PipelineError::StageFailed {
            job: JobKind::ClipSegment,
            stage: JobStage::Execute,
            source: EngineError::NotFound("x".into()),
        };
        assert_eq!(err.stage(), Some(JobStage::Execute));
        assert!(err.to_string().starts_with("clip-segment failed at execute"));

        let reel: ReelError = invalid(JobKind::ExtractAudio, "empty").into();
        assert!(reel.is_validation());
    }
}
