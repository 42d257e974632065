//! Pipeline job lifecycle against an in-memory engine.
//!
//! Every job must leave the engine's namespace empty, whichever stage fails.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reelcut_clip_model::TrimWindow;
use reelcut_common::config::PipelineDefaults;
use reelcut_common::error::ReelError;
use reelcut_editor_core::session::ReelSession;
use reelcut_render_engine::collab::{CreditGate, FixedCreditGate};
use reelcut_render_engine::{
    export_reel, EngineError, ExportOptions, ExportStage, JobKind, JobStage, MediaPipeline,
    PipelineError, ProgressCallback, SourceMedia, TranscodeEngine,
};

/// Engine that keeps files in a map. `execute` copies the `-i` input to the
/// last argument, reversed so the output is distinguishable.
#[derive(Default)]
struct MemoryEngine {
    files: HashMap<String, Vec<u8>>,
    fail_at: Option<JobStage>,
    fail_delete: bool,
    executed: Vec<Vec<String>>,
}

impl MemoryEngine {
    fn failing_at(stage: JobStage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl TranscodeEngine for MemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    async fn stage(&mut self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        if self.fail_at == Some(JobStage::Stage) {
            return Err(EngineError::Unavailable("disk full".to_string()));
        }
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn execute(&mut self, args: &[String]) -> Result<(), EngineError> {
        self.executed.push(args.to_vec());
        if self.fail_at == Some(JobStage::Execute) {
            return Err(EngineError::ExecutionFailed {
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        let input_at = args.iter().position(|a| a == "-i").map(|i| i + 1);
        let input = input_at
            .and_then(|i| args.get(i))
            .ok_or_else(|| EngineError::NotFound("-i".to_string()))?;
        let mut bytes = self
            .files
            .get(input)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(input.clone()))?;
        bytes.reverse();
        let output = args
            .last()
            .ok_or_else(|| EngineError::NotFound("output".to_string()))?;
        self.files.insert(output.clone(), bytes);
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        if self.fail_at == Some(JobStage::Read) {
            return Err(EngineError::NotFound(name.to_string()));
        }
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(name.to_string()))
    }

    async fn delete(&mut self, name: &str) -> Result<(), EngineError> {
        if self.fail_delete {
            return Err(EngineError::Unavailable("locked".to_string()));
        }
        self.files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EngineError::NotFound(name.to_string()))
    }

    async fn files(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.files.keys().cloned().collect())
    }
}

fn pipeline(engine: MemoryEngine) -> MediaPipeline<MemoryEngine> {
    MediaPipeline::new(engine, PipelineDefaults::default())
}

fn source() -> Vec<u8> {
    (1..=32).collect()
}

#[tokio::test]
async fn test_successful_job_leaves_no_files() {
    let pipeline = pipeline(MemoryEngine::default());
    let bytes = source();

    let asset = pipeline
        .clip_segment(SourceMedia::new(&bytes, "MP4"), 2.0, 5.0)
        .await
        .unwrap();

    let mut expected = bytes.clone();
    expected.reverse();
    assert_eq!(asset.bytes, expected);
    assert_eq!(asset.job, JobKind::ClipSegment);
    assert_eq!(asset.extension, "mp4");
    assert_eq!(asset.mime_type, "video/mp4");
    assert!(asset.cleanup.is_clean());
    assert_eq!(asset.cleanup.deleted.len(), 2);
    assert!(pipeline.virtual_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failure_at_any_stage_leaves_no_files() {
    for stage in [JobStage::Stage, JobStage::Execute, JobStage::Read] {
        let pipeline = pipeline(MemoryEngine::failing_at(stage));
        let bytes = source();

        let err = pipeline
            .extract_audio(SourceMedia::new(&bytes, "mp4"))
            .await
            .unwrap_err();

        assert_eq!(err.job(), JobKind::ExtractAudio);
        assert_eq!(err.stage(), Some(stage), "stage {stage}");
        assert!(
            pipeline.virtual_files().await.unwrap().is_empty(),
            "files left behind after {stage} failure"
        );
    }
}

#[tokio::test]
async fn test_invalid_arguments_never_touch_the_engine() {
    let pipeline = pipeline(MemoryEngine::default());
    let bytes = source();

    let err = pipeline
        .clip_segment(SourceMedia::new(&bytes, "mp4"), 5.0, 5.0)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidArguments { .. }));
    assert_eq!(err.stage(), None);

    let err = pipeline
        .extract_thumbnail(SourceMedia::new(&[], "mp4"), 1.0)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidArguments { .. }));

    let err = pipeline
        .extract_thumbnail(SourceMedia::new(&bytes, "mp4"), f64::NAN)
        .await
        .unwrap_err();
    assert!(ReelError::from(err).is_validation());

    assert!(pipeline.into_engine().executed.is_empty());
}

#[tokio::test]
async fn test_delete_failures_are_reported_not_raised() {
    let engine = MemoryEngine {
        fail_delete: true,
        ..MemoryEngine::default()
    };
    let pipeline = pipeline(engine);
    let bytes = source();

    let asset = pipeline
        .extract_thumbnail(SourceMedia::new(&bytes, "mp4"), 1.5)
        .await
        .unwrap();

    assert_eq!(asset.mime_type, "image/jpeg");
    assert!(!asset.cleanup.is_clean());
    assert_eq!(asset.cleanup.failed.len(), 2);
}

#[tokio::test]
async fn test_jobs_run_one_at_a_time() {
    let pipeline = Arc::new(pipeline(MemoryEngine::default()));
    let bytes = Arc::new(source());

    let mut handles = vec![];
    for i in 0..4 {
        let pipeline = Arc::clone(&pipeline);
        let bytes = Arc::clone(&bytes);
        handles.push(tokio::spawn(async move {
            pipeline
                .extract_thumbnail(SourceMedia::new(&bytes, "mp4"), i as f64)
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert!(pipeline.virtual_files().await.unwrap().is_empty());
}

fn session() -> ReelSession {
    let trim = TrimWindow::new(10.0, 40.0, 120.0).unwrap();
    let mut session = ReelSession::new("episode 12", 120.0, trim);
    session.add_caption("Hook line", 10.0, 12.5).unwrap();
    session.add_caption("Punchline", 38.0, 40.0).unwrap();
    session
}

fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<ExportStage>>>) {
    let stages = Arc::new(Mutex::new(vec![]));
    let sink = Arc::clone(&stages);
    let callback: ProgressCallback = Box::new(move |p| sink.lock().unwrap().push(p.stage));
    (callback, stages)
}

#[tokio::test]
async fn test_export_reel_clips_trim_window() {
    let pipeline = pipeline(MemoryEngine::default());
    let session = session();
    let bytes = source();
    let (callback, stages) = recorder();
    let options = ExportOptions {
        video_url_base: Some("https://cdn.example.com/reels/".to_string()),
        user_id: Some("user-1".to_string()),
    };
    let gate = FixedCreditGate {
        remaining_secs: 60.0,
    };

    let result = export_reel(
        &session,
        SourceMedia::new(&bytes, "mp4"),
        &pipeline,
        Some(&gate as &dyn CreditGate),
        &options,
        Some(callback),
    )
    .await
    .unwrap();

    assert_eq!(result.clip_id, "episode 12");
    assert_eq!(result.media.file_name, "episode_12.mp4");
    assert_eq!(
        result.video_url,
        "https://cdn.example.com/reels/episode_12.mp4"
    );
    assert_eq!(result.duration, 30.0);
    assert_eq!(result.file_size, bytes.len() as u64);
    assert_eq!(result.export_settings.start_time, 10.0);
    assert_eq!(result.export_settings.end_time, 40.0);
    let snaps = &result.export_settings.caption_styles;
    assert_eq!(snaps.len(), 2);
    assert_eq!(snaps[0].start_time, 0.0);
    assert_eq!(snaps[1].end_time, 30.0);

    assert_eq!(
        *stages.lock().unwrap(),
        vec![
            ExportStage::Preparing,
            ExportStage::Clipping,
            ExportStage::Finalizing,
            ExportStage::Complete
        ]
    );

    let engine = pipeline.into_engine();
    assert!(engine.files.is_empty());
    let args = &engine.executed[0];
    let ss = args.iter().position(|a| a == "-ss").unwrap();
    assert_eq!(args[ss + 1], "10.000");
    let t = args.iter().position(|a| a == "-t").unwrap();
    assert_eq!(args[t + 1], "30.000");
}

#[tokio::test]
async fn test_export_denied_by_credits_runs_no_job() {
    let pipeline = pipeline(MemoryEngine::default());
    let session = session();
    let bytes = source();
    let (callback, stages) = recorder();
    let options = ExportOptions {
        user_id: Some("user-1".to_string()),
        ..ExportOptions::default()
    };
    let gate = FixedCreditGate {
        remaining_secs: 5.0,
    };

    let err = export_reel(
        &session,
        SourceMedia::new(&bytes, "mp4"),
        &pipeline,
        Some(&gate as &dyn CreditGate),
        &options,
        Some(callback),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReelError::Rejected { .. }));
    assert_eq!(
        *stages.lock().unwrap(),
        vec![ExportStage::Preparing, ExportStage::Failed]
    );
    assert!(pipeline.into_engine().executed.is_empty());
}

#[tokio::test]
async fn test_export_failure_reports_failed_stage() {
    let pipeline = pipeline(MemoryEngine::failing_at(JobStage::Execute));
    let session = session();
    let bytes = source();
    let (callback, stages) = recorder();

    let err = export_reel(
        &session,
        SourceMedia::new(&bytes, "webm"),
        &pipeline,
        None,
        &ExportOptions::default(),
        Some(callback),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReelError::Pipeline { .. }));
    assert_eq!(stages.lock().unwrap().last(), Some(&ExportStage::Failed));
    assert!(pipeline.virtual_files().await.unwrap().is_empty());
}
