//! Reelcut Render Engine
//!
//! Media side of the reel editor: drives a transcoding engine through
//! short-lived jobs and turns an editing session into exported media.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source bytes ──► stage ──► execute ──► read ──► delete ──► MediaAsset
//!                    (one job at a time, engine loaded once)
//!
//! ReelSession ──┬── trim window ──► ClipSegment ──► ReelExportResult
//!               └── captions ─────► compositor ───► overlay plan
//! reframing hints ──► Reframer ──┘
//! ```

pub mod collab;
pub mod compositor;
pub mod engine;
pub mod export;
pub mod pipeline;

pub use engine::{EngineError, FfmpegEngine, TranscodeEngine};
pub use export::*;
pub use pipeline::{CleanupReport, JobKind, JobStage, MediaAsset, MediaPipeline, PipelineError, SourceMedia};
