//! Reelcut Editor Core
//!
//! The caption timeline and everything derived from it:
//! - **Session:** Caption edits, trim window, playhead, and selection
//! - **Animation:** Entry-animation progress, transforms, and karaoke timing
//! - **Presentation:** Virtualized timeline rows and bar geometry
//! - **Reframe:** 9:16 crop that follows externally computed subject hints
//! - **Subtitles:** SRT/WebVTT sidecars re-based to the trim window
//!
//! This crate is pure computation: no I/O, no media dependencies.
//! All inputs are data; all outputs are data.

pub mod animation;
pub mod presentation;
pub mod reframe;
pub mod session;
pub mod subtitles;

pub use animation::{CaptionFrame, CaptionTransform};
pub use presentation::{BarGeometry, TimelineRow, TimelineViewport};
pub use reframe::{ReframeConfig, Reframer};
pub use session::ReelSession;
pub use subtitles::SubtitleFormat;
