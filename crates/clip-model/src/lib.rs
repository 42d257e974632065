//! Reelcut Clip Model
//!
//! Defines the core data contracts for reel editing sessions:
//! - **Input:** `ReelClipInput` with transcription segments and reframing hints
//! - **Captions:** Timed text overlays with style and animation descriptors
//! - **Trim:** The validated sub-range of the source that becomes the reel
//! - **Export:** `ReelExportResult` returned after the media pipeline runs
//!
//! Times are seconds relative to the full source video. Positions are
//! normalized to `[0.0, 1.0]` so they survive resolution changes.

pub mod caption;
pub mod export;
pub mod geometry;
pub mod input;
pub mod trim;

pub use caption::*;
pub use export::*;
pub use geometry::*;
pub use input::*;
pub use trim::*;
