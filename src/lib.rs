//! gifbar overlays a playback progress bar onto every frame of an animated GIF and re-encodes it.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `AnimatedSource -> FrameStore` via [`FrameCompositor`], honoring a
//!    [`DisposalMode`] (cumulative overlay or independent frames).
//! 2. **Handle**: every [`FrameHandler`] in a [`HandlerChain`] mutates the frames in place, in
//!    registration order ([`ProgressBarPainter`], [`FrameResizer`]).
//! 3. **Encode**: [`AnimationEncoder`] writes the frames back as one GIF and releases storage.
//!
//! [`PipelineOrchestrator`] runs these stages for one file; [`BatchRunner`] runs one pipeline per
//! eligible file in a directory.
//!
//! Frames live either in memory or as PNGs in a per-source temp cache ([`StorageMode`]); the
//! cache is removed after encoding and on every failure path.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod decode;
mod encode;
mod foundation;
mod handlers;
mod pipeline;
mod store;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;

pub use config::{DEFAULT_OUTPUT_PREFIX, HandlerSpec, RunConfig};
pub use decode::compositor::{
    DisposalChoice, DisposalMode, FrameCompositor, paste_over, probe_disposal,
};
pub use decode::source::{AnimatedSource, RawFrame, RawFrameReader, apply_palette};
pub use encode::gif::{AnimationEncoder, EncodeSettings, EncodeStats, MAX_QUALITY, part_path};
pub use foundation::color::BarColor;
pub use foundation::core::{Canvas, FrameDelay};
pub use foundation::error::{GifbarError, GifbarResult};
pub use handlers::chain::{FrameHandler, HandlerChain};
pub use handlers::progress_bar::{AUTO_THICKNESS_RATIO, ProgressBarPainter, bar_length};
pub use handlers::resize::{DEFAULT_RESIZE_BOUNDS, FrameResizer, ResizeTarget, fit_within};
pub use pipeline::batch::{
    BatchFailure, BatchReport, BatchRunner, SOURCE_EXTENSION, eligible_sources, process_dir,
};
pub use pipeline::orchestrator::{PipelineOrchestrator, PipelineState, process_file};
pub use store::frames::{FrameStore, StorageMode};
pub use store::temp_cache::{TEMP_CACHE_SUFFIX, TempCache, temp_cache_dir};
