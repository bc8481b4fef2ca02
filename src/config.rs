use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    decode::compositor::DisposalChoice,
    encode::gif::EncodeSettings,
    foundation::color::BarColor,
    foundation::error::{GifbarError, GifbarResult},
    handlers::chain::{FrameHandler, HandlerChain},
    handlers::progress_bar::ProgressBarPainter,
    handlers::resize::{FrameResizer, ResizeTarget},
    store::frames::StorageMode,
};

/// Marker prepended to output file names unless the source is overwritten.
pub const DEFAULT_OUTPUT_PREFIX: &str = "_";

/// Declarative description of one frame handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerSpec {
    /// Bottom progress line.
    ProgressBar {
        /// Fixed thickness in pixels; adaptive when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thickness: Option<u32>,
        /// Bar color; red when absent.
        #[serde(default)]
        color: BarColor,
    },
    /// Thumbnail-style shrink.
    Resize {
        /// Explicit bounding width (requires `height`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        /// Explicit bounding height (requires `width`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        /// Scale factor relative to the first frame; wins over `width`/`height`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        percent: Option<f64>,
    },
}

impl HandlerSpec {
    /// Instantiate the described handler.
    pub fn build(&self) -> GifbarResult<Box<dyn FrameHandler>> {
        match self {
            Self::ProgressBar { thickness, color } => {
                let mut painter = ProgressBarPainter::new(*color);
                if let Some(t) = thickness {
                    painter = painter.with_thickness(*t)?;
                }
                Ok(Box::new(painter))
            }
            Self::Resize {
                width,
                height,
                percent,
            } => {
                let size = match (width, height) {
                    (Some(w), Some(h)) => Some((*w, *h)),
                    (None, None) => None,
                    _ => {
                        return Err(GifbarError::validation(
                            "resize needs both width and height, or neither",
                        ));
                    }
                };
                let target = ResizeTarget::from_options(size, *percent)?;
                Ok(Box::new(FrameResizer::new(target)))
            }
        }
    }
}

/// Immutable settings for one run (single file or batch).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Disposal handling for decoding.
    pub disposal: DisposalChoice,
    /// Frame storage between decode and encode.
    pub storage: StorageMode,
    /// Replace the source file instead of writing a prefixed sibling.
    pub overwrite_original: bool,
    /// Prefix for output names; also marks files the batch runner skips.
    pub output_prefix: String,
    /// Encoder settings.
    pub encode: EncodeSettings,
    /// Process batch files on a thread pool.
    pub parallel: bool,
    /// Worker threads for parallel batches (rayon default when absent).
    pub threads: Option<usize>,
    /// Handlers in application order.
    pub handlers: Vec<HandlerSpec>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            disposal: DisposalChoice::default(),
            storage: StorageMode::default(),
            overwrite_original: false,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_owned(),
            encode: EncodeSettings::default(),
            parallel: false,
            threads: None,
            handlers: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Load a JSON config file.
    pub fn from_path(path: &Path) -> GifbarResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            GifbarError::config(format!("invalid config '{}': {e}", path.display()))
        })?;
        Ok(cfg)
    }

    /// Check value ranges and that at least one handler is registered.
    pub fn validate(&self) -> GifbarResult<()> {
        if self.handlers.is_empty() {
            return Err(GifbarError::config("no frame handlers registered"));
        }
        if !self.overwrite_original && self.output_prefix.is_empty() {
            return Err(GifbarError::config(
                "output prefix must be non-empty unless overwriting originals",
            ));
        }
        if self.output_prefix.contains(['/', '\\']) {
            return Err(GifbarError::config(
                "output prefix must not contain path separators",
            ));
        }
        if self.threads == Some(0) {
            return Err(GifbarError::config("threads must be > 0"));
        }
        self.encode.validate()?;
        Ok(())
    }

    /// Build the handler chain described by `handlers`.
    pub fn handler_chain(&self) -> GifbarResult<HandlerChain> {
        let mut chain = HandlerChain::new();
        for spec in &self.handlers {
            chain.register_boxed(spec.build()?);
        }
        Ok(chain)
    }

    /// Where the processed version of `source` is written.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        if self.overwrite_original {
            return source.to_path_buf();
        }
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        source.with_file_name(format!("{}{name}", self.output_prefix))
    }

    /// Return `true` when `path` looks like an output of a previous run.
    pub fn is_processed_output(&self, path: &Path) -> bool {
        !self.output_prefix.is_empty()
            && path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with(&self.output_prefix))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
