use image::imageops::FilterType;

use crate::{
    foundation::error::{GifbarError, GifbarResult},
    handlers::chain::FrameHandler,
    store::frames::FrameStore,
};

/// Bounding box used when neither a size nor a percent is given.
pub const DEFAULT_RESIZE_BOUNDS: (u32, u32) = (128, 128);

/// Target footprint for [`FrameResizer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResizeTarget {
    /// Fit within an explicit bounding box.
    Size {
        /// Maximum width.
        width: u32,
        /// Maximum height.
        height: u32,
    },
    /// Fit within the first frame's current size scaled by this factor.
    Percent(f64),
}

impl ResizeTarget {
    /// Build a target from optional size and percent; percent takes precedence.
    pub fn from_options(size: Option<(u32, u32)>, percent: Option<f64>) -> GifbarResult<Self> {
        let target = match (percent, size) {
            (Some(p), _) => Self::Percent(p),
            (None, Some((width, height))) => Self::Size { width, height },
            (None, None) => Self::Size {
                width: DEFAULT_RESIZE_BOUNDS.0,
                height: DEFAULT_RESIZE_BOUNDS.1,
            },
        };
        target.validate()?;
        Ok(target)
    }

    fn validate(&self) -> GifbarResult<()> {
        match *self {
            Self::Size { width, height } if width == 0 || height == 0 => Err(
                GifbarError::validation(format!("resize size must be non-zero, got {width}x{height}")),
            ),
            Self::Percent(p) if !(p.is_finite() && p > 0.0) => Err(GifbarError::validation(
                format!("resize percent must be a positive number, got {p}"),
            )),
            _ => Ok(()),
        }
    }

    /// Bounding box for a reference frame of `width x height`.
    pub fn bounds(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            Self::Size { width, height } => (width, height),
            Self::Percent(p) => (
                ((f64::from(width) * p).floor() as u32).max(1),
                ((f64::from(height) * p).floor() as u32).max(1),
            ),
        }
    }
}

/// Thumbnail dimensions: scale `width x height` down to fit `bounds`, preserving aspect ratio.
///
/// Never upscales.
pub fn fit_within(width: u32, height: u32, bounds: (u32, u32)) -> (u32, u32) {
    let (max_w, max_h) = bounds;
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let scale = (f64::from(max_w) / f64::from(width)).min(f64::from(max_h) / f64::from(height));
    let w = ((f64::from(width) * scale).round() as u32).clamp(1, max_w);
    let h = ((f64::from(height) * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

/// Shrinks every frame to fit a [`ResizeTarget`].
#[derive(Clone, Copy, Debug)]
pub struct FrameResizer {
    target: ResizeTarget,
    filter: FilterType,
}

impl FrameResizer {
    /// Resizer using bicubic (Catmull-Rom) resampling.
    pub fn new(target: ResizeTarget) -> Self {
        Self {
            target,
            filter: FilterType::CatmullRom,
        }
    }

    /// Override the resampling filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Configured target.
    pub fn target(&self) -> ResizeTarget {
        self.target
    }
}

impl FrameHandler for FrameResizer {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn handle(&self, frames: &mut FrameStore) -> GifbarResult<()> {
        if frames.is_empty() {
            return Ok(());
        }
        let (ref_w, ref_h) = frames.dimensions(0)?;
        let bounds = self.target.bounds(ref_w, ref_h);
        frames.update_all(|_, frame| {
            let (w, h) = frame.dimensions();
            let (nw, nh) = fit_within(w, h, bounds);
            if (nw, nh) != (w, h) {
                *frame = image::imageops::resize(&*frame, nw, nh, self.filter);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handlers/resize.rs"]
mod tests;
