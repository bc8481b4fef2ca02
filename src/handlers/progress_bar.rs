use image::{Pixel as _, RgbaImage};

use crate::{
    foundation::color::BarColor,
    foundation::error::{GifbarError, GifbarResult},
    handlers::chain::FrameHandler,
    store::frames::FrameStore,
};

/// Bar thickness as a fraction of frame height when none is configured.
pub const AUTO_THICKNESS_RATIO: f64 = 0.015;

/// Draws a bottom-aligned progress line whose length tracks playback position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressBarPainter {
    thickness: Option<u32>,
    color: BarColor,
}

impl Default for ProgressBarPainter {
    fn default() -> Self {
        Self {
            thickness: None,
            color: BarColor::RED,
        }
    }
}

impl ProgressBarPainter {
    /// Painter with adaptive thickness and the given color.
    pub fn new(color: BarColor) -> Self {
        Self {
            thickness: None,
            color,
        }
    }

    /// Use a fixed thickness in pixels instead of the adaptive one.
    pub fn with_thickness(mut self, thickness: u32) -> GifbarResult<Self> {
        if thickness == 0 {
            return Err(GifbarError::validation("bar thickness must be > 0"));
        }
        self.thickness = Some(thickness);
        Ok(self)
    }

    /// Configured color.
    pub fn color(&self) -> BarColor {
        self.color
    }

    /// Bar thickness for a frame of `frame_height` pixels, never taller than the frame.
    ///
    /// Adaptive thickness is `round(frame_height * 0.015)`, at least 1px.
    pub fn thickness_for(&self, frame_height: u32) -> u32 {
        let t = self.thickness.unwrap_or_else(|| {
            ((f64::from(frame_height) * AUTO_THICKNESS_RATIO).round() as u32).max(1)
        });
        t.min(frame_height)
    }

    /// Paint one frame with a bar of `length` pixels.
    pub fn paint(&self, frame: &mut RgbaImage, length: u32) {
        let (width, height) = frame.dimensions();
        let thickness = self.thickness_for(height);
        let length = length.min(width);
        let color = self.color.to_pixel();

        for y in height - thickness..height {
            for x in 0..length {
                if color.0[3] == 255 {
                    frame.put_pixel(x, y, color);
                } else {
                    frame.get_pixel_mut(x, y).blend(&color);
                }
            }
        }
    }
}

/// Bar length for frame `index` of `frame_count` on a `width`-pixel frame.
///
/// Lengths step by `width / (frame_count - 1)` and are rounded half away from zero, so frame 0 is
/// empty and the last frame spans the full width. A single-frame animation gets a full bar.
pub fn bar_length(index: usize, frame_count: usize, width: u32) -> u32 {
    if frame_count <= 1 {
        return width;
    }
    let step = f64::from(width) / (frame_count - 1) as f64;
    ((step * index as f64).round() as u32).min(width)
}

impl FrameHandler for ProgressBarPainter {
    fn name(&self) -> &'static str {
        "progress_bar"
    }

    fn handle(&self, frames: &mut FrameStore) -> GifbarResult<()> {
        if frames.is_empty() {
            return Ok(());
        }
        let (width, _) = frames.dimensions(0)?;
        let count = frames.len();
        frames.update_all(|index, frame| {
            self.paint(frame, bar_length(index, count, width));
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handlers/progress_bar.rs"]
mod tests;
