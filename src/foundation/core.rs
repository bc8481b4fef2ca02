use crate::foundation::error::{GifbarError, GifbarResult};

/// Animation canvas (logical screen) dimensions in pixels.
///
/// Captured once at decode time and shared by every composited frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> GifbarResult<Self> {
        if width == 0 || height == 0 {
            return Err(GifbarError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Return `true` when a `width x height` region at the origin covers less than the canvas.
    pub fn is_larger_than(self, width: u32, height: u32) -> bool {
        width < self.width || height < self.height
    }
}

/// Per-frame display delay in GIF units (hundredths of a second).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct FrameDelay(pub u16);

impl FrameDelay {
    /// Delay written when source delays are not carried over (100 ms).
    pub const FALLBACK: Self = Self(10);

    /// Delay in milliseconds.
    pub fn as_millis(self) -> u32 {
        u32::from(self.0) * 10
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
