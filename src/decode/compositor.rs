use image::RgbaImage;

use crate::{
    decode::source::{AnimatedSource, RawFrame, RawFrameReader},
    foundation::core::Canvas,
    foundation::error::GifbarResult,
    store::frames::{FrameStore, StorageMode},
    store::temp_cache::temp_cache_dir,
};

/// How a decoded frame relates to the one before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisposalMode {
    /// Each frame is painted over the previous composited frame.
    Cumulative,
    /// Each frame stands alone on a transparent canvas.
    Independent,
}

/// Configured disposal handling: a fixed mode, or probe the source first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DisposalChoice {
    /// Always composite onto the previous frame.
    #[default]
    Cumulative,
    /// Never composite onto the previous frame.
    Independent,
    /// Decide per source with [`probe_disposal`].
    Auto,
}

impl DisposalChoice {
    /// Resolve to a concrete mode, probing `source` when set to [`DisposalChoice::Auto`].
    pub fn resolve(self, source: &AnimatedSource) -> GifbarResult<DisposalMode> {
        match self {
            Self::Cumulative => Ok(DisposalMode::Cumulative),
            Self::Independent => Ok(DisposalMode::Independent),
            Self::Auto => probe_disposal(source),
        }
    }
}

/// Infer the disposal mode from raw tile regions.
///
/// Opens its own reader, so it never consumes frames of the real decode. Any tile smaller than
/// the canvas means frames are partial updates and must be composited cumulatively.
#[tracing::instrument(skip_all, fields(source = %source.path().display()))]
pub fn probe_disposal(source: &AnimatedSource) -> GifbarResult<DisposalMode> {
    let mut reader = RawFrameReader::open(source)?;
    let canvas = reader.canvas();
    while let Some((width, height)) = reader.next_region()? {
        if canvas.is_larger_than(width, height) {
            tracing::debug!(width, height, "partial tile found, using cumulative disposal");
            return Ok(DisposalMode::Cumulative);
        }
    }
    Ok(DisposalMode::Independent)
}

/// Decodes an animated source into fully composited, canvas-sized frames.
#[derive(Clone, Copy, Debug)]
pub struct FrameCompositor {
    mode: DisposalMode,
}

impl FrameCompositor {
    /// Compositor using `mode` for every frame after the first.
    pub fn new(mode: DisposalMode) -> Self {
        Self { mode }
    }

    /// Disposal mode in use.
    pub fn mode(&self) -> DisposalMode {
        self.mode
    }

    /// Decode `source` into a new [`FrameStore`] with the requested backing.
    ///
    /// Disk-backed stores cache frames in the sibling directory given by [`temp_cache_dir`].
    #[tracing::instrument(skip_all, fields(source = %source.path().display(), mode = ?self.mode))]
    pub fn decode(&self, source: &AnimatedSource, storage: StorageMode) -> GifbarResult<FrameStore> {
        let mut reader = RawFrameReader::open(source)?;
        let canvas = reader.canvas();
        let mut store = match storage {
            StorageMode::Memory => FrameStore::in_memory(canvas),
            StorageMode::Disk => FrameStore::on_disk(canvas, &temp_cache_dir(source.path()))?,
        };

        let mut prev: Option<RgbaImage> = None;
        while let Some(raw) = reader.next_frame()? {
            let mut frame = blank(canvas);
            if let (DisposalMode::Cumulative, Some(prev)) = (self.mode, &prev) {
                image::imageops::replace(&mut frame, prev, 0, 0);
            }
            paste_over(&mut frame, &raw);

            store.push(frame.clone(), raw.delay)?;
            prev = Some(frame);
        }

        tracing::debug!(frames = store.len(), ?canvas, "decoded");
        Ok(store)
    }
}

fn blank(canvas: Canvas) -> RgbaImage {
    RgbaImage::new(canvas.width, canvas.height)
}

/// Alpha-composite a raw tile onto `dst` at its offset, clipping to `dst` bounds.
pub fn paste_over(dst: &mut RgbaImage, raw: &RawFrame) {
    use image::Pixel as _;

    let (dst_w, dst_h) = dst.dimensions();
    let x_end = raw.left.saturating_add(raw.width).min(dst_w);
    let y_end = raw.top.saturating_add(raw.height).min(dst_h);

    for y in raw.top..y_end {
        for x in raw.left..x_end {
            let i = ((y - raw.top) as usize * raw.width as usize + (x - raw.left) as usize) * 4;
            let Some(px) = raw.rgba.get(i..i + 4) else {
                continue;
            };
            let src = image::Rgba([px[0], px[1], px[2], px[3]]);
            match src.0[3] {
                0 => {}
                255 => dst.put_pixel(x, y, src),
                _ => dst.get_pixel_mut(x, y).blend(&src),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/compositor.rs"]
mod tests;
