use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::core::{Canvas, FrameDelay},
    foundation::error::{GifbarError, GifbarResult},
};

/// Path to an input animation, checked for existence at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimatedSource {
    path: PathBuf,
}

impl AnimatedSource {
    /// Wrap `path`, failing with [`GifbarError::SourceNotFound`] if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> GifbarResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(GifbarError::source_not_found(path));
        }
        Ok(Self { path })
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One undecoded GIF frame: a tile rectangle of straight-alpha RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Tile x offset on the canvas.
    pub left: u32,
    /// Tile y offset on the canvas.
    pub top: u32,
    /// Tile width.
    pub width: u32,
    /// Tile height.
    pub height: u32,
    /// Display delay.
    pub delay: FrameDelay,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// Streaming reader over the raw frames of a GIF.
///
/// Frames come out as palette indices and are mapped through the frame's local color table,
/// falling back to the global one. The transparent index maps to alpha 0.
pub struct RawFrameReader {
    decoder: gif::Decoder<BufReader<File>>,
    global_palette: Option<Vec<u8>>,
    canvas: Canvas,
    path: PathBuf,
}

impl RawFrameReader {
    /// Open `source` and read the logical screen descriptor.
    pub fn open(source: &AnimatedSource) -> GifbarResult<Self> {
        let path = source.path().to_path_buf();
        let file = File::open(&path).with_context(|| format!("open gif '{}'", path.display()))?;

        let mut opts = gif::DecodeOptions::new();
        opts.set_color_output(gif::ColorOutput::Indexed);
        let decoder = opts.read_info(BufReader::new(file)).map_err(|e| {
            GifbarError::decode(format!("'{}' is not a readable gif: {e}", path.display()))
        })?;

        let canvas = Canvas::new(u32::from(decoder.width()), u32::from(decoder.height()))
            .map_err(|e| GifbarError::decode(format!("'{}': {e}", path.display())))?;
        let global_palette = decoder.global_palette().map(<[u8]>::to_vec);

        Ok(Self {
            decoder,
            global_palette,
            canvas,
            path,
        })
    }

    /// Logical screen size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Read the next frame's tile rectangle without resolving colors.
    ///
    /// `Ok(None)` marks the end of the sequence.
    pub fn next_region(&mut self) -> GifbarResult<Option<(u32, u32)>> {
        let frame = self.decoder.read_next_frame().map_err(|e| decode_err(&self.path, e))?;
        Ok(frame.map(|f| (u32::from(f.width), u32::from(f.height))))
    }

    /// Read and color-resolve the next frame. `Ok(None)` marks the end of the sequence.
    pub fn next_frame(&mut self) -> GifbarResult<Option<RawFrame>> {
        let frame = match self.decoder.read_next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e) => return Err(decode_err(&self.path, e)),
        };

        let palette = frame
            .palette
            .as_deref()
            .or(self.global_palette.as_deref())
            .ok_or_else(|| {
                GifbarError::decode(format!(
                    "'{}': frame has no local or global color table",
                    self.path.display()
                ))
            })?;

        let rgba = apply_palette(&frame.buffer, palette, frame.transparent);
        Ok(Some(RawFrame {
            left: u32::from(frame.left),
            top: u32::from(frame.top),
            width: u32::from(frame.width),
            height: u32::from(frame.height),
            delay: FrameDelay(frame.delay),
            rgba,
        }))
    }
}

fn decode_err(path: &Path, e: gif::DecodingError) -> GifbarError {
    GifbarError::decode(format!("'{}': {e}", path.display()))
}

/// Map palette indices to straight-alpha RGBA8.
///
/// Indices equal to `transparent`, or past the end of the palette, become fully transparent.
pub fn apply_palette(indices: &[u8], palette: &[u8], transparent: Option<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(indices.len() * 4);
    for &idx in indices {
        let base = usize::from(idx) * 3;
        match palette.get(base..base + 3) {
            Some(rgb) if Some(idx) != transparent => {
                out.extend_from_slice(rgb);
                out.push(255);
            }
            _ => out.extend_from_slice(&[0, 0, 0, 0]),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/decode/source.rs"]
mod tests;
