//! Fixtures and output inspection for integration tests.
#![allow(dead_code)]

#[path = "../unit/support.rs"]
mod fixtures;

use std::path::Path;

pub use fixtures::{Tile, scratch, write_gif, write_solid_gif};

/// One decoded output frame.
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub delay: u16,
    pub rgba: Vec<u8>,
}

impl DecodedFrame {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

/// Decoded animation: logical screen, loop flag and frames.
pub struct DecodedGif {
    pub width: u32,
    pub height: u32,
    pub loops: bool,
    pub frames: Vec<DecodedFrame>,
}

pub fn read_gif(path: &Path) -> DecodedGif {
    let file = std::fs::File::open(path).unwrap();
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = opts.read_info(file).unwrap();

    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        frames.push(DecodedFrame {
            width: u32::from(frame.width),
            height: u32::from(frame.height),
            delay: frame.delay,
            rgba: frame.buffer.to_vec(),
        });
    }

    DecodedGif {
        width: u32::from(decoder.width()),
        height: u32::from(decoder.height()),
        loops: !matches!(decoder.repeat(), gif::Repeat::Finite(0)),
        frames,
    }
}

/// Quantization tolerant: red channel dominates.
pub fn is_reddish(px: [u8; 4]) -> bool {
    px[0] > 180 && px[1] < 80 && px[2] < 80
}

/// Quantization tolerant: blue channel dominates.
pub fn is_bluish(px: [u8; 4]) -> bool {
    px[2] > 180 && px[0] < 80 && px[1] < 80
}
